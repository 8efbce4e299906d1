// This file is part of haarboost, an open-source face detection engine built on
// boosted Haar-like features, implementing the object detection method described in the following paper:
//
//      Rapid object detection using a boosted cascade of simple features,
//      Paul Viola, Michael Jones.
//      In Computer Vision and Pattern Recognition (CVPR), 2001.
//
// As an open-source face detection engine: you can redistribute haarboost source codes
// and/or modify it under the terms of the BSD 2-Clause License.
//
// You should have received a copy of the BSD 2-Clause License along with the software.
// If not, see < https://opensource.org/licenses/BSD-2-Clause>.

use super::IntegralImage;

pub const DEFAULT_CATALOG_STRIDE: usize = 2;

/// Geometric family of a Haar-like feature.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Shape {
    TwoVertical,
    ThreeVertical,
    TwoHorizontal,
    ThreeHorizontal,
    Four,
}

impl Shape {
    pub const ALL: [Shape; 5] = [
        Shape::TwoVertical,
        Shape::ThreeVertical,
        Shape::TwoHorizontal,
        Shape::ThreeHorizontal,
        Shape::Four,
    ];

    #[inline]
    pub fn from(id: i32) -> Option<Self> {
        match id {
            0 => Some(Shape::TwoVertical),
            1 => Some(Shape::ThreeVertical),
            2 => Some(Shape::TwoHorizontal),
            3 => Some(Shape::ThreeHorizontal),
            4 => Some(Shape::Four),
            _ => None,
        }
    }

    #[inline]
    pub fn id(self) -> i32 {
        match self {
            Shape::TwoVertical => 0,
            Shape::ThreeVertical => 1,
            Shape::TwoHorizontal => 2,
            Shape::ThreeHorizontal => 3,
            Shape::Four => 4,
        }
    }

    fn admits(self, width: usize, height: usize) -> bool {
        match self {
            Shape::TwoVertical => height % 2 == 0 && width >= 2 && height >= 2,
            Shape::ThreeVertical => height % 3 == 0 && width >= 2 && height >= 3,
            Shape::TwoHorizontal => width % 2 == 0 && width >= 2 && height >= 2,
            Shape::ThreeHorizontal => width % 3 == 0 && height >= 2 && width >= 3,
            Shape::Four => width % 2 == 0 && height % 2 == 0 && width >= 2 && height >= 2,
        }
    }
}

/// Haar-like feature over rows `x..x + width` and columns `y..y + height`.
///
/// Sub-rectangle boundaries are derived once, on construction:
/// `x_mid`/`y_mid` start the second half along each axis, and
/// `band_start..=band_end` is the middle third of three-segment shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HaarFeature {
    shape: Shape,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    x_end: usize,
    y_end: usize,
    x_mid: usize,
    y_mid: usize,
    band_start: usize,
    band_end: usize,
}

impl HaarFeature {
    /// Returns `None` when the geometry violates the family's size constraints.
    pub fn new(shape: Shape, x: usize, y: usize, width: usize, height: usize) -> Option<Self> {
        if !shape.admits(width, height) {
            return None;
        }

        let (band_start, band_end) = match shape {
            Shape::ThreeVertical => (y + height / 3, y + 2 * height / 3 - 1),
            Shape::ThreeHorizontal => (x + width / 3, x + 2 * width / 3 - 1),
            _ => (0, 0),
        };

        Some(HaarFeature {
            shape,
            x,
            y,
            width,
            height,
            x_end: x + width - 1,
            y_end: y + height - 1,
            x_mid: x + width / 2,
            y_mid: y + height / 2,
            band_start,
            band_end,
        })
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    #[inline]
    pub fn x(&self) -> usize {
        self.x
    }

    #[inline]
    pub fn y(&self) -> usize {
        self.y
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the feature lies inside a square window of side `window_size`.
    pub fn fits(&self, window_size: usize) -> bool {
        self.x + self.width <= window_size && self.y + self.height <= window_size
    }

    pub fn compute_value(&self, image: &IntegralImage) -> f64 {
        let (x_s, y_s, x_e, y_e) = (self.x, self.y, self.x_end, self.y_end);

        match self.shape {
            Shape::TwoVertical => {
                image.rect_sum(x_s, y_s, x_e, self.y_mid - 1)
                    - image.rect_sum(x_s, self.y_mid, x_e, y_e)
            }
            Shape::ThreeVertical => {
                image.rect_sum(x_s, y_s, x_e, y_e)
                    - 2.0 * image.rect_sum(x_s, self.band_start, x_e, self.band_end)
            }
            Shape::TwoHorizontal => {
                image.rect_sum(self.x_mid, y_s, x_e, y_e)
                    - image.rect_sum(x_s, y_s, self.x_mid - 1, y_e)
            }
            Shape::ThreeHorizontal => {
                image.rect_sum(x_s, y_s, x_e, y_e)
                    - 2.0 * image.rect_sum(self.band_start, y_s, self.band_end, y_e)
            }
            Shape::Four => {
                image.rect_sum(x_s, y_s, x_e, y_e)
                    - 2.0 * image.rect_sum(x_s, self.y_mid, self.x_mid - 1, y_e)
                    - 2.0 * image.rect_sum(self.x_mid, y_s, x_e, self.y_mid - 1)
            }
        }
    }
}

/// Every admissible feature inside a square canonical window.
#[derive(Clone, Debug)]
pub struct HaarCatalog {
    window_size: usize,
    features: Vec<HaarFeature>,
}

impl HaarCatalog {
    pub fn new(window_size: usize) -> Self {
        HaarCatalog::with_stride(window_size, DEFAULT_CATALOG_STRIDE)
    }

    /// Enumerates origins and sizes with the given stride; sizes start at 2.
    ///
    /// # Panics
    ///
    /// Panics if `stride` is 0.
    pub fn with_stride(window_size: usize, stride: usize) -> Self {
        if stride == 0 {
            panic!("Illegal catalog stride: {}", stride);
        }

        let mut features = Vec::new();
        for x in (0..window_size).step_by(stride) {
            for y in (0..window_size).step_by(stride) {
                for width in (2..=(window_size - x)).step_by(stride) {
                    for height in (2..=(window_size - y)).step_by(stride) {
                        features.extend(
                            Shape::ALL
                                .iter()
                                .filter_map(|&shape| HaarFeature::new(shape, x, y, width, height)),
                        );
                    }
                }
            }
        }

        HaarCatalog {
            window_size,
            features,
        }
    }

    #[inline]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    #[inline]
    pub fn features(&self) -> &[HaarFeature] {
        &self.features
    }

    #[inline]
    pub fn get(&self, index: usize) -> &HaarFeature {
        &self.features[index]
    }

    /// Values of all features, in catalog order.
    pub fn compute_values(&self, image: &IntegralImage, output: &mut [f64]) {
        for (value, feature) in output.iter_mut().zip(self.features.iter()) {
            *value = feature.compute_value(image);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::{HaarCatalog, HaarFeature, Shape};
    use crate::common::ImageData;
    use crate::feat::IntegralImage;

    fn block_sum(image: &ImageData, rows: std::ops::Range<usize>, cols: std::ops::Range<usize>) -> f64 {
        let mut sum = 0.0;
        for row in rows {
            for col in cols.clone() {
                sum += image.get(row, col);
            }
        }
        sum
    }

    fn random_window(seed: u64) -> (ImageData, IntegralImage) {
        let mut rng = StdRng::seed_from_u64(seed);
        let image = ImageData::from_fn(12, 12, |_, _| rng.gen_range(-2.0..2.0));
        let integral = IntegralImage::new(&image);
        (image, integral)
    }

    fn assert_close(expected: f64, actual: f64) {
        assert!(
            (expected - actual).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_two_vertical_value() {
        let (image, integral) = random_window(1);
        let feature = HaarFeature::new(Shape::TwoVertical, 2, 1, 4, 6).unwrap();
        let expected = block_sum(&image, 2..6, 1..4) - block_sum(&image, 2..6, 4..7);
        assert_close(expected, feature.compute_value(&integral));
    }

    #[test]
    fn test_three_vertical_value() {
        let (image, integral) = random_window(2);
        let feature = HaarFeature::new(Shape::ThreeVertical, 0, 3, 2, 9).unwrap();
        let expected = block_sum(&image, 0..2, 3..12) - 2.0 * block_sum(&image, 0..2, 6..9);
        assert_close(expected, feature.compute_value(&integral));
    }

    #[test]
    fn test_two_horizontal_value() {
        let (image, integral) = random_window(3);
        let feature = HaarFeature::new(Shape::TwoHorizontal, 4, 4, 8, 2).unwrap();
        let expected = block_sum(&image, 8..12, 4..6) - block_sum(&image, 4..8, 4..6);
        assert_close(expected, feature.compute_value(&integral));
    }

    #[test]
    fn test_three_horizontal_value() {
        let (image, integral) = random_window(4);
        let feature = HaarFeature::new(Shape::ThreeHorizontal, 3, 0, 6, 5).unwrap();
        let expected = block_sum(&image, 3..9, 0..5) - 2.0 * block_sum(&image, 5..7, 0..5);
        assert_close(expected, feature.compute_value(&integral));
    }

    #[test]
    fn test_four_value() {
        let (image, integral) = random_window(5);
        let feature = HaarFeature::new(Shape::Four, 2, 2, 6, 8).unwrap();
        let expected = block_sum(&image, 2..8, 2..10)
            - 2.0 * block_sum(&image, 2..5, 6..10)
            - 2.0 * block_sum(&image, 5..8, 2..6);
        assert_close(expected, feature.compute_value(&integral));
    }

    #[test]
    fn test_invalid_geometry_is_not_a_feature() {
        assert!(HaarFeature::new(Shape::TwoVertical, 0, 0, 2, 3).is_none());
        assert!(HaarFeature::new(Shape::ThreeVertical, 0, 0, 2, 4).is_none());
        assert!(HaarFeature::new(Shape::TwoHorizontal, 0, 0, 1, 2).is_none());
        assert!(HaarFeature::new(Shape::ThreeHorizontal, 0, 0, 3, 1).is_none());
        assert!(HaarFeature::new(Shape::Four, 0, 0, 4, 6).is_some());
        assert!(HaarFeature::new(Shape::Four, 0, 0, 4, 5).is_none());
    }

    #[test]
    fn test_catalog_small_window() {
        // Sizes are 2 or 4 only: three-segment shapes never fit.
        let catalog = HaarCatalog::new(4);
        assert_eq!(27, catalog.len());
        assert!(catalog.features().iter().all(|f| f.fits(4)));
        assert!(catalog
            .features()
            .iter()
            .all(|f| f.shape() != Shape::ThreeVertical && f.shape() != Shape::ThreeHorizontal));
    }

    #[test]
    fn test_catalog_order() {
        let catalog = HaarCatalog::new(6);
        let first: Vec<Shape> = catalog.features()[..3].iter().map(|f| f.shape()).collect();
        assert_eq!(
            vec![Shape::TwoVertical, Shape::TwoHorizontal, Shape::Four],
            first
        );
        assert!(catalog.features().iter().all(|f| f.fits(6)));
        assert!(catalog
            .features()
            .iter()
            .any(|f| f.shape() == Shape::ThreeHorizontal && f.width() == 6));
    }

    #[test]
    fn test_shape_ids() {
        for shape in Shape::ALL.iter() {
            assert_eq!(Some(*shape), Shape::from(shape.id()));
        }
        assert_eq!(None, Shape::from(5));
    }
}
