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

use std::cmp;

use crate::math;

/// Row-major grayscale image with real-valued pixels.
///
/// Row `x` and column `y` address the pixel at `data[x * width + y]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageData {
    data: Vec<f64>,
    width: usize,
    height: usize,
}

impl ImageData {
    /// # Panics
    ///
    /// Panics if `data` does not hold exactly `width * height` pixels.
    pub fn new(data: Vec<f64>, width: usize, height: usize) -> Self {
        if data.len() != width * height {
            panic!(
                "Illegal image data: {} pixels for {}x{} image",
                data.len(),
                width,
                height
            );
        }
        ImageData {
            data,
            width,
            height,
        }
    }

    pub fn from_luma(luma: &[u8], width: usize, height: usize) -> Self {
        ImageData::new(luma.iter().map(|&v| f64::from(v)).collect(), width, height)
    }

    /// Builds an image by evaluating `f(row, col)` for every pixel.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col));
            }
        }
        ImageData::new(data, width, height)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.width + col]
    }

    /// Copies the `height` x `width` region whose top-left pixel is (`x`, `y`).
    ///
    /// # Panics
    ///
    /// Panics if the region does not lie inside the image.
    pub fn crop(&self, x: usize, y: usize, height: usize, width: usize) -> ImageData {
        if x + height > self.height || y + width > self.width {
            panic!(
                "Illegal crop: {}x{} at ({}, {}) in {}x{} image",
                height, width, x, y, self.height, self.width
            );
        }

        let mut data = Vec::with_capacity(width * height);
        for row in x..(x + height) {
            let start = row * self.width + y;
            data.extend_from_slice(&self.data[start..(start + width)]);
        }
        ImageData::new(data, width, height)
    }

    /// Bilinear resize to `width` x `height`.
    pub fn resize(&self, width: usize, height: usize) -> ImageData {
        if self.width == width && self.height == height {
            return self.clone();
        }
        if self.width == 0 || self.height == 0 {
            panic!("Illegal image to resize: {}x{}", self.width, self.height);
        }

        let lf_x_scl = self.width as f64 / width as f64;
        let lf_y_scl = self.height as f64 / height as f64;

        let mut data = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                let lf_x_s = lf_x_scl * col as f64;
                let lf_y_s = lf_y_scl * row as f64;

                let n_x_s = cmp::min(lf_x_s as usize, self.width.saturating_sub(2));
                let n_y_s = cmp::min(lf_y_s as usize, self.height.saturating_sub(2));
                let n_x_e = cmp::min(n_x_s + 1, self.width - 1);
                let n_y_e = cmp::min(n_y_s + 1, self.height - 1);

                let lf_weight_x = lf_x_s - n_x_s as f64;
                let lf_weight_y = lf_y_s - n_y_s as f64;

                let d1 = self.get(n_y_s, n_x_s);
                let d2 = self.get(n_y_s, n_x_e);
                let d3 = self.get(n_y_e, n_x_s);
                let d4 = self.get(n_y_e, n_x_e);

                data.push(
                    (1.0 - lf_weight_y) * ((1.0 - lf_weight_x) * d1 + lf_weight_x * d2)
                        + lf_weight_y * ((1.0 - lf_weight_x) * d3 + lf_weight_x * d4),
                );
            }
        }
        ImageData::new(data, width, height)
    }

    /// Subtracts the mean brightness and divides by the standard deviation.
    ///
    /// A constant image has zero deviation and is only mean-subtracted.
    pub fn normalized(&self) -> ImageData {
        let (mean, std_dev) = math::mean_std_dev(&self.data);
        let scale = if std_dev > 0.0 { 1.0 / std_dev } else { 1.0 };
        ImageData::new(
            self.data.iter().map(|v| (v - mean) * scale).collect(),
            self.width,
            self.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::ImageData;

    #[test]
    fn test_crop() {
        let image = ImageData::from_fn(4, 3, |row, col| (row * 4 + col) as f64);
        let crop = image.crop(1, 2, 2, 2);
        assert_eq!(&[6.0, 7.0, 10.0, 11.0], crop.data());
        assert_eq!((2, 2), (crop.width(), crop.height()));
    }

    #[test]
    #[should_panic]
    fn test_crop_out_of_bounds() {
        let image = ImageData::from_fn(4, 3, |_, _| 0.0);
        image.crop(2, 0, 2, 2);
    }

    #[test]
    fn test_resize_same_size_is_copy() {
        let image = ImageData::from_fn(5, 5, |row, col| (row * col) as f64);
        assert_eq!(image, image.resize(5, 5));
    }

    #[test]
    fn test_resize_constant_image() {
        let image = ImageData::from_fn(7, 9, |_, _| 3.5);
        let resized = image.resize(24, 24);
        assert_eq!((24, 24), (resized.width(), resized.height()));
        assert!(resized.data().iter().all(|v| (v - 3.5).abs() < 1e-12));
    }

    #[test]
    fn test_resize_downscale_picks_source_grid() {
        let image = ImageData::from_fn(4, 4, |row, col| (row * 4 + col) as f64);
        let resized = image.resize(2, 2);
        assert_eq!(&[0.0, 2.0, 8.0, 10.0], resized.data());
    }

    #[test]
    fn test_normalized() {
        let image = ImageData::new(vec![1.0, 3.0, 1.0, 3.0], 2, 2);
        assert_eq!(&[-1.0, 1.0, -1.0, 1.0], image.normalized().data());

        let flat = ImageData::new(vec![2.0; 4], 2, 2);
        assert_eq!(&[0.0; 4], flat.normalized().data());
    }
}
