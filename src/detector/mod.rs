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

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::classifier::StrongClassifier;
use crate::common::{Detection, ImageData, Rectangle, Seq};
use crate::feat::IntegralImage;
use crate::Detector;

/// Sliding-window settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanParams {
    window_fractions: Vec<f64>,
    step: usize,
    aspect_ratio: f64,
}

impl Default for ScanParams {
    fn default() -> Self {
        ScanParams {
            window_fractions: vec![0.15, 0.2, 0.25],
            step: 5,
            aspect_ratio: 2.0 / 3.0,
        }
    }
}

impl ScanParams {
    /// Window heights are `fraction * image height`; widths are the height
    /// times `aspect_ratio` (width over height).
    ///
    /// # Panics
    ///
    /// Panics on an empty fraction list, a fraction outside (0, 1], a zero
    /// step, or a non-positive aspect ratio.
    pub fn new(window_fractions: &[f64], step: usize, aspect_ratio: f64) -> Self {
        let mut params = ScanParams::default();
        params.set_window_fractions(window_fractions);
        params.set_step(step);
        params.set_aspect_ratio(aspect_ratio);
        params
    }

    #[inline]
    pub fn window_fractions(&self) -> &[f64] {
        &self.window_fractions
    }

    #[inline]
    pub fn step(&self) -> usize {
        self.step
    }

    #[inline]
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    fn set_window_fractions(&mut self, window_fractions: &[f64]) {
        if window_fractions.is_empty() {
            panic!("Illegal window fractions: none given");
        }
        for &fraction in window_fractions {
            if !(fraction > 0.0 && fraction <= 1.0) {
                panic!("Illegal window fraction: {}", fraction);
            }
        }
        self.window_fractions = window_fractions.to_vec();
    }

    fn set_step(&mut self, step: usize) {
        if step == 0 {
            panic!("Illegal step: {}", step);
        }
        self.step = step;
    }

    fn set_aspect_ratio(&mut self, aspect_ratio: f64) {
        if !(aspect_ratio > 0.0 && aspect_ratio.is_finite()) {
            panic!("Illegal aspect ratio: {}", aspect_ratio);
        }
        self.aspect_ratio = aspect_ratio;
    }

    /// Window extents (rows, cols) for one scale, if the window is non-empty.
    fn window_extents(&self, fraction: f64, image: &ImageData) -> Option<(usize, usize)> {
        let height = fraction * image.height() as f64;
        let width = height * self.aspect_ratio;
        let (height, width) = (height.floor() as usize, width.floor() as usize);
        if height == 0 || width == 0 {
            None
        } else {
            Some((height, width))
        }
    }
}

/// Scans `image` with every window that fits inside it, at every scale.
///
/// Each window is cropped, resized to the classifier's canonical window and
/// classified; positive windows are returned ordered by scale, then row, then
/// column. Overlapping detections are not merged.
pub fn scan_image(
    image: &ImageData,
    classifier: &StrongClassifier,
    params: &ScanParams,
) -> Vec<Detection> {
    let step = params.step();
    let mut windows = vec![];

    for (scale, &fraction) in params.window_fractions().iter().enumerate() {
        let (height, width) = match params.window_extents(fraction, image) {
            Some(extents) => extents,
            None => continue,
        };
        if height > image.height() || width > image.width() {
            continue;
        }

        let max_x = image.height() - height;
        let max_y = image.width() - width;
        for x in Seq::new(0, move |n| n + step).take_while(move |n| *n <= max_x) {
            for y in Seq::new(0, move |n| n + step).take_while(move |n| *n <= max_y) {
                windows.push((scale, Rectangle::new(x, y, x + height, y + width)));
            }
        }
    }

    log::debug!(
        "Scanning {} windows in {}x{} image",
        windows.len(),
        image.height(),
        image.width()
    );

    #[cfg(feature = "rayon")]
    let iter = windows.into_par_iter();
    #[cfg(not(feature = "rayon"))]
    let iter = windows.into_iter();

    let window_size = classifier.window_size();
    let detections: Vec<Detection> = iter
        .filter_map(|(scale, bbox)| {
            let window = image
                .crop(bbox.x1(), bbox.y1(), bbox.height(), bbox.width())
                .resize(window_size, window_size);
            let score = classifier.classify(&IntegralImage::new(&window));
            if score.is_positive() {
                Some(Detection::new(bbox, score.margin(), scale))
            } else {
                None
            }
        })
        .collect();

    log::debug!("Found {} detections", detections.len());
    detections
}

/// Sliding-window detector around a single boosted classifier.
pub struct HaarDetector {
    classifier: StrongClassifier,
    params: ScanParams,
    min_margin: Option<f64>,
}

impl HaarDetector {
    pub fn new(classifier: StrongClassifier) -> Self {
        HaarDetector {
            classifier,
            params: ScanParams::default(),
            min_margin: None,
        }
    }

    pub fn classifier(&self) -> &StrongClassifier {
        &self.classifier
    }

    /// Mutable access, e.g. for recalibrating the decision threshold.
    pub fn classifier_mut(&mut self) -> &mut StrongClassifier {
        &mut self.classifier
    }

    pub fn params(&self) -> &ScanParams {
        &self.params
    }
}

impl Detector for HaarDetector {
    fn detect(&mut self, image: &ImageData) -> Vec<Detection> {
        if image.width() == 0 || image.height() == 0 {
            panic!("Illegal image: {}x{}", image.height(), image.width());
        }

        let detections = scan_image(image, &self.classifier, &self.params);
        match self.min_margin {
            Some(min_margin) => detections
                .into_iter()
                .filter(|detection| detection.margin() >= min_margin)
                .collect(),
            None => detections,
        }
    }

    fn set_window_fractions(&mut self, window_fractions: &[f64]) {
        self.params.set_window_fractions(window_fractions);
    }

    fn set_slide_window_step(&mut self, step: usize) {
        self.params.set_step(step);
    }

    fn set_aspect_ratio(&mut self, aspect_ratio: f64) {
        self.params.set_aspect_ratio(aspect_ratio);
    }

    fn set_score_thresh(&mut self, thresh: f64) {
        if !(thresh >= 0.0 && thresh.is_finite()) {
            panic!("Illegal threshold: {}", thresh);
        }
        self.min_margin = Some(thresh);
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::train::{train, TrainingConfig};

    const WINDOW: usize = 12;

    /// Bright left half, dark right half.
    fn pattern(amplitude: f64) -> ImageData {
        ImageData::from_fn(WINDOW, WINDOW, |_, col| {
            if col < WINDOW / 2 {
                amplitude
            } else {
                -amplitude
            }
        })
    }

    fn trained_classifier() -> StrongClassifier {
        let mut rng = StdRng::seed_from_u64(3);
        let mut images = vec![pattern(1.0), pattern(0.9), pattern(1.1)];
        let mut labels = vec![true, true, true];

        images.push(ImageData::from_fn(WINDOW, WINDOW, |_, _| 0.0));
        images.push(pattern(-1.0));
        labels.push(false);
        labels.push(false);
        for _ in 0..8 {
            images.push(ImageData::from_fn(WINDOW, WINDOW, |_, _| rng.gen_range(-1.0..1.0)));
            labels.push(false);
        }

        let classifier = train(&images, &labels, &TrainingConfig::new(10, 1e-6)).unwrap();
        for (image, &label) in images.iter().zip(labels.iter()) {
            let score = classifier.classify(&IntegralImage::new(image));
            assert_eq!(label, score.is_positive());
        }
        classifier
    }

    /// 60x60 zeros with the unit pattern at rows 20..32, columns 25..37.
    fn scene() -> ImageData {
        ImageData::from_fn(60, 60, |row, col| {
            if (20..32).contains(&row) && (25..37).contains(&col) {
                if col < 31 {
                    1.0
                } else {
                    -1.0
                }
            } else {
                0.0
            }
        })
    }

    #[test]
    fn test_detects_embedded_pattern() {
        let classifier = trained_classifier();
        let params = ScanParams::new(&[0.2], 5, 1.0);
        let target = Rectangle::new(20, 25, 32, 37);

        let detections = scan_image(&scene(), &classifier, &params);
        assert!(!detections.is_empty());
        assert!(detections.iter().any(|d| *d.bbox() == target));
        for detection in &detections {
            assert!(detection.bbox().overlaps(&target));
            assert_eq!(12, detection.bbox().height());
            assert_eq!(12, detection.bbox().width());
            assert_eq!(0, detection.scale());
            assert!(detection.margin() > 1.0);
        }
    }

    #[test]
    fn test_blank_scene_has_no_detections() {
        let classifier = trained_classifier();
        let params = ScanParams::new(&[0.2], 5, 1.0);
        let blank = ImageData::from_fn(60, 60, |_, _| 0.0);
        assert!(scan_image(&blank, &classifier, &params).is_empty());
    }

    #[test]
    fn test_detector_settings() {
        let mut detector = HaarDetector::new(trained_classifier());
        detector.set_window_fractions(&[0.2]);
        detector.set_slide_window_step(5);
        detector.set_aspect_ratio(1.0);

        let detections = detector.detect(&scene());
        assert!(!detections.is_empty());

        detector.set_score_thresh(f64::MAX);
        assert!(detector.detect(&scene()).is_empty());
    }

    #[test]
    fn test_window_extents() {
        let params = ScanParams::new(&[0.25], 5, 0.5);
        let image = ImageData::from_fn(90, 60, |_, _| 0.0);
        assert_eq!(Some((15, 7)), params.window_extents(0.25, &image));
        assert_eq!(Some((30, 15)), params.window_extents(0.5, &image));
        assert_eq!(None, params.window_extents(0.01, &image));
    }

    #[test]
    fn test_windows_cover_stride_grid() {
        let mut classifier = StrongClassifier::new(4);
        // an empty ensemble votes 0, which beats a negative threshold
        classifier.set_threshold(-1.0);
        let params = ScanParams::new(&[0.5], 5, 1.0);
        let image = ImageData::from_fn(20, 20, |_, _| 0.0);

        let detections = scan_image(&image, &classifier, &params);
        let origins: Vec<(usize, usize)> = detections
            .iter()
            .map(|d| (d.bbox().x1(), d.bbox().y1()))
            .collect();
        assert_eq!(
            vec![
                (0, 0),
                (0, 5),
                (0, 10),
                (5, 0),
                (5, 5),
                (5, 10),
                (10, 0),
                (10, 5),
                (10, 10)
            ],
            origins
        );
    }

    #[test]
    #[should_panic]
    fn test_zero_step() {
        ScanParams::new(&[0.2], 0, 1.0);
    }

    #[test]
    #[should_panic]
    fn test_fraction_out_of_range() {
        HaarDetector::new(StrongClassifier::new(24)).set_window_fractions(&[1.5]);
    }
}
