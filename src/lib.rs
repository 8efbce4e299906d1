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

//! Face detection with a boosted ensemble of Haar-like features.
//!
//! The pipeline runs in explicit stages: images are normalized
//! ([`ImageData::normalized`]), turned into summed-area tables
//! ([`IntegralImage`]), featurized over a [`HaarCatalog`], boosted into a
//! [`StrongClassifier`] ([`train`]), optionally recalibrated on held-out data
//! ([`calibrate`]), persisted ([`save_model`]) and finally used to scan
//! images ([`Detector`]).

mod classifier;
mod common;
mod detector;
mod error;
mod feat;
mod math;
mod model;
pub mod train;

pub use crate::classifier::{DecisionStump, EnsembleEntry, Polarity, Score, StrongClassifier};
pub use crate::common::{Detection, ImageData, Rectangle};
pub use crate::detector::{scan_image, HaarDetector, ScanParams};
pub use crate::error::{Error, Result};
pub use crate::feat::{
    FeatureMatrix, HaarCatalog, HaarFeature, IntegralImage, PresortedFeatures, Shape,
    DEFAULT_CATALOG_STRIDE,
};
pub use crate::model::{load_model, read_model, save_model, write_model};
pub use crate::train::calibration::{calibrate, evaluate, Calibration, CalibrationPolicy, Rates};
pub use crate::train::{
    train, train_on_features, BoostingTrainer, LogObserver, RoundOutcome, RoundReport,
    Termination, TrainingConfig, TrainingObserver,
};

use std::path::Path;

/// Create a detector, based on a model file.
pub fn create_detector<P: AsRef<Path>>(path_to_model: P) -> Result<Box<dyn Detector>> {
    let classifier = load_model(path_to_model)?;
    Ok(create_detector_with_model(classifier))
}

/// Create a detector, based on the provided classifier.
pub fn create_detector_with_model(classifier: StrongClassifier) -> Box<dyn Detector> {
    Box::new(HaarDetector::new(classifier))
}

/// Sliding-window detector.
///
/// # Examples
///
/// ```no_run
/// use haarboost::{Detector, ImageData};
///
/// let mut detector = haarboost::create_detector("/path/to/model").unwrap();
/// detector.set_window_fractions(&[0.15, 0.2, 0.25]);
/// detector.set_slide_window_step(5);
/// detector.set_aspect_ratio(2.0 / 3.0);
///
/// # let (width, height) = (640, 480);
/// # let bytes = vec![0u8; width * height];
/// let image = ImageData::from_luma(&bytes, width, height).normalized();
/// for detection in detector.detect(&image) {
///     // print margin and coordinates
///     println!("found face: {:?}", detection);
/// }
/// ```
pub trait Detector {
    /// Detect objects on a brightness-normalized grayscale image.
    ///
    /// Every positive window is reported; overlapping detections are not merged.
    ///
    /// # Panics
    ///
    /// Panics if `image` has `width` or `height` equal to 0.
    fn detect(&mut self, image: &ImageData) -> Vec<Detection>;

    /// Set the window heights to scan, as fractions of the image height.
    ///
    /// # Panics
    ///
    /// Panics if `window_fractions` is empty or any fraction lies outside (0, 1].
    fn set_window_fractions(&mut self, window_fractions: &[f64]);

    /// Set the sliding window step, in pixels, along both axes.
    ///
    /// # Panics
    ///
    /// Panics if `step` is 0.
    fn set_slide_window_step(&mut self, step: usize);

    /// Set the window width over window height.
    ///
    /// Faces are usually taller than wide; the default is 2/3.
    ///
    /// # Panics
    ///
    /// Panics if `aspect_ratio` is not positive and finite.
    fn set_aspect_ratio(&mut self, aspect_ratio: f64);

    /// Set the minimum margin of reported detections.
    ///
    /// The margin is the ensemble vote divided by the decision threshold, so
    /// every detection has a margin above 1 when the threshold is positive.
    /// Larger values result in fewer detections.
    ///
    /// # Panics
    ///
    /// Panics if `thresh` is negative or not finite.
    fn set_score_thresh(&mut self, thresh: f64);
}
