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

use super::{DecisionStump, Score};
use crate::feat::{HaarFeature, IntegralImage};

/// One weak classifier of an ensemble, with its vote weight.
#[derive(Clone, Debug, PartialEq)]
pub struct EnsembleEntry {
    feature: HaarFeature,
    stump: DecisionStump,
    alpha: f64,
}

impl EnsembleEntry {
    pub fn new(feature: HaarFeature, stump: DecisionStump, alpha: f64) -> Self {
        EnsembleEntry {
            feature,
            stump,
            alpha,
        }
    }

    #[inline]
    pub fn feature(&self) -> &HaarFeature {
        &self.feature
    }

    #[inline]
    pub fn stump(&self) -> &DecisionStump {
        &self.stump
    }

    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    #[inline]
    fn vote(&self, image: &IntegralImage) -> f64 {
        if self.stump.classify(self.feature.compute_value(image)) {
            self.alpha
        } else {
            0.0
        }
    }
}

/// Weighted vote of weak classifiers against a decision threshold.
///
/// The threshold defaults to half the total alpha and can be recalibrated
/// without touching the ensemble.
#[derive(Clone, Debug, PartialEq)]
pub struct StrongClassifier {
    window_size: usize,
    entries: Vec<EnsembleEntry>,
    threshold: f64,
}

impl StrongClassifier {
    /// Empty ensemble over square windows of side `window_size`.
    pub fn new(window_size: usize) -> Self {
        StrongClassifier {
            window_size,
            entries: vec![],
            threshold: 0.0,
        }
    }

    /// Appends an entry and resets the threshold to its default.
    pub fn push(&mut self, entry: EnsembleEntry) {
        self.entries.push(entry);
        self.threshold = self.default_threshold();
    }

    #[inline]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    #[inline]
    pub fn entries(&self) -> &[EnsembleEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: f64) {
        self.threshold = threshold;
    }

    pub fn default_threshold(&self) -> f64 {
        self.entries.iter().map(|e| e.alpha).sum::<f64>() / 2.0
    }

    /// Sum of the alphas of all weak classifiers voting positive.
    pub fn vote(&self, image: &IntegralImage) -> f64 {
        self.entries.iter().map(|e| e.vote(image)).sum()
    }

    /// Scores an already computed vote against the current threshold.
    pub fn score(&self, vote: f64) -> Score {
        let margin = if self.threshold != 0.0 {
            vote / self.threshold
        } else {
            0.0
        };
        Score {
            positive: vote > self.threshold,
            margin,
        }
    }

    pub fn classify(&self, image: &IntegralImage) -> Score {
        self.score(self.vote(image))
    }
}

#[cfg(test)]
mod tests {
    use super::{EnsembleEntry, StrongClassifier};
    use crate::classifier::{DecisionStump, Polarity};
    use crate::common::ImageData;
    use crate::feat::{HaarFeature, IntegralImage, Shape};

    fn left_right_window(left: f64, right: f64) -> IntegralImage {
        let image = ImageData::from_fn(4, 4, |_, col| if col < 2 { left } else { right });
        IntegralImage::new(&image)
    }

    fn classifier() -> StrongClassifier {
        // left half minus right half of the whole window
        let feature = HaarFeature::new(Shape::TwoVertical, 0, 0, 4, 4).unwrap();
        let mut classifier = StrongClassifier::new(4);
        classifier.push(EnsembleEntry::new(
            feature,
            DecisionStump::new(4.0, Polarity::Positive),
            2.0,
        ));
        classifier.push(EnsembleEntry::new(
            feature,
            DecisionStump::new(-4.0, Polarity::Negative),
            1.0,
        ));
        classifier
    }

    #[test]
    fn test_default_threshold() {
        let classifier = classifier();
        assert_eq!(1.5, classifier.threshold());
        assert_eq!(1.5, classifier.default_threshold());
        assert!(StrongClassifier::new(24).is_empty());
    }

    #[test]
    fn test_vote_and_margin() {
        let classifier = classifier();

        // feature value 8 * 1 - 8 * 0 = 8
        let bright_left = left_right_window(1.0, 0.0);
        assert_eq!(2.0, classifier.vote(&bright_left));
        let score = classifier.classify(&bright_left);
        assert!(score.is_positive());
        assert_eq!(1, score.label());
        assert_eq!(2.0 / 1.5, score.margin());

        // feature value -8
        let bright_right = left_right_window(0.0, 1.0);
        assert_eq!(1.0, classifier.vote(&bright_right));
        assert!(!classifier.classify(&bright_right).is_positive());
    }

    #[test]
    fn test_recalibrated_threshold() {
        let mut classifier = classifier();
        let bright_right = left_right_window(0.0, 1.0);

        classifier.set_threshold(0.5);
        assert!(classifier.classify(&bright_right).is_positive());
        assert_eq!(2.0, classifier.classify(&bright_right).margin());
        assert_eq!(1.5, classifier.default_threshold());
    }

    #[test]
    fn test_vote_equal_to_threshold_is_negative() {
        let classifier = classifier();
        assert!(!classifier.score(1.5).is_positive());
        assert!(classifier.score(1.5 + 1e-9).is_positive());
    }
}
