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
use crate::error::{Error, Result};
use crate::feat::IntegralImage;

/// Grid of decision thresholds to try around the default threshold.
///
/// Candidate `k` of `0..=samples` is `pivot * (1 + sweep_width * (k / samples - 0.5))`,
/// where `pivot` is half the total alpha of the ensemble.
#[derive(Clone, Debug, PartialEq)]
pub struct CalibrationPolicy {
    min_detection_rate: f64,
    sweep_width: f64,
    samples: usize,
}

impl Default for CalibrationPolicy {
    fn default() -> Self {
        CalibrationPolicy {
            min_detection_rate: 0.9,
            sweep_width: 0.125,
            samples: 10,
        }
    }
}

impl CalibrationPolicy {
    pub fn new(min_detection_rate: f64, sweep_width: f64, samples: usize) -> Self {
        CalibrationPolicy {
            min_detection_rate,
            sweep_width,
            samples,
        }
    }

    #[inline]
    pub fn min_detection_rate(&self) -> f64 {
        self.min_detection_rate
    }

    #[inline]
    pub fn sweep_width(&self) -> f64 {
        self.sweep_width
    }

    #[inline]
    pub fn samples(&self) -> usize {
        self.samples
    }

    fn candidates(&self, pivot: f64) -> Vec<f64> {
        if self.samples == 0 {
            return vec![pivot];
        }
        (0..=self.samples)
            .map(|k| {
                let offset = k as f64 / self.samples as f64 - 0.5;
                pivot * (1.0 + self.sweep_width * offset)
            })
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rates {
    detection_rate: f64,
    false_positive_rate: f64,
}

impl Rates {
    /// Fraction of positives classified positive.
    pub fn detection_rate(&self) -> f64 {
        self.detection_rate
    }

    /// Fraction of negatives classified positive.
    pub fn false_positive_rate(&self) -> f64 {
        self.false_positive_rate
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Calibration {
    threshold: f64,
    rates: Rates,
}

impl Calibration {
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn rates(&self) -> &Rates {
        &self.rates
    }
}

fn votes(classifier: &StrongClassifier, examples: &[IntegralImage]) -> Vec<f64> {
    #[cfg(feature = "rayon")]
    let iter = examples.par_iter();
    #[cfg(not(feature = "rayon"))]
    let iter = examples.iter();

    iter.map(|example| classifier.vote(example)).collect()
}

fn accepted_fraction(votes: &[f64], threshold: f64) -> f64 {
    if votes.is_empty() {
        return 0.0;
    }
    votes.iter().filter(|&&vote| vote > threshold).count() as f64 / votes.len() as f64
}

/// Detection and false-positive rates at the classifier's current threshold.
pub fn evaluate(
    classifier: &StrongClassifier,
    positives: &[IntegralImage],
    negatives: &[IntegralImage],
) -> Rates {
    let threshold = classifier.threshold();
    Rates {
        detection_rate: accepted_fraction(&votes(classifier, positives), threshold),
        false_positive_rate: accepted_fraction(&votes(classifier, negatives), threshold),
    }
}

/// Picks the candidate threshold with the lowest false-positive rate among
/// those keeping the detection rate at or above the policy's minimum, and
/// installs it in `classifier`.
///
/// On failure the classifier keeps its current threshold.
pub fn calibrate(
    classifier: &mut StrongClassifier,
    positives: &[IntegralImage],
    negatives: &[IntegralImage],
    policy: &CalibrationPolicy,
) -> Result<Calibration> {
    if positives.is_empty() || negatives.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "calibration needs both classes, got {} positives and {} negatives",
            positives.len(),
            negatives.len()
        )));
    }

    let positive_votes = votes(classifier, positives);
    let negative_votes = votes(classifier, negatives);

    let mut best: Option<Calibration> = None;
    for threshold in policy.candidates(classifier.default_threshold()) {
        let rates = Rates {
            detection_rate: accepted_fraction(&positive_votes, threshold),
            false_positive_rate: accepted_fraction(&negative_votes, threshold),
        };
        log::debug!("Threshold {}: {:?}", threshold, rates);

        if rates.detection_rate < policy.min_detection_rate() {
            continue;
        }
        match best {
            Some(ref current)
                if current.rates.false_positive_rate <= rates.false_positive_rate => {}
            _ => best = Some(Calibration { threshold, rates }),
        }
    }

    match best {
        Some(calibration) => {
            classifier.set_threshold(calibration.threshold);
            Ok(calibration)
        }
        None => Err(Error::CalibrationFailed {
            target: policy.min_detection_rate(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{DecisionStump, EnsembleEntry, Polarity};
    use crate::common::ImageData;
    use crate::feat::{HaarFeature, Shape};

    /// Window whose left-minus-right feature value is `value`.
    fn window(value: f64) -> IntegralImage {
        let left = value / 8.0;
        IntegralImage::new(&ImageData::from_fn(4, 4, |_, col| if col < 2 { left } else { 0.0 }))
    }

    /// Votes one per threshold in {0, 4, 8} reached by the feature value.
    fn staircase_classifier() -> StrongClassifier {
        let feature = HaarFeature::new(Shape::TwoVertical, 0, 0, 4, 4).unwrap();
        let mut classifier = StrongClassifier::new(4);
        for &threshold in &[0.0, 4.0, 8.0] {
            classifier.push(EnsembleEntry::new(
                feature,
                DecisionStump::new(threshold, Polarity::Positive),
                1.0,
            ));
        }
        classifier
    }

    fn held_out() -> (Vec<IntegralImage>, Vec<IntegralImage>) {
        let positives = [9.0, 10.0, 5.0, 5.0, 6.0, 6.0, 7.0, 4.0, 4.5, 1.0]
            .iter()
            .map(|&v| window(v))
            .collect();
        let negatives = [5.0, 2.0, 3.0, -1.0, -2.0]
            .iter()
            .map(|&v| window(v))
            .collect();
        (positives, negatives)
    }

    #[test]
    fn test_evaluate() {
        let classifier = staircase_classifier();
        let (positives, negatives) = held_out();
        let rates = evaluate(&classifier, &positives, &negatives);
        assert_eq!(0.9, rates.detection_rate());
        assert_eq!(0.2, rates.false_positive_rate());
    }

    #[test]
    fn test_rates_monotone_in_threshold() {
        let mut classifier = staircase_classifier();
        let (positives, negatives) = held_out();

        let mut previous = Rates {
            detection_rate: 1.0,
            false_positive_rate: 1.0,
        };
        for step in 0..24 {
            classifier.set_threshold(-1.0 + 0.25 * step as f64);
            let rates = evaluate(&classifier, &positives, &negatives);
            assert!(rates.detection_rate() <= previous.detection_rate());
            assert!(rates.false_positive_rate() <= previous.false_positive_rate());
            previous = rates;
        }
        assert_eq!(0.0, previous.detection_rate());
    }

    #[test]
    fn test_calibrate_picks_lowest_false_positive_rate() {
        let mut classifier = staircase_classifier();
        let (positives, negatives) = held_out();
        let policy = CalibrationPolicy::new(0.9, 1.0, 10);

        let calibration = calibrate(&mut classifier, &positives, &negatives, &policy).unwrap();
        assert!((calibration.threshold() - 1.05).abs() < 1e-9);
        assert_eq!(0.9, calibration.rates().detection_rate());
        assert_eq!(0.2, calibration.rates().false_positive_rate());
        assert_eq!(calibration.threshold(), classifier.threshold());
        assert_eq!(*calibration.rates(), evaluate(&classifier, &positives, &negatives));
    }

    #[test]
    fn test_calibrate_unreachable_detection_rate() {
        let mut classifier = staircase_classifier();
        let (positives, negatives) = held_out();
        let policy = CalibrationPolicy::new(1.0, 0.125, 10);

        let result = calibrate(&mut classifier, &positives, &negatives, &policy);
        assert!(matches!(result, Err(Error::CalibrationFailed { .. })));
        assert_eq!(1.5, classifier.threshold());
    }

    #[test]
    fn test_default_policy_candidates() {
        let candidates = CalibrationPolicy::default().candidates(2.0);
        assert_eq!(11, candidates.len());
        assert!((candidates[0] - 1.875).abs() < 1e-12);
        assert!((candidates[5] - 2.0).abs() < 1e-12);
        assert!((candidates[10] - 2.125).abs() < 1e-12);
    }
}
