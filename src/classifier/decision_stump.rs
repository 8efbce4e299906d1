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

use super::Polarity;
use crate::error::{Error, Result};

/// Single-threshold classifier over one feature value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecisionStump {
    threshold: f64,
    polarity: Polarity,
}

impl DecisionStump {
    pub fn new(threshold: f64, polarity: Polarity) -> Self {
        DecisionStump {
            threshold,
            polarity,
        }
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[inline]
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// `true` iff `polarity * value >= polarity * threshold`.
    #[inline]
    pub fn classify(&self, value: f64) -> bool {
        let sign = self.polarity.sign();
        sign * value >= sign * self.threshold
    }

    /// Finds the stump with minimal weighted error on one feature.
    ///
    /// `values` are the feature's values sorted ascending, `labels` and `weights`
    /// are in example order, and `indices[k]` is the example holding `values[k]`.
    /// Returns the stump and its weighted error.
    pub fn train(
        values: &[f64],
        labels: &[bool],
        weights: &[f64],
        indices: &[usize],
    ) -> Result<(DecisionStump, f64)> {
        let n = values.len();
        if labels.len() != n || weights.len() != n || indices.len() != n {
            return Err(Error::InvalidArgument(format!(
                "mismatched lengths: {} values, {} labels, {} weights, {} indices",
                n,
                labels.len(),
                weights.len(),
                indices.len()
            )));
        }
        if n == 0 {
            return Err(Error::InvalidArgument("no examples to train on".to_string()));
        }
        if values.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(Error::InvalidArgument("values are not sorted".to_string()));
        }
        let mut seen = vec![false; n];
        for &i in indices {
            if i >= n || seen[i] {
                return Err(Error::InvalidArgument(format!(
                    "indices are not a permutation of 0..{}",
                    n
                )));
            }
            seen[i] = true;
        }

        Ok(DecisionStump::train_presorted(values, labels, weights, indices))
    }

    /// [`DecisionStump::train`] without argument validation.
    ///
    /// The error at sorted position `k` is the positive mass below `k` plus the
    /// negative mass at or above `k`; for the opposite polarity the roles flip.
    /// Only positions between distinct values are candidates, so the returned
    /// error is exactly the weighted error of the returned stump.
    pub(crate) fn train_presorted(
        values: &[f64],
        labels: &[bool],
        weights: &[f64],
        indices: &[usize],
    ) -> (DecisionStump, f64) {
        let n = values.len();
        let (pos_total, neg_total) = indices.iter().fold((0.0, 0.0), |(pos, neg), &i| {
            if labels[i] {
                (pos + weights[i], neg)
            } else {
                (pos, neg + weights[i])
            }
        });

        let mut pos_below = 0.0;
        let mut neg_below = 0.0;
        let mut best_positive = (f64::INFINITY, 0);
        let mut best_negative = (f64::INFINITY, 0);

        for k in 0..n {
            // positions >= k vote positive
            if k == 0 || values[k - 1] < values[k] {
                let error = pos_below + (neg_total - neg_below);
                if error < best_positive.0 {
                    best_positive = (error, k);
                }
            }

            let i = indices[k];
            if labels[i] {
                pos_below += weights[i];
            } else {
                neg_below += weights[i];
            }

            // positions <= k vote positive; ties go to the largest k, i.e. the
            // first minimum in descending order
            if k + 1 == n || values[k] < values[k + 1] {
                let error = neg_below + (pos_total - pos_below);
                if error <= best_negative.0 {
                    best_negative = (error, k);
                }
            }
        }

        let (error, stump) = if best_positive.0 <= best_negative.0 {
            (
                best_positive.0,
                DecisionStump::new(values[best_positive.1], Polarity::Positive),
            )
        } else {
            (
                best_negative.0,
                DecisionStump::new(values[best_negative.1], Polarity::Negative),
            )
        };

        (stump, error.max(0.0))
    }
}
