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

mod decision_stump;
mod strong_classifier;

pub use self::decision_stump::DecisionStump;
pub use self::strong_classifier::{EnsembleEntry, StrongClassifier};

/// Which side of the threshold a [`DecisionStump`] calls positive.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum Polarity {
    /// Values at or above the threshold are positive.
    Positive,
    /// Values at or below the threshold are positive.
    Negative,
}

impl Polarity {
    #[inline]
    pub fn from(id: i32) -> Option<Self> {
        match id {
            1 => Some(Polarity::Positive),
            -1 => Some(Polarity::Negative),
            _ => None,
        }
    }

    #[inline]
    pub fn id(self) -> i32 {
        match self {
            Polarity::Positive => 1,
            Polarity::Negative => -1,
        }
    }

    #[inline]
    pub fn sign(self) -> f64 {
        f64::from(self.id())
    }
}

/// Label and margin of one classification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Score {
    positive: bool,
    margin: f64,
}

impl Score {
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.positive
    }

    /// `1` for positive, `0` for negative.
    #[inline]
    pub fn label(&self) -> u8 {
        u8::from(self.positive)
    }

    /// Vote divided by the decision threshold.
    #[inline]
    pub fn margin(&self) -> f64 {
        self.margin
    }
}
