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

pub mod calibration;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::classifier::{DecisionStump, EnsembleEntry, StrongClassifier};
use crate::common::ImageData;
use crate::error::{Error, Result};
use crate::feat::{FeatureMatrix, HaarCatalog, IntegralImage, PresortedFeatures};
use crate::math;

/// Lower bound on the error used to derive alpha, keeping perfect weak
/// classifiers at a finite weight.
const ERROR_FLOOR: f64 = 1e-10;

#[derive(Clone, Debug, PartialEq)]
pub struct TrainingConfig {
    rounds: usize,
    eps: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            rounds: 200,
            eps: 1e-15,
        }
    }
}

impl TrainingConfig {
    /// `rounds` caps the ensemble size; training stops early once a weak
    /// classifier's weighted error drops below `eps`.
    pub fn new(rounds: usize, eps: f64) -> Self {
        TrainingConfig { rounds, eps }
    }

    #[inline]
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    #[inline]
    pub fn eps(&self) -> f64 {
        self.eps
    }

    fn validate(&self) -> Result<()> {
        if self.rounds == 0 {
            return Err(Error::InvalidArgument("rounds must be at least 1".to_string()));
        }
        if !(self.eps >= 0.0) {
            return Err(Error::InvalidArgument(format!(
                "eps must be non-negative, got {}",
                self.eps
            )));
        }
        Ok(())
    }
}

/// What a single boosting round selected.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundReport {
    round: usize,
    feature_index: usize,
    stump: DecisionStump,
    error: f64,
    beta: f64,
    alpha: f64,
    detection_rate: f64,
    false_positive_rate: f64,
}

impl RoundReport {
    /// Zero-based round number.
    pub fn round(&self) -> usize {
        self.round
    }

    /// Catalog index of the selected feature.
    pub fn feature_index(&self) -> usize {
        self.feature_index
    }

    pub fn stump(&self) -> &DecisionStump {
        &self.stump
    }

    /// Weighted error of the selected weak classifier.
    pub fn error(&self) -> f64 {
        self.error
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Fraction of training positives the ensemble accepts after this round.
    pub fn detection_rate(&self) -> f64 {
        self.detection_rate
    }

    /// Fraction of training negatives the ensemble accepts after this round.
    pub fn false_positive_rate(&self) -> f64 {
        self.false_positive_rate
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RoundOutcome {
    /// A weak classifier was appended and the examples reweighted.
    Added(RoundReport),
    /// The appended weak classifier has an error below eps; nothing is reweighted.
    Converged(RoundReport),
    /// No weak classifier beats chance; the ensemble is unchanged.
    NoImprovement { error: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    RoundBudget,
    Converged,
    NoImprovement,
}

/// Receives progress while [`BoostingTrainer::run`] executes.
pub trait TrainingObserver {
    fn on_round(&mut self, report: &RoundReport);

    fn on_finish(&mut self, _termination: Termination, _ensemble_size: usize) {}
}

/// Reports progress through the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl TrainingObserver for LogObserver {
    fn on_round(&mut self, report: &RoundReport) {
        log::info!(
            "Round {}: feature {}, weighted error {:.6}, alpha {:.4}, detection rate {:.4}, false positive rate {:.4}",
            report.round(),
            report.feature_index(),
            report.error(),
            report.alpha(),
            report.detection_rate(),
            report.false_positive_rate()
        );
    }

    fn on_finish(&mut self, termination: Termination, ensemble_size: usize) {
        log::info!(
            "Training finished ({:?}) with {} weak classifiers",
            termination,
            ensemble_size
        );
    }
}

/// AdaBoost over decision stumps on presorted feature columns.
///
/// The trainer owns the example weights; every round reads them as a snapshot
/// when searching for the best weak classifier and then updates them.
pub struct BoostingTrainer<'a> {
    catalog: &'a HaarCatalog,
    presorted: PresortedFeatures,
    labels: Vec<bool>,
    weights: Vec<f64>,
    votes: Vec<f64>,
    classifier: StrongClassifier,
}

impl<'a> BoostingTrainer<'a> {
    pub fn new(catalog: &'a HaarCatalog, matrix: &FeatureMatrix, labels: &[bool]) -> Result<Self> {
        if matrix.num_examples() != labels.len() {
            return Err(Error::InvalidArgument(format!(
                "{} examples but {} labels",
                matrix.num_examples(),
                labels.len()
            )));
        }
        if matrix.num_features() != catalog.len() {
            return Err(Error::InvalidArgument(format!(
                "{} feature columns but {} catalog features",
                matrix.num_features(),
                catalog.len()
            )));
        }
        if catalog.is_empty() {
            return Err(Error::InvalidArgument("feature catalog is empty".to_string()));
        }

        let num_positives = labels.iter().filter(|&&label| label).count();
        let num_negatives = labels.len() - num_positives;
        if num_positives == 0 || num_negatives == 0 {
            return Err(Error::InvalidArgument(format!(
                "training needs both classes, got {} positives and {} negatives",
                num_positives, num_negatives
            )));
        }

        let weights = labels
            .iter()
            .map(|&label| {
                if label {
                    1.0 / num_positives as f64
                } else {
                    1.0 / num_negatives as f64
                }
            })
            .collect();

        Ok(BoostingTrainer {
            catalog,
            presorted: PresortedFeatures::new(matrix),
            labels: labels.to_vec(),
            weights,
            votes: vec![0.0; labels.len()],
            classifier: StrongClassifier::new(catalog.window_size()),
        })
    }

    /// Current example weights, in example order.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn classifier(&self) -> &StrongClassifier {
        &self.classifier
    }

    pub fn into_classifier(self) -> StrongClassifier {
        self.classifier
    }

    /// Runs one boosting round.
    pub fn step(&mut self, eps: f64) -> RoundOutcome {
        let total: f64 = self.weights.iter().sum();
        for weight in self.weights.iter_mut() {
            *weight /= total;
        }

        let (feature_index, stump, error) = self.best_weak_classifier();
        let converged = error < eps;
        if !converged && error >= 0.5 {
            return RoundOutcome::NoImprovement { error };
        }

        let mut predictions = vec![false; self.labels.len()];
        let (values, indices) = self.presorted.column(feature_index);
        for (&value, &example) in values.iter().zip(indices) {
            predictions[example] = stump.classify(value);
        }

        let beta = beta(error, converged);
        let alpha = (1.0 / beta).ln();

        for (i, &predicted) in predictions.iter().enumerate() {
            if !converged && predicted == self.labels[i] {
                self.weights[i] *= beta;
            }
            if predicted {
                self.votes[i] += alpha;
            }
        }

        self.classifier.push(EnsembleEntry::new(
            *self.catalog.get(feature_index),
            stump,
            alpha,
        ));

        let (detection_rate, false_positive_rate) = self.training_rates();
        let report = RoundReport {
            round: self.classifier.len() - 1,
            feature_index,
            stump,
            error,
            beta,
            alpha,
            detection_rate,
            false_positive_rate,
        };
        log::debug!(
            "Selected feature {:?} with error {}",
            self.catalog.get(feature_index),
            error
        );

        if converged {
            RoundOutcome::Converged(report)
        } else {
            RoundOutcome::Added(report)
        }
    }

    /// Boosts until the round budget is spent or a round converges.
    pub fn run<O>(&mut self, config: &TrainingConfig, observer: &mut O) -> Result<Termination>
    where
        O: TrainingObserver + ?Sized,
    {
        config.validate()?;

        let termination = loop {
            if self.classifier.len() >= config.rounds() {
                break Termination::RoundBudget;
            }
            match self.step(config.eps()) {
                RoundOutcome::Added(report) => observer.on_round(&report),
                RoundOutcome::Converged(report) => {
                    observer.on_round(&report);
                    break Termination::Converged;
                }
                RoundOutcome::NoImprovement { error } => {
                    log::debug!("Best weighted error {} does not beat chance", error);
                    break Termination::NoImprovement;
                }
            }
        };

        observer.on_finish(termination, self.classifier.len());
        Ok(termination)
    }

    fn best_weak_classifier(&self) -> (usize, DecisionStump, f64) {
        let labels = &self.labels;
        let weights = &self.weights;
        let presorted = &self.presorted;

        #[cfg(feature = "rayon")]
        let features = (0..presorted.num_features()).into_par_iter();
        #[cfg(not(feature = "rayon"))]
        let features = 0..presorted.num_features();

        let candidates: Vec<(DecisionStump, f64)> = features
            .map(|feature| {
                let (values, indices) = presorted.column(feature);
                DecisionStump::train_presorted(values, labels, weights, indices)
            })
            .collect();

        // the catalog is never empty here, see `new`
        let best = math::argmin(candidates.iter().map(|&(_, error)| error)).unwrap_or(0);
        let (stump, error) = candidates[best];
        (best, stump, error)
    }

    fn training_rates(&self) -> (f64, f64) {
        let threshold = self.classifier.threshold();
        let mut accepted = [0usize; 2];
        let mut total = [0usize; 2];
        for (&vote, &label) in self.votes.iter().zip(self.labels.iter()) {
            let class = usize::from(label);
            total[class] += 1;
            if vote > threshold {
                accepted[class] += 1;
            }
        }
        (
            accepted[1] as f64 / total[1] as f64,
            accepted[0] as f64 / total[0] as f64,
        )
    }
}

/// `error / (1 - error)`, with the error floored for converged or perfect rounds.
fn beta(error: f64, converged: bool) -> f64 {
    let error_term = if converged || error == 0.0 {
        error.max(ERROR_FLOOR)
    } else {
        error
    };
    error_term / (1.0 - error)
}

/// Trains a classifier on a precomputed feature matrix.
pub fn train_on_features(
    catalog: &HaarCatalog,
    matrix: &FeatureMatrix,
    labels: &[bool],
    config: &TrainingConfig,
) -> Result<StrongClassifier> {
    let mut trainer = BoostingTrainer::new(catalog, matrix, labels)?;
    trainer.run(config, &mut LogObserver)?;
    Ok(trainer.into_classifier())
}

/// Trains a classifier on canonical, brightness-normalized square images.
pub fn train(images: &[ImageData], labels: &[bool], config: &TrainingConfig) -> Result<StrongClassifier> {
    config.validate()?;
    if images.len() != labels.len() {
        return Err(Error::InvalidArgument(format!(
            "{} images but {} labels",
            images.len(),
            labels.len()
        )));
    }
    let window_size = match images.first() {
        Some(image) => image.width(),
        None => return Err(Error::InvalidArgument("no training images".to_string())),
    };
    if let Some(image) = images
        .iter()
        .find(|image| image.width() != window_size || image.height() != window_size)
    {
        return Err(Error::InvalidArgument(format!(
            "expected {}x{} images, got {}x{}",
            window_size,
            window_size,
            image.height(),
            image.width()
        )));
    }

    let catalog = HaarCatalog::new(window_size);
    log::debug!(
        "Featurizing {} images with {} features",
        images.len(),
        catalog.len()
    );

    let integral_images: Vec<IntegralImage> = images.iter().map(IntegralImage::new).collect();
    let matrix = FeatureMatrix::build(&catalog, &integral_images);
    train_on_features(&catalog, &matrix, labels, config)
}
