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

use std::fs;
use std::path::Path;

use image::imageops::FilterType;

use haarboost::{calibrate, CalibrationPolicy, ImageData, IntegralImage, TrainingConfig};

const WINDOW_SIZE: u32 = 24;
const HOLD_OUT_EVERY: usize = 5;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        println!(
            "Usage: {} <positives-dir> <negatives-dir> <output-model>",
            args[0]
        );
        std::process::exit(1)
    }

    let positives = load_dir(&args[1]);
    let negatives = load_dir(&args[2]);
    println!(
        "Loaded {} positive and {} negative images",
        positives.len(),
        negatives.len()
    );

    let (train_pos, held_pos) = split(positives);
    let (train_neg, held_neg) = split(negatives);

    let labels: Vec<bool> = train_pos
        .iter()
        .map(|_| true)
        .chain(train_neg.iter().map(|_| false))
        .collect();
    let images: Vec<ImageData> = train_pos.into_iter().chain(train_neg).collect();

    let mut classifier = match haarboost::train(&images, &labels, &TrainingConfig::default()) {
        Ok(classifier) => classifier,
        Err(error) => {
            println!("Training failed: {}", error);
            std::process::exit(1)
        }
    };
    println!("Trained {} weak classifiers", classifier.len());

    let held_pos: Vec<IntegralImage> = held_pos.iter().map(IntegralImage::new).collect();
    let held_neg: Vec<IntegralImage> = held_neg.iter().map(IntegralImage::new).collect();
    match calibrate(
        &mut classifier,
        &held_pos,
        &held_neg,
        &CalibrationPolicy::default(),
    ) {
        Ok(calibration) => println!(
            "Calibrated threshold {}: detection rate {}, false positive rate {}",
            calibration.threshold(),
            calibration.rates().detection_rate(),
            calibration.rates().false_positive_rate()
        ),
        Err(error) => println!("Keeping default threshold: {}", error),
    }

    match haarboost::save_model(&classifier, &args[3]) {
        Ok(_) => println!("Saved model to {}", args[3]),
        Err(error) => println!("Failed to save model. Reason: {}", error),
    }
}

fn load_dir<P: AsRef<Path>>(dir: P) -> Vec<ImageData> {
    let entries = match fs::read_dir(dir.as_ref()) {
        Ok(entries) => entries,
        Err(message) => {
            println!("Failed to read {}: {}", dir.as_ref().display(), message);
            std::process::exit(1)
        }
    };

    let mut paths: Vec<_> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    paths.sort();

    paths
        .iter()
        .filter_map(|path| match image::open(path) {
            Ok(image) => {
                let gray = image
                    .resize_exact(WINDOW_SIZE, WINDOW_SIZE, FilterType::Triangle)
                    .to_luma8();
                let size = WINDOW_SIZE as usize;
                Some(ImageData::from_luma(gray.as_raw(), size, size).normalized())
            }
            Err(message) => {
                println!("Skipping {}: {}", path.display(), message);
                None
            }
        })
        .collect()
}

/// Every fifth image is held out for calibration.
fn split(images: Vec<ImageData>) -> (Vec<ImageData>, Vec<ImageData>) {
    let mut train = vec![];
    let mut held_out = vec![];
    for (i, image) in images.into_iter().enumerate() {
        if i % HOLD_OUT_EVERY == HOLD_OUT_EVERY - 1 {
            held_out.push(image);
        } else {
            train.push(image);
        }
    }
    (train, held_out)
}
