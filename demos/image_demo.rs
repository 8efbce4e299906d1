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

use std::env::Args;
use std::time::{Duration, Instant};

use image::{DynamicImage, GrayImage, Rgb};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use haarboost::{Detection, Detector, ImageData};

const OUTPUT_FILE: &str = "test.png";

fn main() {
    let options = match Options::parse(std::env::args()) {
        Ok(options) => options,
        Err(message) => {
            println!("Failed to parse program arguments: {}", message);
            std::process::exit(1)
        }
    };

    let mut detector = match haarboost::create_detector(options.model_path()) {
        Ok(detector) => detector,
        Err(error) => {
            println!("Failed to create detector: {}", error);
            std::process::exit(1)
        }
    };

    detector.set_window_fractions(&[0.15, 0.2, 0.25]);
    detector.set_slide_window_step(5);
    detector.set_aspect_ratio(2.0 / 3.0);

    let image: DynamicImage = match image::open(options.image_path()) {
        Ok(image) => image,
        Err(message) => {
            println!("Failed to read image: {}", message);
            std::process::exit(1)
        }
    };

    let mut rgb = image.to_rgb8();
    let detections = detect_faces(&mut *detector, &image.to_luma8());

    for detection in detections {
        let bbox = detection.bbox();
        // x1/x2 are rows, y1/y2 columns
        let rect = Rect::at(bbox.y1() as i32, bbox.x1() as i32)
            .of_size(bbox.width() as u32, bbox.height() as u32);

        draw_hollow_rect_mut(&mut rgb, rect, Rgb([255, 0, 0]));
    }

    match rgb.save(OUTPUT_FILE) {
        Ok(_) => println!("Saved result to {}", OUTPUT_FILE),
        Err(message) => println!("Failed to save result to a file. Reason: {}", message),
    }
}

fn detect_faces(detector: &mut dyn Detector, gray: &GrayImage) -> Vec<Detection> {
    let (width, height) = gray.dimensions();
    let image = ImageData::from_luma(gray.as_raw(), width as usize, height as usize).normalized();
    let now = Instant::now();
    let detections = detector.detect(&image);
    println!(
        "Found {} windows in {} ms",
        detections.len(),
        get_millis(now.elapsed())
    );
    detections
}

fn get_millis(duration: Duration) -> u64 {
    duration.as_secs() * 1000u64 + u64::from(duration.subsec_millis())
}

struct Options {
    image_path: String,
    model_path: String,
}

impl Options {
    fn parse(args: Args) -> Result<Self, String> {
        let args: Vec<String> = args.collect();
        if args.len() != 3 {
            return Err(format!("Usage: {} <model-path> <image-path>", args[0]));
        }

        Ok(Options {
            model_path: args[1].clone(),
            image_path: args[2].clone(),
        })
    }

    fn image_path(&self) -> &str {
        &self.image_path
    }

    fn model_path(&self) -> &str {
        &self.model_path
    }
}
