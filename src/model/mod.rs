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

//! Binary model files.
//!
//! All numbers are little-endian. The layout is:
//!
//! ```text
//! i32  window size
//! f64  decision threshold
//! i32  number of entries
//! per entry:
//!     i32  shape id
//!     i32  x, y, width, height
//!     f64  stump threshold
//!     i32  polarity (1 or -1)
//!     f64  alpha
//! ```

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::classifier::{DecisionStump, EnsembleEntry, Polarity, StrongClassifier};
use crate::error::{Error, Result};
use crate::feat::{HaarFeature, Shape};

/// Load a classifier from a model file.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<StrongClassifier> {
    let file = File::open(path)?;
    read_model(BufReader::new(file))
}

/// Read a classifier from the provided source.
pub fn read_model<R: Read>(source: R) -> Result<StrongClassifier> {
    ModelReader::new(source).read()
}

/// Save a classifier to a model file, replacing any existing one.
pub fn save_model<P: AsRef<Path>>(classifier: &StrongClassifier, path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_model(classifier, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a classifier to the provided sink.
pub fn write_model<W: Write>(classifier: &StrongClassifier, sink: W) -> Result<()> {
    ModelWriter::new(sink).write(classifier)
}

struct ModelReader<R> {
    reader: R,
}

impl<R: Read> ModelReader<R> {
    fn new(reader: R) -> Self {
        ModelReader { reader }
    }

    fn read(mut self) -> Result<StrongClassifier> {
        let window_size = self.read_i32()?;
        if window_size <= 0 {
            return Err(invalid(format!("window size {}", window_size)));
        }
        let window_size = window_size as usize;
        let threshold = self.read_finite_f64("decision threshold")?;

        let num_entries = self.read_i32()?;
        if num_entries < 0 {
            return Err(invalid(format!("entry count {}", num_entries)));
        }

        let mut classifier = StrongClassifier::new(window_size);
        for _ in 0..num_entries {
            classifier.push(self.read_entry(window_size)?);
        }
        classifier.set_threshold(threshold);

        Ok(classifier)
    }

    fn read_entry(&mut self, window_size: usize) -> Result<EnsembleEntry> {
        let shape_id = self.read_i32()?;
        let shape = Shape::from(shape_id).ok_or_else(|| invalid(format!("shape id {}", shape_id)))?;

        let x = self.read_usize("x")?;
        let y = self.read_usize("y")?;
        let width = self.read_usize("width")?;
        let height = self.read_usize("height")?;
        let feature = HaarFeature::new(shape, x, y, width, height)
            .filter(|feature| feature.fits(window_size))
            .ok_or_else(|| {
                invalid(format!(
                    "{:?} feature at ({}, {}) of size {}x{} in window {}",
                    shape, x, y, width, height, window_size
                ))
            })?;

        let threshold = self.read_finite_f64("stump threshold")?;
        let polarity_id = self.read_i32()?;
        let polarity =
            Polarity::from(polarity_id).ok_or_else(|| invalid(format!("polarity {}", polarity_id)))?;
        let alpha = self.read_finite_f64("alpha")?;
        if alpha < 0.0 {
            return Err(invalid(format!("alpha {}", alpha)));
        }

        Ok(EnsembleEntry::new(
            feature,
            DecisionStump::new(threshold, polarity),
            alpha,
        ))
    }

    fn read_usize(&mut self, what: &str) -> Result<usize> {
        let value = self.read_i32()?;
        if value < 0 {
            return Err(invalid(format!("{} {}", what, value)));
        }
        Ok(value as usize)
    }

    fn read_finite_f64(&mut self, what: &str) -> Result<f64> {
        let value = self.reader.read_f64::<LittleEndian>()?;
        if !value.is_finite() {
            return Err(invalid(format!("{} {}", what, value)));
        }
        Ok(value)
    }

    fn read_i32(&mut self) -> io::Result<i32> {
        self.reader.read_i32::<LittleEndian>()
    }
}

fn invalid(message: String) -> Error {
    Error::InvalidModel(message)
}

struct ModelWriter<W> {
    writer: W,
}

impl<W: Write> ModelWriter<W> {
    fn new(writer: W) -> Self {
        ModelWriter { writer }
    }

    fn write(mut self, classifier: &StrongClassifier) -> Result<()> {
        self.write_usize(classifier.window_size())?;
        self.writer.write_f64::<LittleEndian>(classifier.threshold())?;
        self.write_usize(classifier.len())?;

        for entry in classifier.entries() {
            let feature = entry.feature();
            self.writer.write_i32::<LittleEndian>(feature.shape().id())?;
            self.write_usize(feature.x())?;
            self.write_usize(feature.y())?;
            self.write_usize(feature.width())?;
            self.write_usize(feature.height())?;
            self.writer.write_f64::<LittleEndian>(entry.stump().threshold())?;
            self.writer.write_i32::<LittleEndian>(entry.stump().polarity().id())?;
            self.writer.write_f64::<LittleEndian>(entry.alpha())?;
        }

        Ok(())
    }

    fn write_usize(&mut self, value: usize) -> Result<()> {
        if value > i32::MAX as usize {
            return Err(Error::InvalidArgument(format!(
                "{} does not fit the model format",
                value
            )));
        }
        self.writer.write_i32::<LittleEndian>(value as i32)?;
        Ok(())
    }
}
