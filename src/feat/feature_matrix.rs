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

use super::{HaarCatalog, IntegralImage};
use crate::error::{Error, Result};

/// Examples x features table of feature values, stored row-major.
#[derive(Clone, Debug)]
pub struct FeatureMatrix {
    values: Vec<f64>,
    num_examples: usize,
    num_features: usize,
}

impl FeatureMatrix {
    /// Evaluates every catalog feature on every example.
    pub fn build(catalog: &HaarCatalog, examples: &[IntegralImage]) -> Self {
        let num_features = catalog.len();
        let mut values = vec![0.0; examples.len() * num_features];

        if num_features > 0 {
            #[cfg(feature = "rayon")]
            let rows = values.par_chunks_mut(num_features);
            #[cfg(not(feature = "rayon"))]
            let rows = values.chunks_mut(num_features);

            rows.zip(examples)
                .for_each(|(row, example)| catalog.compute_values(example, row));
        }

        log::debug!(
            "Built feature matrix: {} examples x {} features",
            examples.len(),
            num_features
        );

        FeatureMatrix {
            values,
            num_examples: examples.len(),
            num_features,
        }
    }

    /// Assembles a matrix from per-example rows of equal length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let num_examples = rows.len();
        let num_features = rows.first().map_or(0, |row| row.len());
        if let Some(i) = rows.iter().position(|row| row.len() != num_features) {
            return Err(Error::InvalidArgument(format!(
                "row {} has {} features, expected {}",
                i,
                rows[i].len(),
                num_features
            )));
        }

        Ok(FeatureMatrix {
            values: rows.into_iter().flatten().collect(),
            num_examples,
            num_features,
        })
    }

    #[inline]
    pub fn num_examples(&self) -> usize {
        self.num_examples
    }

    #[inline]
    pub fn num_features(&self) -> usize {
        self.num_features
    }

    #[inline]
    pub fn get(&self, example: usize, feature: usize) -> f64 {
        self.values[example * self.num_features + feature]
    }

    #[inline]
    pub fn row(&self, example: usize) -> &[f64] {
        let start = example * self.num_features;
        &self.values[start..(start + self.num_features)]
    }
}

/// Every feature column of a [`FeatureMatrix`] sorted ascending, together with
/// the permutation back to example order.
///
/// Built once before boosting and only read afterwards.
#[derive(Clone, Debug)]
pub struct PresortedFeatures {
    values: Vec<f64>,
    indices: Vec<usize>,
    num_examples: usize,
}

impl PresortedFeatures {
    pub fn new(matrix: &FeatureMatrix) -> Self {
        let num_examples = matrix.num_examples();
        let num_features = matrix.num_features();
        let mut values = vec![0.0; num_examples * num_features];
        let mut indices = vec![0; num_examples * num_features];

        if num_examples > 0 {
            #[cfg(feature = "rayon")]
            let columns = values
                .par_chunks_mut(num_examples)
                .zip(indices.par_chunks_mut(num_examples))
                .enumerate();
            #[cfg(not(feature = "rayon"))]
            let columns = values
                .chunks_mut(num_examples)
                .zip(indices.chunks_mut(num_examples))
                .enumerate();

            columns.for_each(|(feature, (sorted, order))| {
                for (k, slot) in order.iter_mut().enumerate() {
                    *slot = k;
                }
                order.sort_by(|&a, &b| matrix.get(a, feature).total_cmp(&matrix.get(b, feature)));
                for (value, &example) in sorted.iter_mut().zip(order.iter()) {
                    *value = matrix.get(example, feature);
                }
            });
        }

        log::debug!("Presorted {} feature columns", num_features);

        PresortedFeatures {
            values,
            indices,
            num_examples,
        }
    }

    #[inline]
    pub fn num_features(&self) -> usize {
        if self.num_examples == 0 {
            0
        } else {
            self.values.len() / self.num_examples
        }
    }

    /// Sorted values of `feature` and, for each sorted position, the example it came from.
    #[inline]
    pub fn column(&self, feature: usize) -> (&[f64], &[usize]) {
        let start = feature * self.num_examples;
        let end = start + self.num_examples;
        (&self.values[start..end], &self.indices[start..end])
    }
}

#[cfg(test)]
mod tests {
    use super::{FeatureMatrix, PresortedFeatures};
    use crate::common::ImageData;
    use crate::feat::{HaarCatalog, IntegralImage};

    #[test]
    fn test_build_matches_direct_evaluation() {
        let catalog = HaarCatalog::new(6);
        let examples: Vec<IntegralImage> = (0..3)
            .map(|k| {
                let image = ImageData::from_fn(6, 6, |row, col| ((row * 7 + col * 3 + k) % 5) as f64);
                IntegralImage::new(&image)
            })
            .collect();

        let matrix = FeatureMatrix::build(&catalog, &examples);
        assert_eq!(3, matrix.num_examples());
        assert_eq!(catalog.len(), matrix.num_features());
        for (i, example) in examples.iter().enumerate() {
            for (j, feature) in catalog.features().iter().enumerate() {
                assert_eq!(feature.compute_value(example), matrix.get(i, j));
            }
        }
    }

    #[test]
    fn test_from_rows_rejects_ragged_rows() {
        assert!(FeatureMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).is_err());
        let matrix = FeatureMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(&[3.0, 4.0], matrix.row(1));
    }

    #[test]
    fn test_presorted_columns() {
        let matrix = FeatureMatrix::from_rows(vec![
            vec![3.0, -1.0],
            vec![1.0, -2.0],
            vec![2.0, -3.0],
        ])
        .unwrap();
        let presorted = PresortedFeatures::new(&matrix);

        assert_eq!(2, presorted.num_features());
        let (values, indices) = presorted.column(0);
        assert_eq!(&[1.0, 2.0, 3.0], values);
        assert_eq!(&[1, 2, 0], indices);
        let (values, indices) = presorted.column(1);
        assert_eq!(&[-3.0, -2.0, -1.0], values);
        assert_eq!(&[2, 1, 0], indices);
    }
}
