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

use num::Num;

/// Computes a zero-padded 2D prefix sum of a row-major `height` x `width` grid.
///
/// The result has `(height + 1) * (width + 1)` elements; element `[i, j]` holds the
/// sum of all source elements with row `< i` and column `< j`.
pub fn compute_integral<T: Num + Copy>(data: &[T], width: usize, height: usize) -> Vec<T> {
    assert_eq!(data.len(), width * height);

    let stride = width + 1;
    let mut integral = vec![T::zero(); (height + 1) * stride];

    for row in 0..height {
        let mut row_sum = T::zero();
        for col in 0..width {
            row_sum = row_sum + data[row * width + col];
            integral[(row + 1) * stride + col + 1] = integral[row * stride + col + 1] + row_sum;
        }
    }

    integral
}

/// Mean and population standard deviation.
pub fn mean_std_dev(data: &[f64]) -> (f64, f64) {
    if data.is_empty() {
        return (0.0, 0.0);
    }

    let length = data.len() as f64;
    let mean = data.iter().sum::<f64>() / length;
    let variance = data.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / length;

    (mean, variance.sqrt())
}

/// Index of the first minimal element.
pub fn argmin<I: IntoIterator<Item = f64>>(values: I) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, value) in values.into_iter().enumerate() {
        match best {
            Some((_, min)) if value >= min => {}
            _ => best = Some((i, value)),
        }
    }
    best.map(|(i, _)| i)
}
