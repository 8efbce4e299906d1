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

use crate::common::ImageData;
use crate::math;

/// Summed-area table of an image, padded with one leading zero row and column.
#[derive(Clone, Debug)]
pub struct IntegralImage {
    data: Vec<f64>,
    width: usize,
    height: usize,
}

impl IntegralImage {
    pub fn new(image: &ImageData) -> Self {
        IntegralImage {
            data: math::compute_integral(image.data(), image.width(), image.height()),
            width: image.width(),
            height: image.height(),
        }
    }

    /// Width of the source image.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the source image.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn at(&self, row: usize, col: usize) -> f64 {
        self.data[row * (self.width + 1) + col]
    }

    /// Sum of the source pixels in rows `x1..=x2` and columns `y1..=y2`.
    ///
    /// # Panics
    ///
    /// Panics if the rectangle is inverted or leaves the image.
    #[inline]
    pub fn rect_sum(&self, x1: usize, y1: usize, x2: usize, y2: usize) -> f64 {
        if x1 > x2 || y1 > y2 || x2 >= self.height || y2 >= self.width {
            panic!(
                "Illegal rectangle: ({}, {})-({}, {}) in {}x{} image",
                x1, y1, x2, y2, self.height, self.width
            );
        }

        self.at(x2 + 1, y2 + 1) - self.at(x1, y2 + 1) - self.at(x2 + 1, y1) + self.at(x1, y1)
    }
}
