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

mod image_data;

use std::cmp;
use std::mem;

pub use self::image_data::ImageData;

/// Axis-aligned box with inclusive top-left corner (`x1`, `y1`) and exclusive
/// bottom-right corner (`x2`, `y2`); `x` indexes rows and `y` columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rectangle {
    x1: usize,
    y1: usize,
    x2: usize,
    y2: usize,
}

impl Rectangle {
    pub fn new(x1: usize, y1: usize, x2: usize, y2: usize) -> Self {
        Rectangle { x1, y1, x2, y2 }
    }

    pub fn x1(&self) -> usize {
        self.x1
    }

    pub fn y1(&self) -> usize {
        self.y1
    }

    pub fn x2(&self) -> usize {
        self.x2
    }

    pub fn y2(&self) -> usize {
        self.y2
    }

    pub fn height(&self) -> usize {
        self.x2 - self.x1
    }

    pub fn width(&self) -> usize {
        self.y2 - self.y1
    }

    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    pub fn intersection_area(&self, other: &Rectangle) -> usize {
        let x1 = cmp::max(self.x1, other.x1);
        let y1 = cmp::max(self.y1, other.y1);
        let x2 = cmp::min(self.x2, other.x2);
        let y2 = cmp::min(self.y2, other.y2);
        if x1 >= x2 || y1 >= y2 {
            0
        } else {
            (x2 - x1) * (y2 - y1)
        }
    }

    pub fn overlaps(&self, other: &Rectangle) -> bool {
        self.intersection_area(other) > 0
    }
}

/// A positively classified window.
///
/// Overlapping detections are reported as they are, without suppression.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    bbox: Rectangle,
    margin: f64,
    scale: usize,
}

impl Detection {
    pub fn new(bbox: Rectangle, margin: f64, scale: usize) -> Self {
        Detection {
            bbox,
            margin,
            scale,
        }
    }

    pub fn bbox(&self) -> &Rectangle {
        &self.bbox
    }

    /// Ensemble vote divided by the decision threshold.
    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// Index of the window fraction that produced this detection.
    pub fn scale(&self) -> usize {
        self.scale
    }
}

pub struct Seq<T, G>
where
    G: Fn(&T) -> T + Sized,
{
    generator: G,
    next: T,
}

impl<T, G> Seq<T, G>
where
    G: Fn(&T) -> T + Sized,
{
    pub fn new(first_element: T, generator: G) -> Self {
        Seq {
            generator,
            next: first_element,
        }
    }
}

impl<T, G> Iterator for Seq<T, G>
where
    G: Fn(&T) -> T + Sized,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let next = (self.generator)(&self.next);
        let current = mem::replace(&mut self.next, next);
        Some(current)
    }
}
