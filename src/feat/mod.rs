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

mod feature_matrix;
mod haar;
mod integral_image;

pub use self::feature_matrix::{FeatureMatrix, PresortedFeatures};
pub use self::haar::{HaarCatalog, HaarFeature, Shape, DEFAULT_CATALOG_STRIDE};
pub use self::integral_image::IntegralImage;
