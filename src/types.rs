//! Core types, error definitions, and data structures for mhp_dataset.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub type DatasetResult<T> = Result<T, DatasetError>;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("image decode error at {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("no annotation masks matched image {image}")]
    EmptyIndex { image: PathBuf },
    #[error("index out of alignment: {images} images vs {annotations} annotation sets")]
    IndexMismatch { images: usize, annotations: usize },
    #[error(
        "annotation mask {path} is {actual_w}x{actual_h}, expected {expected_w}x{expected_h}"
    )]
    MaskShape {
        path: PathBuf,
        expected_w: u32,
        expected_h: u32,
        actual_w: u32,
        actual_h: u32,
    },
    #[error("sample index {index} out of range for {len} samples")]
    OutOfRange { index: usize, len: usize },
    #[error("{0}")]
    Other(String),
}

/// Dataset partition selected at construction time.
///
/// Train and val share `train_list.txt` (first 3000 entries vs the rest);
/// test reads `test_list.txt` whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }
}

/// One index entry: an image plus every per-person mask that belongs to it.
#[derive(Debug, Clone)]
pub struct SampleEntry {
    pub image_path: PathBuf,
    /// Ordered by filename stem for deterministic fusion; never empty
    /// after a successful index build.
    pub annotation_paths: Vec<PathBuf>,
}

/// Image pixels in CHW layout, one byte per channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTensor {
    pub data: Vec<u8>,
    pub channels: u32,
    pub height: u32,
    pub width: u32,
}

/// Single-channel H×W class-index map, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMask {
    pub data: Vec<u8>,
    pub height: u32,
    pub width: u32,
}

impl LabelMask {
    /// Widen class indices for downstream loss indexing.
    pub fn widen(self) -> LabelTensor {
        LabelTensor {
            data: self.data.iter().map(|&v| i64::from(v)).collect(),
            height: self.height,
            width: self.width,
        }
    }
}

/// Fused label map in the integer width loss computation indexes with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTensor {
    pub data: Vec<i64>,
    pub height: u32,
    pub width: u32,
}

/// One loaded sample, exclusively owned by the caller.
#[derive(Debug, Clone)]
pub struct ParsingSample {
    pub image: ImageTensor,
    pub label: LabelTensor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationOutcome {
    Pass,
    Warn,
    Fail,
}

impl ValidationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationOutcome::Pass => "pass",
            ValidationOutcome::Warn => "warn",
            ValidationOutcome::Fail => "fail",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SplitSummary {
    pub split: String,
    pub images: usize,
    /// Manifest entries whose image file is absent on disk.
    pub missing_images: usize,
    pub annotations: usize,
    pub min_annotations_per_image: usize,
    pub max_annotations_per_image: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationThresholds {
    pub max_missing: Option<usize>,
    pub max_missing_ratio: Option<f32>,
}

impl ValidationThresholds {
    pub fn from_env() -> Self {
        fn parse<T: std::str::FromStr>(key: &str) -> Option<T> {
            std::env::var(key).ok()?.parse().ok()
        }
        ValidationThresholds {
            max_missing: parse("MHP_DATASET_MAX_MISSING"),
            max_missing_ratio: parse("MHP_DATASET_MAX_MISSING_RATIO"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub outcome: ValidationOutcome,
    pub reasons: Vec<String>,
    pub summary: SplitSummary,
}
