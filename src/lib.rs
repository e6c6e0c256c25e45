//! LV-MHP-v1 human-parsing dataset loading and label fusion.
//!
//! This crate provides utilities for:
//! - Discovering image/annotation pairs from a dataset root and split manifest
//! - Fusing per-person part masks into one semantic label map (first-writer-wins)
//! - Per-sample random access for an external batching loop
//! - Palette-based label decoding for visualization

pub mod dataset;
pub mod fuse;
pub mod index;
pub mod types;
pub mod validation;

// Re-export public API
pub use dataset::{MhpDataset, Transform};
pub use fuse::{decode_mask, fuse_labels, LabelFuser};
pub use index::{build_index, split_slice, TRAIN_SPLIT_LEN};
pub use types::*;
pub use validation::{summarize_entries, validate_entries, validate_summary};
