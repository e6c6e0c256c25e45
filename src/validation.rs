//! Dataset integrity summaries and quality checks.
//!
//! The index builder trusts the manifest and only fails on missing
//! annotations; image files are first touched at sample-access time. The
//! summary here gives callers an upfront audit instead.

use crate::types::{
    SampleEntry, Split, SplitSummary, ValidationOutcome, ValidationReport, ValidationThresholds,
};

pub fn summarize_entries(split: Split, entries: &[SampleEntry]) -> SplitSummary {
    let mut summary = SplitSummary {
        split: split.as_str().to_string(),
        images: entries.len(),
        ..Default::default()
    };
    if let Some(first) = entries.first() {
        summary.min_annotations_per_image = first.annotation_paths.len();
    }
    for entry in entries {
        if !entry.image_path.exists() {
            summary.missing_images += 1;
        }
        let count = entry.annotation_paths.len();
        summary.annotations += count;
        summary.min_annotations_per_image = summary.min_annotations_per_image.min(count);
        summary.max_annotations_per_image = summary.max_annotations_per_image.max(count);
    }
    summary
}

pub fn validate_summary(
    summary: SplitSummary,
    thresholds: &ValidationThresholds,
) -> ValidationReport {
    let missing = summary.missing_images;
    let ratio = missing as f32 / summary.images.max(1) as f32;

    let mut outcome = ValidationOutcome::Pass;
    let mut reasons = Vec::new();
    if let Some(max) = thresholds.max_missing {
        if missing > max {
            outcome = ValidationOutcome::Fail;
            reasons.push(format!("missing images: {missing} exceeds max {max}"));
        }
    }
    if let Some(max_ratio) = thresholds.max_missing_ratio {
        if ratio > max_ratio {
            outcome = ValidationOutcome::Fail;
            reasons.push(format!(
                "missing images: ratio {ratio:.3} exceeds max {max_ratio:.3}"
            ));
        }
    }
    if missing > 0 {
        if outcome == ValidationOutcome::Pass {
            outcome = ValidationOutcome::Warn;
        }
        reasons.push(format!("missing images: {missing} observed"));
    }

    ValidationReport {
        outcome,
        reasons,
        summary,
    }
}

pub fn validate_entries(
    split: Split,
    entries: &[SampleEntry],
    thresholds: &ValidationThresholds,
) -> ValidationReport {
    validate_summary(summarize_entries(split, entries), thresholds)
}
