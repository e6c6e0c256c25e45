use std::fs;
use std::path::PathBuf;

use clap::Parser;
use mhp_dataset::{
    summarize_entries, validate_summary, MhpDataset, Split, ValidationOutcome,
    ValidationThresholds,
};

#[derive(Parser, Debug)]
#[command(
    name = "preview",
    about = "Inspect an LV-MHP-v1 dataset split and render one sample's label map"
)]
struct Args {
    /// Dataset root containing images/, annotations/ and the split manifests.
    #[arg(long)]
    root: PathBuf,
    /// Split to load.
    #[arg(long, value_enum, default_value_t = Split::Train)]
    split: Split,
    /// Sample index to render.
    #[arg(long, default_value_t = 0)]
    index: usize,
    /// Directory for rendered artifacts (defaults to <root>/previews).
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Also write the validation report as JSON.
    #[arg(long)]
    summary_json: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let dataset = MhpDataset::new(&args.root, args.split, None)?;
    let summary = summarize_entries(args.split, dataset.entries());
    let report = validate_summary(summary, &ValidationThresholds::from_env());
    println!(
        "{} split: {} images, {} annotation masks [{}]",
        report.summary.split,
        report.summary.images,
        report.summary.annotations,
        report.outcome.as_str()
    );
    for reason in &report.reasons {
        println!("  {reason}");
    }
    if let Some(path) = &args.summary_json {
        fs::write(path, serde_json::to_vec_pretty(&report)?)?;
    }
    if report.outcome == ValidationOutcome::Fail {
        anyhow::bail!("dataset failed validation");
    }

    let sample = dataset.get(args.index)?;
    let entry = &dataset.entries()[args.index];
    let out_dir = args
        .out_dir
        .unwrap_or_else(|| args.root.join("previews"));
    fs::create_dir_all(&out_dir)?;

    let stem = entry
        .image_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("sample_{}", args.index));
    let label_path = out_dir.join(format!("{stem}_label.png"));
    MhpDataset::decode(&sample.label).save(&label_path)?;
    if let Some(name) = entry.image_path.file_name() {
        fs::copy(&entry.image_path, out_dir.join(name))?;
    }

    println!(
        "Wrote {} ({}x{} label map, {} persons fused)",
        label_path.display(),
        sample.label.width,
        sample.label.height,
        entry.annotation_paths.len()
    );
    Ok(())
}
