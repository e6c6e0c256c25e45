//! Building the image/annotation file index from a dataset root.

use crate::types::{DatasetError, DatasetResult, SampleEntry, Split};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lossless raster format used for the per-person mask files.
const MASK_EXTENSION: &str = "png";

/// Manifest entries past this point belong to the val split.
pub const TRAIN_SPLIT_LEN: usize = 3000;

/// Scan `root` and pair every manifest image with its person masks.
///
/// The root must contain `images/`, `annotations/` (searched recursively)
/// and the split manifests `train_list.txt` / `test_list.txt`. Entries come
/// back in manifest order; construction fails loudly on any image with no
/// matching mask.
pub fn build_index(root: &Path, split: Split) -> DatasetResult<Vec<SampleEntry>> {
    let pool = index_annotations(&root.join("annotations"))?;

    let manifest = match split {
        Split::Test => root.join("test_list.txt"),
        _ => root.join("train_list.txt"),
    };
    let raw = fs::read_to_string(&manifest).map_err(|e| DatasetError::Io {
        path: manifest.clone(),
        source: e,
    })?;
    let lines: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    let files = split_slice(&lines, split);

    let mut entries = Vec::with_capacity(files.len());
    for name in files {
        let image_path = root.join("images").join(name);
        let stem = name.split('.').next().unwrap_or(name.as_str());
        let matches = annotations_for_stem(&pool, stem);
        if matches.is_empty() {
            return Err(DatasetError::EmptyIndex { image: image_path });
        }
        entries.push(SampleEntry {
            image_path,
            annotation_paths: matches,
        });
    }

    // Postcondition: one entry per manifest line in the selected slice.
    if entries.len() != files.len() {
        return Err(DatasetError::IndexMismatch {
            images: files.len(),
            annotations: entries.len(),
        });
    }
    Ok(entries)
}

/// Slice a manifest into the requested split: the first
/// [`TRAIN_SPLIT_LEN`] entries train, the remainder validate, and the test
/// manifest is used whole.
pub fn split_slice<T>(files: &[T], split: Split) -> &[T] {
    match split {
        Split::Train => &files[..files.len().min(TRAIN_SPLIT_LEN)],
        Split::Val => {
            if files.len() > TRAIN_SPLIT_LEN {
                &files[TRAIN_SPLIT_LEN..]
            } else {
                &[]
            }
        }
        Split::Test => files,
    }
}

/// Recursively index every mask under the annotations root, keyed by
/// filename stem.
fn index_annotations(dir: &Path) -> DatasetResult<BTreeMap<String, Vec<PathBuf>>> {
    let mut pool: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| dir.to_path_buf());
            DatasetError::Io {
                path,
                source: e.into(),
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        if path.extension().and_then(|s| s.to_str()) != Some(MASK_EXTENSION) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        pool.entry(stem.to_string()).or_default().push(path);
    }
    for paths in pool.values_mut() {
        paths.sort();
    }
    Ok(pool)
}

/// Every pool entry whose stem starts with the image stem, in
/// lexicographic order. An ordered range scan over the stem-keyed map
/// replaces a full-pool substring pass per image.
fn annotations_for_stem(pool: &BTreeMap<String, Vec<PathBuf>>, stem: &str) -> Vec<PathBuf> {
    pool.range(stem.to_string()..)
        .take_while(|(key, _)| key.starts_with(stem))
        .flat_map(|(_, paths)| paths.iter().cloned())
        .collect()
}

#[cfg(test)]
mod index_tests {
    use super::split_slice;
    use crate::types::Split;

    #[test]
    fn manifest_slicing_partitions_train_and_val() {
        let files: Vec<String> = (0..5000).map(|i| format!("{i:04}.jpg")).collect();
        let train = split_slice(&files, Split::Train);
        let val = split_slice(&files, Split::Val);
        assert_eq!(train.len(), 3000);
        assert_eq!(val.len(), 2000);
        assert_eq!(train.len() + val.len(), files.len());
        assert_eq!(split_slice(&files, Split::Test).len(), 5000);
    }

    #[test]
    fn short_manifest_is_all_train() {
        let files: Vec<String> = (0..5).map(|i| format!("{i}.jpg")).collect();
        assert_eq!(split_slice(&files, Split::Train).len(), 5);
        assert!(split_slice(&files, Split::Val).is_empty());
    }
}
