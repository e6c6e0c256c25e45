//! The dataset surface: construction, per-sample access, palette decode.

use crate::fuse::fuse_labels;
use crate::index::build_index;
use crate::types::{
    DatasetError, DatasetResult, ImageTensor, LabelMask, LabelTensor, ParsingSample, SampleEntry,
    Split,
};
use image::RgbImage;
use log::info;
use std::path::Path;

/// Paired image/label transform applied after fusion.
///
/// The contract is opaque to the dataset: whatever the transform returns is
/// handed to the caller unchanged, shape and dtype included.
pub trait Transform: Send + Sync {
    fn apply(&self, image: ImageTensor, label: LabelMask) -> (ImageTensor, LabelMask);
}

impl<F> Transform for F
where
    F: Fn(ImageTensor, LabelMask) -> (ImageTensor, LabelMask) + Send + Sync,
{
    fn apply(&self, image: ImageTensor, label: LabelMask) -> (ImageTensor, LabelMask) {
        self(image, label)
    }
}

/// LV-MHP-v1: 4980 images, each with at least two people (average three).
/// 3000 train / 1000 val / 980 test, 18 part classes plus background.
///
/// The index is built once at construction and held immutably; `get` is
/// purely functional over it, so one instance can serve multiple loader
/// workers concurrently.
pub struct MhpDataset {
    entries: Vec<SampleEntry>,
    split: Split,
    transform: Option<Box<dyn Transform>>,
}

impl MhpDataset {
    pub const CLASSES: [&'static str; 19] = [
        "background",
        "hat",
        "hair",
        "sunglass",
        "upper-clothes",
        "skirt",
        "pants",
        "dress",
        "belt",
        "left-shoe",
        "right-shoe",
        "face",
        "left-leg",
        "right-leg",
        "left-arm",
        "right-arm",
        "bag",
        "sacrf",
        "torso-skin",
    ];

    /// RGB triple for each class, indexed identically to [`Self::CLASSES`].
    pub const PALETTE: [[u8; 3]; 19] = [
        [0, 0, 0],
        [128, 0, 0],
        [254, 0, 0],
        [0, 85, 0],
        [169, 0, 51],
        [254, 85, 0],
        [255, 0, 85],
        [0, 119, 220],
        [85, 85, 0],
        [190, 153, 153],
        [85, 51, 0],
        [52, 86, 128],
        [0, 128, 0],
        [0, 0, 254],
        [51, 169, 220],
        [0, 254, 254],
        [85, 254, 169],
        [169, 254, 85],
        [254, 254, 0],
    ];

    pub const NUM_CLASSES: usize = Self::CLASSES.len();

    /// Pixels carrying this value are excluded from loss and metric
    /// computation downstream. Fusion never produces it.
    pub const IGNORE_LABEL: u8 = 255;

    pub fn new(
        root: impl AsRef<Path>,
        split: Split,
        transform: Option<Box<dyn Transform>>,
    ) -> DatasetResult<Self> {
        let entries = build_index(root.as_ref(), split)?;
        info!("Found {} {} images", entries.len(), split.as_str());
        Ok(Self {
            entries,
            split,
            transform,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn split(&self) -> Split {
        self.split
    }

    pub fn entries(&self) -> &[SampleEntry] {
        &self.entries
    }

    /// Load one sample: decode the image, fuse its person masks, run the
    /// transform if one was supplied, and widen the label for loss
    /// indexing. Every call re-reads from disk and owns its output.
    pub fn get(&self, index: usize) -> DatasetResult<ParsingSample> {
        let entry = self
            .entries
            .get(index)
            .ok_or(DatasetError::OutOfRange {
                index,
                len: self.entries.len(),
            })?;
        let image = decode_image(&entry.image_path)?;
        let label = fuse_labels(&entry.annotation_paths)?;
        let (image, label) = match &self.transform {
            Some(transform) => transform.apply(image, label),
            None => (image, label),
        };
        Ok(ParsingSample {
            image,
            label: label.widen(),
        })
    }

    /// Map a label map to its visualization colors.
    ///
    /// Panics on class indices outside the palette; filter
    /// [`Self::IGNORE_LABEL`] pixels before decoding.
    pub fn decode(label: &LabelTensor) -> RgbImage {
        let mut out = RgbImage::new(label.width, label.height);
        for (value, pixel) in label.data.iter().zip(out.pixels_mut()) {
            *pixel = image::Rgb(Self::PALETTE[*value as usize]);
        }
        out
    }
}

/// Decode an image file to a 3-channel CHW byte tensor.
pub(crate) fn decode_image(path: &Path) -> DatasetResult<ImageTensor> {
    let img = image::open(path)
        .map_err(|e| DatasetError::Image {
            path: path.to_path_buf(),
            source: e,
        })?
        .to_rgb8();
    let (width, height) = img.dimensions();
    let mut data = Vec::with_capacity(3 * (width * height) as usize);
    for c in 0..3 {
        for y in 0..height {
            for x in 0..width {
                data.push(img.get_pixel(x, y)[c]);
            }
        }
    }
    Ok(ImageTensor {
        data,
        channels: 3,
        height,
        width,
    })
}
