//! First-writer-wins fusion of per-person masks into one label map.

use crate::types::{DatasetError, DatasetResult, LabelMask};
use std::path::{Path, PathBuf};

/// Accumulates per-person part masks into a single semantic label map.
///
/// Summing overlapping person masks would double-count every pixel two
/// people share and produce out-of-range class values there. The fuser
/// keeps a per-pixel claim bitmap instead: the first mask (in absorb order)
/// with a non-zero class at a pixel owns that pixel, and every later mask
/// is ignored there. Claims only ever grow.
#[derive(Debug)]
pub struct LabelFuser {
    fused: LabelMask,
    claimed: Vec<bool>,
}

impl LabelFuser {
    /// Start from the first mask: its values are taken verbatim and its
    /// non-zero pixels are claimed.
    pub fn new(first: LabelMask) -> Self {
        let claimed = first.data.iter().map(|&v| v != 0).collect();
        Self {
            fused: first,
            claimed,
        }
    }

    /// Fold one more mask into the map. Only pixels that are still
    /// unclaimed and non-zero in `mask` contribute; each such pixel is
    /// claimed permanently.
    pub fn absorb(&mut self, path: &Path, mask: &LabelMask) -> DatasetResult<()> {
        if mask.width != self.fused.width || mask.height != self.fused.height {
            return Err(DatasetError::MaskShape {
                path: path.to_path_buf(),
                expected_w: self.fused.width,
                expected_h: self.fused.height,
                actual_w: mask.width,
                actual_h: mask.height,
            });
        }
        for (i, &value) in mask.data.iter().enumerate() {
            if value != 0 && !self.claimed[i] {
                self.fused.data[i] = value;
                self.claimed[i] = true;
            }
        }
        Ok(())
    }

    pub fn finish(self) -> LabelMask {
        self.fused
    }
}

/// Decode and fuse every mask for one image, in slice order.
pub fn fuse_labels(paths: &[PathBuf]) -> DatasetResult<LabelMask> {
    let mut paths = paths.iter();
    let Some(first) = paths.next() else {
        return Err(DatasetError::Other(
            "cannot fuse an empty annotation list".to_string(),
        ));
    };
    let mut fuser = LabelFuser::new(decode_mask(first)?);
    for path in paths {
        let mask = decode_mask(path)?;
        fuser.absorb(path, &mask)?;
    }
    Ok(fuser.finish())
}

/// Decode one mask file to a single-channel map, squeezing any channel
/// dimension the container carries.
pub fn decode_mask(path: &Path) -> DatasetResult<LabelMask> {
    let img = image::open(path)
        .map_err(|e| DatasetError::Image {
            path: path.to_path_buf(),
            source: e,
        })?
        .into_luma8();
    let (width, height) = img.dimensions();
    Ok(LabelMask {
        data: img.into_raw(),
        height,
        width,
    })
}

#[cfg(test)]
mod fuse_tests {
    use super::LabelFuser;
    use crate::types::{DatasetError, LabelMask};
    use std::path::Path;

    fn mask(width: u32, height: u32, data: Vec<u8>) -> LabelMask {
        LabelMask {
            data,
            height,
            width,
        }
    }

    #[test]
    fn first_mask_wins_on_overlap() {
        let a = mask(2, 1, vec![4, 0]);
        let b = mask(2, 1, vec![7, 7]);

        let mut fuser = LabelFuser::new(a.clone());
        fuser.absorb(Path::new("b.png"), &b).unwrap();
        assert_eq!(fuser.finish().data, vec![4, 7]);

        let mut fuser = LabelFuser::new(b);
        fuser.absorb(Path::new("a.png"), &a).unwrap();
        assert_eq!(fuser.finish().data, vec![7, 7]);
    }

    #[test]
    fn disjoint_masks_are_additive() {
        let a = mask(2, 2, vec![3, 0, 0, 0]);
        let b = mask(2, 2, vec![0, 5, 0, 0]);
        let mut fuser = LabelFuser::new(a);
        fuser.absorb(Path::new("b.png"), &b).unwrap();
        assert_eq!(fuser.finish().data, vec![3, 5, 0, 0]);
    }

    #[test]
    fn single_mask_round_trips() {
        let a = mask(2, 2, vec![1, 2, 0, 18]);
        assert_eq!(LabelFuser::new(a.clone()).finish(), a);
    }

    #[test]
    fn claims_survive_zero_pixels_in_later_masks() {
        let a = mask(3, 1, vec![2, 0, 0]);
        let b = mask(3, 1, vec![0, 6, 0]);
        let c = mask(3, 1, vec![9, 9, 9]);
        let mut fuser = LabelFuser::new(a);
        fuser.absorb(Path::new("b.png"), &b).unwrap();
        fuser.absorb(Path::new("c.png"), &c).unwrap();
        assert_eq!(fuser.finish().data, vec![2, 6, 9]);
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let a = mask(2, 2, vec![0; 4]);
        let b = mask(3, 2, vec![0; 6]);
        let mut fuser = LabelFuser::new(a);
        let err = fuser.absorb(Path::new("odd.png"), &b).unwrap_err();
        match err {
            DatasetError::MaskShape {
                expected_w,
                expected_h,
                actual_w,
                actual_h,
                ..
            } => {
                assert_eq!((expected_w, expected_h), (2, 2));
                assert_eq!((actual_w, actual_h), (3, 2));
            }
            other => panic!("expected MaskShape, got {other:?}"),
        }
    }
}
