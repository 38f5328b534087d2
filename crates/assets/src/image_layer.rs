use aberration_common::LayerId;
use image::RgbaImage;
use image::imageops::{self, FilterType};

/// Texel bound to every unit before its image arrives. Opaque black adds
/// nothing to the composite.
pub const PLACEHOLDER_TEXEL: [u8; 4] = [0, 0, 0, 255];

/// Full mip chain for `base`, halving each side (min 1) down to 1x1.
pub fn mip_chain(base: RgbaImage) -> Vec<RgbaImage> {
    let largest = base.width().max(base.height()).max(1);
    let levels = (u32::BITS - largest.leading_zeros()) as usize;
    let mut chain = Vec::with_capacity(levels);
    chain.push(base);
    for level in 1..levels {
        let prev = &chain[level - 1];
        let w = (prev.width() / 2).max(1);
        let h = (prev.height() / 2).max(1);
        let next = imageops::resize(prev, w, h, FilterType::Triangle);
        chain.push(next);
    }
    chain
}

/// A decoded layer image with its mip chain, ready for upload.
#[derive(Debug, Clone)]
pub struct LayerImage {
    layer: LayerId,
    mips: Vec<RgbaImage>,
}

impl LayerImage {
    pub fn new(layer: LayerId, base: RgbaImage) -> Self {
        Self {
            layer,
            mips: mip_chain(base),
        }
    }

    pub fn layer(&self) -> LayerId {
        self.layer
    }

    pub fn width(&self) -> u32 {
        self.mips[0].width()
    }

    pub fn height(&self) -> u32 {
        self.mips[0].height()
    }

    /// Level 0 first.
    pub fn mips(&self) -> &[RgbaImage] {
        &self.mips
    }

    pub fn mip_count(&self) -> u32 {
        self.mips.len() as u32
    }
}
