use crate::foundation::core::FrameIndex;

/// One rendered frame as RGBA8 pixels.
///
/// Every pixel is opaque (the background covers the canvas), so the bytes are the same in
/// straight and premultiplied form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Position of this frame in the sequence.
    pub index: FrameIndex,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// RGBA of the pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Same pixels, different index. Used when a frame repeats its predecessor.
    pub(crate) fn with_index(&self, index: FrameIndex) -> Self {
        Self {
            index,
            width: self.width,
            height: self.height,
            data: self.data.clone(),
        }
    }
}
