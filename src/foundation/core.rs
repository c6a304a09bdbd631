pub use kurbo::Point;

/// Highest frame rate a scene may request.
pub const MAX_FPS: u32 = 24;
/// Shortest allowed scene, in seconds.
pub const MIN_DURATION_SECS: f64 = 0.5;
/// Longest allowed scene, in seconds.
pub const MAX_DURATION_SECS: f64 = 6.0;
/// Maximum number of SHAPE/TEXT objects in one scene.
pub const MAX_OBJECTS: usize = 50;
/// Largest canvas the rasterizer will allocate.
pub const MAX_CANVAS: Canvas = Canvas {
    width: 1280,
    height: 720,
};
/// Smallest canvas a scene may request.
pub const MIN_CANVAS: Canvas = Canvas {
    width: 320,
    height: 180,
};

/// Whether `c` may appear in drawn text.
///
/// Control characters other than tab and newline, and the noncharacters U+FFFE/U+FFFF, cannot
/// be carried into the text layout document.
pub fn is_drawable_char(c: char) -> bool {
    if matches!(c, '\t' | '\n') {
        return true;
    }
    !c.is_control() && !matches!(c, '\u{FFFE}' | '\u{FFFF}')
}

/// Absolute 0-based frame index.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// Time offset of this frame in seconds (`index / fps`).
    pub fn to_secs(self, fps: u32) -> f64 {
        self.0 as f64 / f64::from(fps.max(1))
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
        }
    }
}

impl Canvas {
    /// Return `true` when `p` lies inside the canvas expanded by half its size on every side.
    pub fn contains_anchor(self, p: Point) -> bool {
        let w = f64::from(self.width);
        let h = f64::from(self.height);
        p.x >= -w / 2.0 && p.x <= w * 1.5 && p.y >= -h / 2.0 && p.y <= h * 1.5
    }
}

/// Opaque 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Construct from channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB`. Anything else (missing `#`, wrong length, non-hex digits) is `None`.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let digits = s.strip_prefix('#')?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Lowercase `#rrggbb` form.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// RGBA bytes with full alpha.
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}
