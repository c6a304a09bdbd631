use resvg::tiny_skia::{self, FillRule, Paint, PathBuilder, Pixmap, Rect, Transform};

use crate::eval::timeline::RenderableState;
use crate::foundation::core::{Canvas, FrameIndex, Point, Rgb8};
use crate::foundation::error::PipelineError;
use crate::render::frame::FrameRGBA;
use crate::render::text::{TextAlign, TextRasterizer, TextRun};
use crate::scene::model::ObjectKind;

/// Rasterizer settings.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RasterOpts {
    /// Anti-alias shape edges.
    pub anti_alias: bool,
    /// Load installed system fonts for TEXT objects. When off, text draws nothing.
    pub load_system_fonts: bool,
    /// Preferred font family for TEXT objects.
    pub font_family: String,
    /// Text stamped in the bottom-right corner of every frame, above all objects.
    pub watermark: Option<String>,
}

impl Default for RasterOpts {
    fn default() -> Self {
        Self {
            anti_alias: true,
            load_system_fonts: true,
            font_family: "sans-serif".to_string(),
            watermark: None,
        }
    }
}

impl RasterOpts {
    pub fn with_anti_alias(mut self, on: bool) -> Self {
        self.anti_alias = on;
        self
    }

    pub fn with_system_fonts(mut self, on: bool) -> Self {
        self.load_system_fonts = on;
        self
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    pub fn with_watermark(mut self, text: impl Into<String>) -> Self {
        self.watermark = Some(text.into());
        self
    }
}

/// Gap between the watermark and the canvas edges, in pixels.
const WATERMARK_PADDING: f64 = 15.0;
const WATERMARK_ALPHA: u8 = 200;

/// Dark gray on light backgrounds, white on dark ones (Rec. 601 luma).
fn contrasting(bg: Rgb8) -> Rgb8 {
    let luma = 0.299 * f64::from(bg.r) + 0.587 * f64::from(bg.g) + 0.114 * f64::from(bg.b);
    if luma > 127.5 {
        Rgb8::new(50, 50, 50)
    } else {
        Rgb8::new(255, 255, 255)
    }
}

/// CPU rasterizer: background fill, then every object in declaration order.
///
/// Anchors: circles at their center, rectangles at their top-left corner, text at the left end
/// of its baseline. Shapes partly or fully off-canvas are clipped.
///
/// Rendering takes `&self`, so one rasterizer can serve a whole worker pool.
#[derive(Clone)]
pub struct CpuRasterizer {
    opts: RasterOpts,
    text: TextRasterizer,
}

impl CpuRasterizer {
    pub fn new(opts: RasterOpts) -> Self {
        let text = TextRasterizer::new(opts.load_system_fonts, &opts.font_family);
        Self { opts, text }
    }

    pub fn opts(&self) -> &RasterOpts {
        &self.opts
    }

    /// Number of font faces available to TEXT objects.
    pub fn font_faces(&self) -> usize {
        self.text.face_count()
    }

    pub fn render(
        &self,
        index: FrameIndex,
        canvas: Canvas,
        background: Rgb8,
        states: &[RenderableState<'_>],
    ) -> Result<FrameRGBA, PipelineError> {
        let mut pixmap = Pixmap::new(canvas.width, canvas.height).ok_or_else(|| {
            PipelineError::internal(format!(
                "failed to allocate {}x{} frame",
                canvas.width, canvas.height
            ))
        })?;
        pixmap.fill(tiny_skia::Color::from_rgba8(
            background.r,
            background.g,
            background.b,
            255,
        ));

        for state in states {
            self.draw(&mut pixmap, canvas, state)?;
        }
        if let Some(mark) = self.opts.watermark.as_deref()
            && !mark.is_empty()
        {
            self.text
                .draw(&mut pixmap, canvas, &watermark_run(mark, canvas, background))?;
        }

        Ok(FrameRGBA {
            index,
            width: canvas.width,
            height: canvas.height,
            data: pixmap.take(),
        })
    }

    fn draw(
        &self,
        pixmap: &mut Pixmap,
        canvas: Canvas,
        state: &RenderableState<'_>,
    ) -> Result<(), PipelineError> {
        let obj = state.object;
        let (x, y) = (state.position.x as f32, state.position.y as f32);

        match &obj.kind {
            ObjectKind::Circle { radius } => {
                let path = PathBuilder::from_circle(x, y, *radius as f32).ok_or_else(|| {
                    PipelineError::internal(format!("degenerate circle '{}'", obj.id))
                })?;
                let paint = self.paint(obj.color);
                pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
            }
            ObjectKind::Rect { width, height } => {
                let rect = Rect::from_xywh(x, y, *width as f32, *height as f32).ok_or_else(|| {
                    PipelineError::internal(format!("degenerate rect '{}'", obj.id))
                })?;
                let paint = self.paint(obj.color);
                pixmap.fill_rect(rect, &paint, Transform::identity(), None);
            }
            ObjectKind::Text { content, size } => {
                let run = TextRun::new(content, *size, state.position, obj.color);
                self.text.draw(pixmap, canvas, &run)?;
            }
        }
        Ok(())
    }

    fn paint(&self, color: Rgb8) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, 255);
        paint.anti_alias = self.opts.anti_alias;
        paint
    }
}

/// Bottom-right, right-aligned, sized to a twelfth of the canvas height (24 px at least).
fn watermark_run(mark: &str, canvas: Canvas, background: Rgb8) -> TextRun<'_> {
    let size = (canvas.height / 12).max(24);
    let anchor = Point::new(
        f64::from(canvas.width) - WATERMARK_PADDING,
        f64::from(canvas.height) - WATERMARK_PADDING,
    );
    let mut run = TextRun::new(mark, size, anchor, contrasting(background));
    run.alpha = WATERMARK_ALPHA;
    run.align = TextAlign::End;
    run
}
