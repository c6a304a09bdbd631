use std::sync::Arc;

use resvg::tiny_skia;

use crate::foundation::core::{Canvas, Point, Rgb8, is_drawable_char};
use crate::foundation::error::PipelineError;

/// Which end of the run sits on the anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TextAlign {
    Start,
    End,
}

/// One line of text to draw.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TextRun<'a> {
    pub(crate) content: &'a str,
    pub(crate) size: u32,
    /// Baseline point; the left end for `Start`, the right end for `End`.
    pub(crate) anchor: Point,
    pub(crate) color: Rgb8,
    pub(crate) alpha: u8,
    pub(crate) align: TextAlign,
}

impl<'a> TextRun<'a> {
    pub(crate) fn new(content: &'a str, size: u32, anchor: Point, color: Rgb8) -> Self {
        Self {
            content,
            size,
            anchor,
            color,
            alpha: 255,
            align: TextAlign::Start,
        }
    }
}

/// Draws text runs through `usvg`/`resvg` with one font database shared by every frame.
///
/// Each run becomes a one-element SVG document, so anchoring follows SVG `<text>`: `x` is the
/// left edge and `y` the baseline.
#[derive(Clone)]
pub(crate) struct TextRasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
    families: String,
}

impl TextRasterizer {
    pub(crate) fn new(load_system_fonts: bool, family: &str) -> Self {
        let mut db = usvg::fontdb::Database::new();
        if load_system_fonts {
            db.load_system_fonts();
        }

        // Generic families map to fixed names (e.g. Arial) that may be missing; fall back to
        // whatever face the database has first.
        let mut families = css_family(family);
        if let Some(first) = db
            .faces()
            .next()
            .and_then(|face| face.families.first())
            .map(|(name, _)| css_family(name))
        {
            families.push_str(", ");
            families.push_str(&first);
        }

        tracing::debug!(faces = db.len(), families = %families, "text rasterizer ready");
        Self {
            fontdb: Arc::new(db),
            families,
        }
    }

    pub(crate) fn face_count(&self) -> usize {
        self.fontdb.len()
    }

    pub(crate) fn draw(
        &self,
        pixmap: &mut tiny_skia::Pixmap,
        canvas: Canvas,
        run: &TextRun<'_>,
    ) -> Result<(), PipelineError> {
        let tree = self.layout(canvas, run)?;
        resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());
        Ok(())
    }

    fn layout(&self, canvas: Canvas, run: &TextRun<'_>) -> Result<usvg::Tree, PipelineError> {
        let mut opts = usvg::Options::default();
        opts.fontdb = Arc::clone(&self.fontdb);
        usvg::Tree::from_str(&self.svg_document(canvas, run), &opts)
            .map_err(|e| PipelineError::internal(format!("text layout failed: {e}")))
    }

    /// A canvas-sized SVG document holding only `run`.
    fn svg_document(&self, canvas: Canvas, run: &TextRun<'_>) -> String {
        let mut attrs = String::new();
        if run.align == TextAlign::End {
            attrs.push_str(r#" text-anchor="end""#);
        }
        if run.alpha < 255 {
            attrs.push_str(&format!(
                r#" fill-opacity="{:.4}""#,
                f64::from(run.alpha) / 255.0
            ));
        }

        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><text x="{x}" y="{y}" font-family="{families}" font-size="{size}" fill="{fill}"{attrs} xml:space="preserve">{text}</text></svg>"#,
            w = canvas.width,
            h = canvas.height,
            x = run.anchor.x,
            y = run.anchor.y,
            families = self.families,
            size = run.size,
            fill = run.color.to_hex(),
            text = xml_escape(run.content),
        )
    }
}

fn css_family(name: &str) -> String {
    let clean: String = name
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | '<' | '>' | '&'))
        .collect();
    match clean.as_str() {
        "serif" | "sans-serif" | "monospace" | "cursive" | "fantasy" => clean,
        _ => format!("'{clean}'"),
    }
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push(' '),
            c if is_drawable_char(c) => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            xml_escape(r#"<b>"Tom & 'Jerry'"</b>"#),
            "&lt;b&gt;&quot;Tom &amp; &apos;Jerry&apos;&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn family_names_are_quoted_unless_generic() {
        assert_eq!(css_family("sans-serif"), "sans-serif");
        assert_eq!(css_family("DejaVu Sans"), "'DejaVu Sans'");
        assert_eq!(css_family("Bad\"Name"), "'BadName'");
    }

    #[test]
    fn control_characters_are_dropped_from_markup() {
        assert_eq!(xml_escape("a\u{1}b\u{FFFF}c\td\ne"), "abc\td e");
    }

    fn canvas() -> Canvas {
        Canvas {
            width: 320,
            height: 180,
        }
    }

    fn count_text_nodes(group: &usvg::Group) -> usize {
        let mut n = 0usize;
        for child in group.children() {
            match child {
                usvg::Node::Group(g) => n += count_text_nodes(g.as_ref()),
                usvg::Node::Text(_) => n += 1,
                usvg::Node::Path(_) | usvg::Node::Image(_) => {}
            }
        }
        n
    }

    fn first_text(group: &usvg::Group) -> Option<&usvg::Text> {
        group.children().iter().find_map(|child| match child {
            usvg::Node::Group(g) => first_text(g.as_ref()),
            usvg::Node::Text(t) => Some(t.as_ref()),
            usvg::Node::Path(_) | usvg::Node::Image(_) => None,
        })
    }

    #[test]
    fn document_anchors_text_on_its_baseline() {
        let text = TextRasterizer::new(false, "sans-serif");
        let run = TextRun::new("Hi & bye", 24, Point::new(40.0, 100.0), Rgb8::new(255, 0, 0));
        let svg = text.svg_document(canvas(), &run);

        assert!(svg.contains(r#"width="320" height="180""#), "{svg}");
        assert!(svg.contains(r#"<text x="40" y="100""#), "{svg}");
        assert!(svg.contains(r#"font-size="24""#), "{svg}");
        assert!(svg.contains(r##"fill="#ff0000""##), "{svg}");
        assert!(svg.contains(">Hi &amp; bye</text>"), "{svg}");
        assert!(!svg.contains("text-anchor"), "{svg}");
        assert!(!svg.contains("fill-opacity"), "{svg}");

        let tree = usvg::Tree::from_str(&svg, &usvg::Options::default()).unwrap();
        assert_eq!(tree.size().width(), 320.0);
    }

    #[test]
    fn end_aligned_translucent_run_sets_anchor_and_opacity() {
        let text = TextRasterizer::new(false, "sans-serif");
        let mut run = TextRun::new("mark", 24, Point::new(305.0, 165.0), Rgb8::new(255, 255, 255));
        run.align = TextAlign::End;
        run.alpha = 200;
        let svg = text.svg_document(canvas(), &run);
        assert!(svg.contains(r#"text-anchor="end""#), "{svg}");
        assert!(svg.contains(r#"fill-opacity="0.7843""#), "{svg}");
        assert!(usvg::Tree::from_str(&svg, &usvg::Options::default()).is_ok());
    }

    #[test]
    fn control_characters_never_break_layout() {
        let text = TextRasterizer::new(false, "sans-serif");
        let run = TextRun::new("a\u{1}b\u{FFFE}", 20, Point::new(10.0, 50.0), Rgb8::new(0, 0, 0));
        assert!(text.layout(canvas(), &run).is_ok());
    }

    #[test]
    fn system_fonts_lay_text_out_right_of_anchor() {
        let text = TextRasterizer::new(true, "sans-serif");
        if text.face_count() == 0 {
            return;
        }
        let run = TextRun::new("Hello", 24, Point::new(40.0, 100.0), Rgb8::new(255, 255, 255));
        let tree = text.layout(canvas(), &run).unwrap();
        assert_eq!(count_text_nodes(tree.root()), 1);

        let bbox = first_text(tree.root()).unwrap().bounding_box();
        assert!(bbox.left() >= 38.0 && bbox.left() < 40.0 + 24.0, "{bbox:?}");
        assert!(bbox.top() < 100.0 && bbox.top() > 100.0 - 48.0, "{bbox:?}");
        assert!(bbox.bottom() > 100.0 - 12.0, "{bbox:?}");
    }

    #[test]
    fn draw_without_fonts_leaves_pixels_untouched() {
        let text = TextRasterizer::new(false, "sans-serif");
        assert_eq!(text.face_count(), 0);

        let mut pixmap = tiny_skia::Pixmap::new(320, 180).unwrap();
        pixmap.fill(tiny_skia::Color::from_rgba8(10, 20, 30, 255));
        let before = pixmap.data().to_vec();

        let run = TextRun::new("a < b & c", 16, Point::new(2.0, 20.0), Rgb8::new(255, 255, 255));
        text.draw(&mut pixmap, canvas(), &run).unwrap();
        assert_eq!(pixmap.data(), &before[..]);
    }
}
