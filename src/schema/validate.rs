use std::collections::HashMap;

use crate::animation::ease::Ease;
use crate::dsl::lexer::Span;
use crate::foundation::core::{
    Canvas, MAX_CANVAS, MAX_DURATION_SECS, MAX_FPS, MAX_OBJECTS, MIN_CANVAS, MIN_DURATION_SECS,
    Point, Rgb8, is_drawable_char,
};
use crate::scene::model::{Movement, ObjectKind, Scene, SceneObject};

/// Bounds on per-object geometry.
pub const RADIUS_RANGE: (f64, f64) = (1.0, 500.0);
/// Bounds on rectangle width.
pub const WIDTH_RANGE: (f64, f64) = (1.0, MAX_CANVAS.width as f64);
/// Bounds on rectangle height.
pub const HEIGHT_RANGE: (f64, f64) = (1.0, MAX_CANVAS.height as f64);
/// Bounds on text size in pixels.
pub const TEXT_SIZE_RANGE: (u32, u32) = (8, 200);
/// Longest text content, in characters.
pub const MAX_TEXT_CHARS: usize = 200;

const CLAMP_EPSILON_SECS: f64 = 1e-9;

/// The first invariant a scene violates.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("validation error: fps {fps} is outside 1..={max}", max = MAX_FPS)]
    FpsOutOfRange { fps: u32 },

    #[error(
        "validation error: duration {secs}s is outside {min}..={max} seconds",
        min = MIN_DURATION_SECS,
        max = MAX_DURATION_SECS
    )]
    DurationOutOfRange { secs: f64 },

    #[error(
        "validation error: canvas {width}x{height} is outside {min_w}x{min_h}..={max_w}x{max_h}",
        min_w = MIN_CANVAS.width,
        min_h = MIN_CANVAS.height,
        max_w = MAX_CANVAS.width,
        max_h = MAX_CANVAS.height
    )]
    CanvasOutOfRange { width: u32, height: u32 },

    #[error(
        "validation error: {count} objects exceed the object-count bound of {max}",
        max = MAX_OBJECTS
    )]
    TooManyObjects { count: usize },

    #[error("validation error: invalid color '{value}' for {context} (expected #RRGGBB)")]
    InvalidColor {
        context: String,
        value: String,
        span: Option<Span>,
    },

    #[error("validation error: {kind} '{id}' {what} {value} is outside {min}..={max}")]
    GeometryOutOfRange {
        id: String,
        kind: &'static str,
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
        span: Span,
    },

    #[error(
        "validation error: '{id}' text must be 1..={max} characters, got {len}",
        max = MAX_TEXT_CHARS
    )]
    TextLength { id: String, len: usize, span: Span },

    #[error("validation error: '{id}' text contains unsupported character U+{code:04X}")]
    InvalidTextCharacter { id: String, code: u32, span: Span },

    #[error("validation error: '{id}' anchor ({x}, {y}) lies outside the canvas margin")]
    AnchorOutOfBounds {
        id: String,
        x: f64,
        y: f64,
        span: Span,
    },

    #[error("validation error: duplicate object id '{id}'")]
    DuplicateId { id: String, span: Span },

    #[error("validation error: MOVE references undeclared id '{id}'")]
    UndeclaredId { id: String, span: Span },

    #[error("validation error: MOVE references '{id}' before its declaration")]
    ForwardReference { id: String, span: Span },

    #[error("validation error: '{id}' movement duration {secs}s must be greater than 0")]
    NonPositiveMoveDuration { id: String, secs: f64, span: Span },
}

impl ValidationError {
    /// Source position when the violation belongs to a directive.
    pub fn position(&self) -> Option<(u32, u32)> {
        let span = match self {
            Self::FpsOutOfRange { .. }
            | Self::DurationOutOfRange { .. }
            | Self::CanvasOutOfRange { .. }
            | Self::TooManyObjects { .. } => None,
            Self::InvalidColor { span, .. } => *span,
            Self::GeometryOutOfRange { span, .. }
            | Self::TextLength { span, .. }
            | Self::InvalidTextCharacter { span, .. }
            | Self::AnchorOutOfBounds { span, .. }
            | Self::DuplicateId { span, .. }
            | Self::UndeclaredId { span, .. }
            | Self::ForwardReference { span, .. }
            | Self::NonPositiveMoveDuration { span, .. } => Some(*span),
        };
        span.map(|s| (s.line, s.column))
    }
}

/// A scene that passed every check. Immutable; only readable through accessors.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ValidScene {
    background: Rgb8,
    fps: u32,
    duration_secs: f64,
    canvas: Canvas,
    objects: Vec<ResolvedObject>,
}

impl ValidScene {
    pub fn background(&self) -> Rgb8 {
        self.background
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Objects in paint order.
    pub fn objects(&self) -> &[ResolvedObject] {
        &self.objects
    }

    /// Look up an object by id.
    pub fn object(&self, id: &str) -> Option<&ResolvedObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// `ceil(fps * duration)`.
    pub fn frame_count(&self) -> u64 {
        // Tolerate float noise such as 10 * 1.1 = 11.000000000000002.
        (f64::from(self.fps) * self.duration_secs - 1e-9).ceil().max(0.0) as u64
    }
}

/// An object with its color parsed and all of its movements resolved into timed segments.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ResolvedObject {
    pub id: String,
    pub kind: ObjectKind,
    pub position: Point,
    pub color: Rgb8,
    /// Non-overlapping, back-to-back segments in start order.
    pub motion: Vec<MotionSegment>,
}

/// One movement placed on the timeline.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct MotionSegment {
    pub start_secs: f64,
    /// Effective duration, after clamping to the remaining scene time.
    pub duration_secs: f64,
    /// Duration as written in the source.
    pub requested_secs: f64,
    pub from: Point,
    pub to: Point,
    pub ease: Ease,
}

impl MotionSegment {
    pub fn end_secs(&self) -> f64 {
        self.start_secs + self.duration_secs
    }

    /// `true` when the written duration ran past the scene end and was shortened.
    pub fn is_clamped(&self) -> bool {
        self.duration_secs < self.requested_secs
    }
}

/// Check every resource and format bound and resolve the scene for rendering.
///
/// Checks run in a fixed order and the first violation wins:
/// globals, object count, per-object color/geometry/anchor, id uniqueness, movements.
///
/// A movement whose duration runs past the scene end is clamped to the remaining time
/// instead of being rejected. This is the only input that gets corrected rather than refused.
#[tracing::instrument(
    skip(scene),
    fields(objects = scene.objects.len(), moves = scene.moves.len())
)]
pub fn validate(scene: &Scene) -> Result<ValidScene, ValidationError> {
    validate_globals(scene)?;
    let background = parse_color(&scene.background, "BACKGROUND", None)?;

    if scene.objects.len() > MAX_OBJECTS {
        return Err(ValidationError::TooManyObjects {
            count: scene.objects.len(),
        });
    }

    let mut objects = Vec::with_capacity(scene.objects.len());
    for obj in &scene.objects {
        objects.push(validate_object(obj, scene.canvas)?);
    }

    let index_by_id = index_ids(scene)?;
    resolve_motion(scene, &index_by_id, &mut objects)?;

    tracing::debug!(objects = objects.len(), "scene validated");
    Ok(ValidScene {
        background,
        fps: scene.fps,
        duration_secs: scene.duration_secs,
        canvas: scene.canvas,
        objects,
    })
}

fn validate_globals(scene: &Scene) -> Result<(), ValidationError> {
    if !(1..=MAX_FPS).contains(&scene.fps) {
        return Err(ValidationError::FpsOutOfRange { fps: scene.fps });
    }
    if !(MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&scene.duration_secs) {
        return Err(ValidationError::DurationOutOfRange {
            secs: scene.duration_secs,
        });
    }
    let Canvas { width, height } = scene.canvas;
    if !(MIN_CANVAS.width..=MAX_CANVAS.width).contains(&width)
        || !(MIN_CANVAS.height..=MAX_CANVAS.height).contains(&height)
    {
        return Err(ValidationError::CanvasOutOfRange { width, height });
    }
    Ok(())
}

fn parse_color(value: &str, context: &str, span: Option<Span>) -> Result<Rgb8, ValidationError> {
    Rgb8::parse_hex(value).ok_or_else(|| ValidationError::InvalidColor {
        context: context.to_owned(),
        value: value.to_owned(),
        span,
    })
}

fn check_range(
    obj: &SceneObject,
    what: &'static str,
    value: f64,
    (min, max): (f64, f64),
) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        return Ok(());
    }
    Err(ValidationError::GeometryOutOfRange {
        id: obj.id.clone(),
        kind: obj.kind.name(),
        what,
        value,
        min,
        max,
        span: obj.span,
    })
}

fn check_anchor(id: &str, p: Point, canvas: Canvas, span: Span) -> Result<(), ValidationError> {
    if canvas.contains_anchor(p) {
        return Ok(());
    }
    Err(ValidationError::AnchorOutOfBounds {
        id: id.to_owned(),
        x: p.x,
        y: p.y,
        span,
    })
}

fn validate_object(
    obj: &SceneObject,
    canvas: Canvas,
) -> Result<ResolvedObject, ValidationError> {
    let color = parse_color(&obj.color, &format!("'{}'", obj.id), Some(obj.span))?;

    match &obj.kind {
        ObjectKind::Circle { radius } => check_range(obj, "radius", *radius, RADIUS_RANGE)?,
        ObjectKind::Rect { width, height } => {
            check_range(obj, "width", *width, WIDTH_RANGE)?;
            check_range(obj, "height", *height, HEIGHT_RANGE)?;
        }
        ObjectKind::Text { content, size } => {
            let (min, max) = TEXT_SIZE_RANGE;
            check_range(
                obj,
                "size",
                f64::from(*size),
                (f64::from(min), f64::from(max)),
            )?;
            let len = content.chars().count();
            if len == 0 || len > MAX_TEXT_CHARS {
                return Err(ValidationError::TextLength {
                    id: obj.id.clone(),
                    len,
                    span: obj.span,
                });
            }
            if let Some(c) = content.chars().find(|&c| !is_drawable_char(c)) {
                return Err(ValidationError::InvalidTextCharacter {
                    id: obj.id.clone(),
                    code: u32::from(c),
                    span: obj.span,
                });
            }
        }
    }

    check_anchor(&obj.id, obj.position, canvas, obj.span)?;

    Ok(ResolvedObject {
        id: obj.id.clone(),
        kind: obj.kind.clone(),
        position: obj.position,
        color,
        motion: Vec::new(),
    })
}

/// Map each id to its declaration index, rejecting the second declaration of any id.
fn index_ids(scene: &Scene) -> Result<HashMap<&str, usize>, ValidationError> {
    let mut index_by_id = HashMap::with_capacity(scene.objects.len());
    for (i, obj) in scene.objects.iter().enumerate() {
        if index_by_id.insert(obj.id.as_str(), i).is_some() {
            return Err(ValidationError::DuplicateId {
                id: obj.id.clone(),
                span: obj.span,
            });
        }
    }
    Ok(index_by_id)
}

/// Chain every object's movements into segments: the inline `MOVE TO` first, then each
/// standalone `MOVE <id>` in program order, each starting where the previous one ended.
fn resolve_motion(
    scene: &Scene,
    index_by_id: &HashMap<&str, usize>,
    objects: &mut [ResolvedObject],
) -> Result<(), ValidationError> {
    for (i, obj) in scene.objects.iter().enumerate() {
        if let Some(m) = obj.movement {
            push_segment(&mut objects[i], m, scene, obj.span)?;
        }
    }

    for mv in &scene.moves {
        let Some(&idx) = index_by_id.get(mv.target_id.as_str()) else {
            return Err(ValidationError::UndeclaredId {
                id: mv.target_id.clone(),
                span: mv.span,
            });
        };
        if idx >= mv.declared_before {
            return Err(ValidationError::ForwardReference {
                id: mv.target_id.clone(),
                span: mv.span,
            });
        }
        push_segment(&mut objects[idx], mv.movement, scene, mv.span)?;
    }
    Ok(())
}

fn push_segment(
    obj: &mut ResolvedObject,
    m: Movement,
    scene: &Scene,
    span: Span,
) -> Result<(), ValidationError> {
    // `!(x > 0)` also rejects NaN.
    if !(m.duration_secs > 0.0) {
        return Err(ValidationError::NonPositiveMoveDuration {
            id: obj.id.clone(),
            secs: m.duration_secs,
            span,
        });
    }
    check_anchor(&obj.id, m.target, scene.canvas, span)?;

    let (start_secs, from) = match obj.motion.last() {
        Some(prev) => (prev.end_secs(), prev.to),
        None => (0.0, obj.position),
    };
    // Chained start times carry float noise; only a real overrun is clamped.
    let remaining = (scene.duration_secs - start_secs).max(0.0);
    let duration_secs = if m.duration_secs > remaining + CLAMP_EPSILON_SECS {
        remaining
    } else {
        m.duration_secs
    };
    if duration_secs < m.duration_secs {
        tracing::warn!(
            id = %obj.id,
            requested_secs = m.duration_secs,
            clamped_secs = duration_secs,
            start_secs,
            "movement runs past scene end; clamped to remaining time"
        );
    }

    obj.motion.push(MotionSegment {
        start_secs,
        duration_secs,
        requested_secs: m.duration_secs,
        from,
        to: m.target,
        ease: m.ease,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::parser::parse_scene;
    use crate::scene::model::MoveDirective;

    fn check(src: &str) -> Result<ValidScene, ValidationError> {
        validate(&parse_scene(src).unwrap())
    }

    fn circle(id: &str) -> SceneObject {
        SceneObject {
            id: id.to_owned(),
            position: Point::new(10.0, 10.0),
            color: "#ffffff".to_owned(),
            kind: ObjectKind::Circle { radius: 5.0 },
            movement: None,
            span: Span::new(1, 1),
        }
    }

    #[test]
    fn global_bounds() {
        assert!(matches!(
            check("FPS 25"),
            Err(ValidationError::FpsOutOfRange { fps: 25 })
        ));
        assert!(matches!(
            check("FPS 0"),
            Err(ValidationError::FpsOutOfRange { fps: 0 })
        ));
        assert!(matches!(
            check("DURATION 7"),
            Err(ValidationError::DurationOutOfRange { .. })
        ));
        assert!(matches!(
            check("DURATION 0.4"),
            Err(ValidationError::DurationOutOfRange { .. })
        ));
        assert!(matches!(
            check("CANVAS 1920,1080"),
            Err(ValidationError::CanvasOutOfRange {
                width: 1920,
                height: 1080
            })
        ));
        assert!(check("FPS 1\nDURATION 0.5\nCANVAS 1280,720").is_ok());
        assert!(check("FPS 24\nDURATION 6\nCANVAS 320,180").is_ok());
    }

    #[test]
    fn object_count_bound() {
        let mut scene = Scene::default();
        scene.objects = (0..50).map(|i| circle(&format!("c{i}"))).collect();
        assert!(validate(&scene).is_ok());

        scene.objects.push(circle("c50"));
        let err = validate(&scene).unwrap_err();
        assert_eq!(err, ValidationError::TooManyObjects { count: 51 });
        assert!(err.to_string().contains("object-count bound of 50"));
    }

    #[test]
    fn object_count_is_checked_before_per_object_errors() {
        let mut scene = Scene::default();
        scene.objects = (0..51).map(|i| circle(&format!("c{i}"))).collect();
        scene.objects[0].color = "red".to_owned();
        assert!(matches!(
            validate(&scene),
            Err(ValidationError::TooManyObjects { .. })
        ));
    }

    #[test]
    fn colors_must_be_six_hex_digits() {
        let mut scene = Scene::default();
        scene.objects.push(circle("a"));
        scene.objects[0].color = "#ZZZZZZ".to_owned();
        let err = validate(&scene).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidColor { .. }));
        assert!(err.to_string().contains("expected #RRGGBB"));

        scene.objects[0].color = "red".to_owned();
        assert!(matches!(
            validate(&scene),
            Err(ValidationError::InvalidColor { .. })
        ));

        let mut scene = Scene::default();
        scene.background = "#12345".to_owned();
        assert!(matches!(
            validate(&scene),
            Err(ValidationError::InvalidColor { span: None, .. })
        ));
    }

    #[test]
    fn geometry_bounds() {
        let err = check("SHAPE CIRCLE ID c AT 1,1 RADIUS 0 COLOR #000000").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::GeometryOutOfRange {
                what: "radius",
                ..
            }
        ));
        assert_eq!(err.position(), Some((1, 1)));

        assert!(matches!(
            check("SHAPE RECT ID r AT 1,1 WIDTH 10 HEIGHT 721 COLOR #000000"),
            Err(ValidationError::GeometryOutOfRange {
                what: "height",
                ..
            })
        ));
        assert!(matches!(
            check("TEXT \"hi\" AT 1,1 SIZE 7 COLOR #000000"),
            Err(ValidationError::GeometryOutOfRange {
                kind: "text",
                what: "size",
                ..
            })
        ));
        assert!(matches!(
            check("TEXT \"\" AT 1,1 SIZE 12 COLOR #000000"),
            Err(ValidationError::TextLength { len: 0, .. })
        ));
    }

    #[test]
    fn anchors_may_sit_in_the_margin_but_not_beyond() {
        assert!(check("SHAPE CIRCLE ID c AT -100,400 RADIUS 10 COLOR #000000").is_ok());
        assert!(matches!(
            check("SHAPE CIRCLE ID c AT 2000,10 RADIUS 10 COLOR #000000"),
            Err(ValidationError::AnchorOutOfBounds { .. })
        ));
        assert!(matches!(
            check("SHAPE CIRCLE ID c AT 1,1 RADIUS 10 COLOR #000000 MOVE TO 1,-900 DUR 1"),
            Err(ValidationError::AnchorOutOfBounds { .. })
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected_at_second_declaration() {
        let err = check(
            "SHAPE CIRCLE ID a AT 1,1 RADIUS 1 COLOR #000000\n\
             SHAPE RECT ID a AT 1,1 WIDTH 1 HEIGHT 1 COLOR #000000",
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicateId {
                id: "a".to_owned(),
                span: Span::new(2, 1)
            }
        );
    }

    #[test]
    fn undeclared_reference_is_rejected() {
        let err = check("MOVE ghost TO 0,0 DUR 1 EASE linear").unwrap_err();
        assert_eq!(
            err,
            ValidationError::UndeclaredId {
                id: "ghost".to_owned(),
                span: Span::new(1, 1)
            }
        );
        assert!(err.to_string().contains("undeclared id 'ghost'"));
    }

    #[test]
    fn forward_reference_is_rejected() {
        let err = check(
            "MOVE ball TO 10,10 DUR 1\n\
             SHAPE CIRCLE ID ball AT 1,1 RADIUS 1 COLOR #000000",
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::ForwardReference { .. }));
        assert_eq!(err.position(), Some((1, 1)));
    }

    #[test]
    fn movements_chain_back_to_back() {
        let scene = check(
            "DURATION 6\n\
             SHAPE CIRCLE ID a AT 0,0 RADIUS 1 COLOR #000000 MOVE TO 100,0 DUR 2 EASE ease-in\n\
             MOVE a TO 100,100 DUR 1.5",
        )
        .unwrap();
        let a = scene.object("a").unwrap();
        assert_eq!(a.motion.len(), 2);
        assert_eq!(a.motion[0].start_secs, 0.0);
        assert_eq!(a.motion[0].from, Point::new(0.0, 0.0));
        assert_eq!(a.motion[1].start_secs, 2.0);
        assert_eq!(a.motion[1].from, Point::new(100.0, 0.0));
        assert_eq!(a.motion[1].ease, Ease::Linear);
    }

    #[test]
    fn overlong_movement_is_clamped_to_remaining_time() {
        let scene = check(
            "DURATION 3\n\
             SHAPE CIRCLE ID a AT 0,0 RADIUS 1 COLOR #000000 MOVE TO 10,0 DUR 2\n\
             MOVE a TO 10,50 DUR 5",
        )
        .unwrap();
        let seg = scene.object("a").unwrap().motion[1];
        assert_eq!(seg.start_secs, 2.0);
        assert_eq!(seg.requested_secs, 5.0);
        assert_eq!(seg.duration_secs, 1.0);
        assert!(seg.is_clamped());
        assert!(!scene.object("a").unwrap().motion[0].is_clamped());
    }

    #[test]
    fn movement_starting_at_scene_end_is_clamped_to_zero_length() {
        let scene = check(
            "DURATION 3\n\
             SHAPE CIRCLE ID a AT 10,10 RADIUS 5 COLOR #ffffff MOVE TO 100,10 DUR 3\n\
             MOVE a TO 200,10 DUR 1",
        )
        .unwrap();
        let a = scene.object("a").unwrap();
        assert_eq!(a.motion.len(), 2);
        assert!(!a.motion[0].is_clamped());

        let seg = a.motion[1];
        assert_eq!(seg.start_secs, 3.0);
        assert_eq!(seg.duration_secs, 0.0);
        assert_eq!(seg.requested_secs, 1.0);
        assert_eq!(seg.from, Point::new(100.0, 10.0));
        assert!(seg.is_clamped());
    }

    #[test]
    fn chained_durations_that_fill_the_scene_are_not_clamped() {
        let scene = check(
            "DURATION 0.6\n\
             SHAPE CIRCLE ID a AT 0,0 RADIUS 1 COLOR #000000 MOVE TO 10,0 DUR 0.1\n\
             MOVE a TO 20,0 DUR 0.2\n\
             MOVE a TO 30,0 DUR 0.3",
        )
        .unwrap();
        let motion = &scene.object("a").unwrap().motion;
        assert_eq!(motion.len(), 3);
        for seg in motion {
            assert!(!seg.is_clamped(), "{seg:?}");
        }
        assert_eq!(motion[2].duration_secs, 0.3);
    }

    #[test]
    fn zero_length_movement_is_rejected() {
        let mut scene = Scene::default();
        scene.objects.push(circle("a"));
        scene.moves.push(MoveDirective {
            target_id: "a".to_owned(),
            movement: Movement {
                target: Point::new(0.0, 0.0),
                duration_secs: 0.0,
                ease: Ease::Linear,
            },
            declared_before: 1,
            span: Span::new(2, 1),
        });
        assert!(matches!(
            validate(&scene),
            Err(ValidationError::NonPositiveMoveDuration { .. })
        ));
    }

    #[test]
    fn control_characters_in_text_are_rejected() {
        let mut scene = Scene::default();
        scene.objects.push(SceneObject {
            id: "t".to_owned(),
            position: Point::new(10.0, 50.0),
            color: "#ffffff".to_owned(),
            kind: ObjectKind::Text {
                content: "a\u{1}b".to_owned(),
                size: 20,
            },
            movement: None,
            span: Span::new(1, 1),
        });
        let err = validate(&scene).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidTextCharacter {
                id: "t".to_owned(),
                code: 1,
                span: Span::new(1, 1),
            }
        );
        assert!(err.to_string().contains("U+0001"));
        assert_eq!(err.position(), Some((1, 1)));

        let err =
            check("FPS 12\nTEXT \"a\u{1}b\" ID t AT 10,50 SIZE 20 COLOR #ffffff").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidTextCharacter { code: 1, .. }
        ));
        assert_eq!(err.position(), Some((2, 1)));

        // Escaped newlines and quotes and raw tabs are drawable.
        assert!(check("TEXT \"one\\ntwo \\\"q\\\"\tend\" AT 1,1 SIZE 12 COLOR #000000").is_ok());
    }

    #[test]
    fn frame_count_rounds_up() {
        assert_eq!(check("FPS 24\nDURATION 3").unwrap().frame_count(), 72);
        assert_eq!(check("FPS 10\nDURATION 1.1").unwrap().frame_count(), 11);
        assert_eq!(check("FPS 24\nDURATION 0.55").unwrap().frame_count(), 14);
    }

    #[test]
    fn validation_is_deterministic() {
        let mut scene = Scene::default();
        scene.fps = 30;
        scene.objects.push(circle("a"));
        scene.objects[0].color = "nope".to_owned();
        let a = validate(&scene).unwrap_err();
        let b = validate(&scene).unwrap_err();
        assert_eq!(a, b);
        assert!(matches!(a, ValidationError::FpsOutOfRange { fps: 30 }));
    }
}
