use crate::animation::ease::Ease;
use crate::dsl::lexer::Span;
use crate::foundation::core::{Canvas, Point};

/// Background used when a program has no `BACKGROUND` directive.
pub const DEFAULT_BACKGROUND: &str = "#202020";
/// Frame rate used when a program has no `FPS` directive.
pub const DEFAULT_FPS: u32 = 24;
/// Duration used when a program has no `DURATION` directive.
pub const DEFAULT_DURATION_SECS: f64 = 3.0;

/// A parsed animation: global settings plus objects in paint order.
///
/// Colors are kept as written; [`crate::validate`] turns a `Scene` into a
/// [`crate::ValidScene`] with every color and reference resolved.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    /// Background color literal.
    pub background: String,
    /// Frames per second.
    pub fps: u32,
    /// Scene length in seconds.
    pub duration_secs: f64,
    /// Output size.
    pub canvas: Canvas,
    /// Objects in declaration order. Later objects paint over earlier ones.
    pub objects: Vec<SceneObject>,
    /// Standalone `MOVE <id>` directives in program order, unresolved.
    pub moves: Vec<MoveDirective>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND.to_owned(),
            fps: DEFAULT_FPS,
            duration_secs: DEFAULT_DURATION_SECS,
            canvas: Canvas::default(),
            objects: Vec::new(),
            moves: Vec::new(),
        }
    }
}

/// One drawable entity declared by `SHAPE` or `TEXT`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneObject {
    /// Unique id, used by standalone `MOVE` directives.
    pub id: String,
    /// Anchor: circle center, rectangle top-left, text left/baseline.
    pub position: Point,
    /// Fill color literal.
    pub color: String,
    /// Shape-specific geometry.
    pub kind: ObjectKind,
    /// Inline `MOVE TO ...` clause, if any.
    pub movement: Option<Movement>,
    /// Where the directive starts.
    pub span: Span,
}

/// Geometry per object variant.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectKind {
    Circle { radius: f64 },
    Rect { width: f64, height: f64 },
    Text { content: String, size: u32 },
}

impl ObjectKind {
    /// Lowercase name of the variant, for messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Circle { .. } => "circle",
            Self::Rect { .. } => "rect",
            Self::Text { .. } => "text",
        }
    }
}

/// Travel to `target` over `duration_secs`, shaped by `ease`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Movement {
    pub target: Point,
    pub duration_secs: f64,
    pub ease: Ease,
}

/// A standalone `MOVE <id> ...` directive.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MoveDirective {
    /// Referenced object id. Not checked by the parser.
    pub target_id: String,
    pub movement: Movement,
    /// Number of objects declared before this directive. Used to reject forward references.
    pub declared_before: usize,
    pub span: Span,
}
