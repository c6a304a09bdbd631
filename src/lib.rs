//! ReelScript compiles a small declarative animation language into deterministic raster frames.
//!
//! The pipeline runs in fixed stages:
//!
//! - [`lex`] and [`parse_scene`] turn source text into a [`Scene`]
//! - [`validate`] enforces every resource bound and resolves motion into a [`ValidScene`]
//! - [`state_at`] interpolates object positions at a point in time
//! - [`CpuRasterizer`] draws one [`FrameRGBA`] per frame index
//! - [`run`] / [`run_with_opts`] drive all of the above under a wall-clock budget
//!
//! Rendered frames can be handed to any [`FrameSink`] with [`stream_to_sink`].
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod dsl;
pub(crate) mod encode;
pub(crate) mod eval;
pub(crate) mod pipeline;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod schema;

pub use crate::foundation::core::{
    Canvas, FrameIndex, MAX_CANVAS, MAX_DURATION_SECS, MAX_FPS, MAX_OBJECTS, MIN_CANVAS,
    MIN_DURATION_SECS, Point, Rgb8, is_drawable_char,
};
pub use crate::foundation::error::{PipelineError, ReelError, ReelResult};

pub use crate::animation::ease::{Ease, UnknownEase};
pub use crate::dsl::error::{LexError, SyntaxError};
pub use crate::dsl::lexer::{Keyword, Span, Token, TokenKind, lex};
pub use crate::dsl::parser::{parse_scene, parse_tokens};
pub use crate::encode::png::PngSequenceSink;
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig, stream_to_sink};
pub use crate::eval::timeline::{RenderableState, state_at, states_at, states_at_frame};
pub use crate::pipeline::driver::{
    DEFAULT_TIME_BUDGET_MS, PipelineOpts, RenderOutput, RenderStats, RenderThreading, compile,
    render_frame, render_scene, run, run_with_opts,
};
pub use crate::render::cpu::{CpuRasterizer, RasterOpts};
pub use crate::render::frame::FrameRGBA;
pub use crate::scene::model::{
    DEFAULT_BACKGROUND, DEFAULT_DURATION_SECS, DEFAULT_FPS, MoveDirective, Movement, ObjectKind,
    Scene, SceneObject,
};
pub use crate::schema::validate::{
    HEIGHT_RANGE, MAX_TEXT_CHARS, MotionSegment, RADIUS_RANGE, ResolvedObject, TEXT_SIZE_RANGE,
    ValidScene, ValidationError, WIDTH_RANGE, validate,
};
