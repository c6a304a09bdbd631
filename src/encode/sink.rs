use crate::foundation::core::FrameIndex;
use crate::foundation::error::{PipelineError, ReelResult};
use crate::pipeline::driver::RenderOutput;
use crate::render::frame::FrameRGBA;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: u32,
}

/// Sink contract for consuming rendered frames in timeline order.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()>;
    /// Push one frame in strictly increasing timeline order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> ReelResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Captured frames, in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Whether `end` was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        self.finished = true;
        Ok(())
    }
}

/// Hand every frame of `output` to `sink`, in ascending index order.
#[tracing::instrument(skip_all, fields(frames = output.frames.len()))]
pub fn stream_to_sink(output: &RenderOutput, sink: &mut dyn FrameSink) -> ReelResult<()> {
    sink.begin(SinkConfig {
        width: output.canvas.width,
        height: output.canvas.height,
        fps: output.fps,
    })?;

    let mut last: Option<FrameIndex> = None;
    for frame in &output.frames {
        if let Some(prev) = last
            && frame.index <= prev
        {
            return Err(PipelineError::internal(format!(
                "frame {} pushed after frame {}",
                frame.index.0, prev.0
            ))
            .into());
        }
        sink.push_frame(frame.index, frame)?;
        last = Some(frame.index);
    }

    sink.end()?;
    tracing::debug!(frames = output.frames.len(), "frames handed to sink");
    Ok(())
}
