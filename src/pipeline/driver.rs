use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::dsl::parser::parse_scene;
use crate::eval::timeline::states_at_frame;
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{PipelineError, ReelResult};
use crate::pipeline::fingerprint::{FrameFingerprint, fingerprint_states};
use crate::render::cpu::{CpuRasterizer, RasterOpts};
use crate::render::frame::FrameRGBA;
use crate::schema::validate::{ValidScene, validate};

/// Default wall-clock budget for one run.
pub const DEFAULT_TIME_BUDGET_MS: u64 = 30_000;

/// Options for [`run_with_opts`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineOpts {
    /// Wall-clock budget for the whole run, front end included.
    pub time_budget_ms: u64,
    /// Frame scheduling.
    pub threading: RenderThreading,
    /// Rasterizer settings.
    pub raster: RasterOpts,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            time_budget_ms: DEFAULT_TIME_BUDGET_MS,
            threading: RenderThreading::default(),
            raster: RasterOpts::default(),
        }
    }
}

impl PipelineOpts {
    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_threading(mut self, threading: RenderThreading) -> Self {
        self.threading = threading;
        self
    }

    pub fn with_raster(mut self, raster: RasterOpts) -> Self {
        self.raster = raster;
        self
    }
}

/// How frames are scheduled.
///
/// Sequential and parallel runs produce byte-identical frames.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderThreading {
    /// Rasterize frames on a rayon pool.
    pub parallel: bool,
    /// Frames per parallel batch. `0` is treated as `1`.
    pub chunk_size: usize,
    /// Worker count. `None` uses rayon's default.
    pub threads: Option<usize>,
    /// Copy a frame whose objects did not move since the previous frame instead of redrawing it.
    pub static_frame_elision: bool,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
            static_frame_elision: true,
        }
    }
}

impl RenderThreading {
    pub fn with_parallel(mut self, on: bool) -> Self {
        self.parallel = on;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_static_frame_elision(mut self, on: bool) -> Self {
        self.static_frame_elision = on;
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RenderStats {
    pub frames_total: u64,
    pub frames_rendered: u64,
    pub frames_elided: u64,
}

/// Frames of one run, in ascending index order.
#[derive(Clone, Debug)]
pub struct RenderOutput {
    pub fps: u32,
    pub canvas: Canvas,
    pub frames: Vec<FrameRGBA>,
    pub stats: RenderStats,
}

/// Lex, parse and validate `src`.
pub fn compile(src: &str) -> ReelResult<ValidScene> {
    let scene = parse_scene(src)?;
    Ok(validate(&scene)?)
}

/// Compile `src` and render every frame under `budget`.
///
/// The run is all-or-nothing: on any error, timeout included, no frames are returned.
#[tracing::instrument(skip(src), fields(src_len = src.len()))]
pub fn run(src: &str, budget: Duration) -> ReelResult<Vec<FrameRGBA>> {
    let opts = PipelineOpts::default().with_time_budget(budget);
    run_with_opts(src, &opts).map(|out| out.frames)
}

/// [`run`] with explicit threading and raster options.
#[tracing::instrument(
    skip(src, opts),
    fields(src_len = src.len(), budget_ms = opts.time_budget_ms)
)]
pub fn run_with_opts(src: &str, opts: &PipelineOpts) -> ReelResult<RenderOutput> {
    let deadline = Deadline::start(opts.time_budget());
    let scene = compile(src)?;
    deadline.check(0)?;

    let rasterizer = CpuRasterizer::new(opts.raster.clone());
    let out = render_with_deadline(&scene, &rasterizer, &opts.threading, &deadline)?;
    tracing::info!(
        frames_total = out.stats.frames_total,
        frames_rendered = out.stats.frames_rendered,
        frames_elided = out.stats.frames_elided,
        elapsed_ms = deadline.elapsed().as_millis() as u64,
        "render complete"
    );
    Ok(out)
}

/// Render every frame of an already validated scene under `budget`.
pub fn render_scene(
    scene: &ValidScene,
    rasterizer: &CpuRasterizer,
    threading: &RenderThreading,
    budget: Duration,
) -> Result<RenderOutput, PipelineError> {
    render_with_deadline(scene, rasterizer, threading, &Deadline::start(budget))
}

/// Evaluate and rasterize a single frame.
pub fn render_frame(
    scene: &ValidScene,
    index: FrameIndex,
    rasterizer: &CpuRasterizer,
) -> Result<FrameRGBA, PipelineError> {
    let states = states_at_frame(scene, index);
    rasterizer.render(index, scene.canvas(), scene.background(), &states)
}

#[derive(Clone, Copy, Debug)]
struct Deadline {
    started: Instant,
    budget: Duration,
}

impl Deadline {
    fn start(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn check(&self, frames_done: u64) -> Result<(), PipelineError> {
        let elapsed = self.elapsed();
        if elapsed > self.budget {
            tracing::warn!(?elapsed, budget = ?self.budget, frames_done, "time budget exceeded");
            return Err(PipelineError::Timeout {
                budget: self.budget,
                elapsed,
                frames_done,
            });
        }
        Ok(())
    }
}

/// What to do for one frame index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Render,
    Repeat,
}

fn render_with_deadline(
    scene: &ValidScene,
    rasterizer: &CpuRasterizer,
    threading: &RenderThreading,
    deadline: &Deadline,
) -> Result<RenderOutput, PipelineError> {
    let total = scene.frame_count();
    tracing::debug!(
        frames = total,
        fps = scene.fps(),
        objects = scene.objects().len(),
        "rendering scene"
    );

    let slots = plan_slots(scene, total, threading.static_frame_elision);
    let frames = if threading.parallel {
        render_parallel(scene, rasterizer, threading, deadline, &slots)?
    } else {
        render_sequential(scene, rasterizer, deadline, &slots)?
    };
    deadline.check(total)?;

    let rendered = slots.iter().filter(|s| **s == Slot::Render).count() as u64;
    Ok(RenderOutput {
        fps: scene.fps(),
        canvas: scene.canvas(),
        frames,
        stats: RenderStats {
            frames_total: total,
            frames_rendered: rendered,
            frames_elided: total.saturating_sub(rendered),
        },
    })
}

fn plan_slots(scene: &ValidScene, total: u64, elide: bool) -> Vec<Slot> {
    let mut slots = Vec::with_capacity(total as usize);
    let mut prev: Option<FrameFingerprint> = None;
    for i in 0..total {
        if !elide {
            slots.push(Slot::Render);
            continue;
        }
        let fp = fingerprint_states(&states_at_frame(scene, FrameIndex(i)));
        slots.push(if prev == Some(fp) {
            Slot::Repeat
        } else {
            Slot::Render
        });
        prev = Some(fp);
    }
    slots
}

fn render_sequential(
    scene: &ValidScene,
    rasterizer: &CpuRasterizer,
    deadline: &Deadline,
    slots: &[Slot],
) -> Result<Vec<FrameRGBA>, PipelineError> {
    let mut out = Vec::<FrameRGBA>::with_capacity(slots.len());
    for (i, slot) in slots.iter().enumerate() {
        let index = FrameIndex(i as u64);
        deadline.check(index.0)?;
        let frame = match slot {
            Slot::Render => render_frame(scene, index, rasterizer)?,
            Slot::Repeat => repeat_last(&out, index)?,
        };
        out.push(frame);
    }
    Ok(out)
}

fn render_parallel(
    scene: &ValidScene,
    rasterizer: &CpuRasterizer,
    threading: &RenderThreading,
    deadline: &Deadline,
    slots: &[Slot],
) -> Result<Vec<FrameRGBA>, PipelineError> {
    let pool = build_thread_pool(threading.threads)?;
    let chunk_size = normalized_chunk_size(threading.chunk_size);
    let mut out = Vec::<FrameRGBA>::with_capacity(slots.len());

    let mut chunk_start = 0usize;
    while chunk_start < slots.len() {
        let chunk_end = (chunk_start + chunk_size).min(slots.len());
        let leaders: Vec<u64> = (chunk_start..chunk_end)
            .filter(|&i| slots[i] == Slot::Render)
            .map(|i| i as u64)
            .collect();

        let rendered = pool.install(|| {
            leaders
                .par_iter()
                .map(|&i| {
                    deadline.check(chunk_start as u64)?;
                    render_frame(scene, FrameIndex(i), rasterizer)
                })
                .collect::<Result<Vec<_>, PipelineError>>()
        })?;

        let mut rendered = rendered.into_iter();
        for (i, slot) in slots.iter().enumerate().take(chunk_end).skip(chunk_start) {
            let index = FrameIndex(i as u64);
            let frame = match slot {
                Slot::Render => rendered.next().ok_or_else(|| {
                    PipelineError::internal(format!("rendered frame {i} missing from batch"))
                })?,
                Slot::Repeat => repeat_last(&out, index)?,
            };
            out.push(frame);
        }

        deadline.check(chunk_end as u64)?;
        chunk_start = chunk_end;
    }
    Ok(out)
}

fn repeat_last(out: &[FrameRGBA], index: FrameIndex) -> Result<FrameRGBA, PipelineError> {
    out.last()
        .map(|prev| prev.with_index(index))
        .ok_or_else(|| PipelineError::internal(format!("frame {} has no predecessor", index.0)))
}

fn build_thread_pool(threads: Option<usize>) -> Result<rayon::ThreadPool, PipelineError> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(PipelineError::config(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| PipelineError::internal(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> usize {
    chunk_size.max(1)
}
