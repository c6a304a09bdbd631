use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "reelscript", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a scene and print it as JSON.
    Check(CheckArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render every frame as a numbered PNG sequence.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input scene source.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input scene source.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Pipeline options JSON.
    #[arg(long)]
    opts: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene source.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory receiving `frame_NNNNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Render frames on a worker pool.
    #[arg(long)]
    parallel: bool,

    /// Worker count for `--parallel`.
    #[arg(long)]
    threads: Option<usize>,

    /// Wall-clock budget in milliseconds.
    #[arg(long)]
    budget_ms: Option<u64>,

    /// Stamp this text in the bottom-right corner of every frame.
    #[arg(long)]
    watermark: Option<String>,

    /// Pipeline options JSON. Flags override values from the file.
    #[arg(long)]
    opts: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read scene '{}'", path.display()))
}

fn read_opts(path: Option<&Path>) -> anyhow::Result<reelscript::PipelineOpts> {
    let Some(path) = path else {
        return Ok(reelscript::PipelineOpts::default());
    };
    let f = File::open(path).with_context(|| format!("open options '{}'", path.display()))?;
    let opts = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse options JSON '{}'", path.display()))?;
    Ok(opts)
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let src = read_source(&args.in_path)?;
    let scene = reelscript::parse_scene(&src)?;
    let valid = reelscript::validate(&scene)?;

    println!("{}", serde_json::to_string_pretty(&valid)?);
    eprintln!(
        "ok: {} objects, {} frames at {} fps ({}x{})",
        valid.objects().len(),
        valid.frame_count(),
        valid.fps(),
        valid.canvas().width,
        valid.canvas().height
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let src = read_source(&args.in_path)?;
    let opts = read_opts(args.opts.as_deref())?;
    let scene = reelscript::compile(&src)?;

    let count = scene.frame_count();
    if args.frame >= count {
        anyhow::bail!("frame {} out of range (scene has {count} frames)", args.frame);
    }

    let rasterizer = reelscript::CpuRasterizer::new(opts.raster);
    let frame =
        reelscript::render_frame(&scene, reelscript::FrameIndex(args.frame), &rasterizer)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let src = read_source(&args.in_path)?;
    let mut opts = read_opts(args.opts.as_deref())?;
    if args.parallel {
        opts.threading.parallel = true;
    }
    if args.threads.is_some() {
        opts.threading.threads = args.threads;
    }
    if let Some(ms) = args.budget_ms {
        opts = opts.with_time_budget(Duration::from_millis(ms));
    }
    if let Some(mark) = args.watermark {
        opts.raster = opts.raster.with_watermark(mark);
    }

    let out = reelscript::run_with_opts(&src, &opts)?;
    let mut sink = reelscript::PngSequenceSink::new(&args.out_dir);
    reelscript::stream_to_sink(&out, &mut sink)?;

    eprintln!(
        "wrote {} frames to {} (rendered={}, elided={})",
        sink.written().len(),
        sink.dir().display(),
        out.stats.frames_rendered,
        out.stats.frames_elided
    );
    Ok(())
}
