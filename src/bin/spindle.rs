use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use spindle::{FrameScheduler as _, FrameSink as _};

#[derive(Parser, Debug)]
#[command(name = "spindle", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render full cycles as an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render full cycles as a PNG sequence.
    Frames(FramesArgs),
    /// Run the effect in real time and write each rendered frame as a PNG.
    Live(LiveArgs),
}

#[derive(Args, Debug)]
struct SceneArgs {
    /// Scene config JSON. Asset paths resolve relative to its directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override canvas width.
    #[arg(long)]
    width: Option<u32>,

    /// Override canvas height.
    #[arg(long)]
    height: Option<u32>,

    /// Override frame rate (frames per second).
    #[arg(long)]
    fps: Option<u32>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Milliseconds since the animation origin.
    #[arg(long, default_value_t = 0.0)]
    at_ms: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Fail instead of replacing an existing output file.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,

    /// Number of full forward-and-back cycles.
    #[arg(long, default_value_t = 1)]
    cycles: u64,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Render chunk size (parallel mode only).
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Output directory for `frame_NNNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Number of full forward-and-back cycles.
    #[arg(long, default_value_t = 1)]
    cycles: u64,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

#[derive(Parser, Debug)]
struct LiveArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// How long to run, in seconds.
    #[arg(long, default_value_t = 2.0)]
    seconds: f64,

    /// Output directory for `frame_NNNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Frames(args) => cmd_frames(args),
        Command::Live(args) => cmd_live(args),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("SPINDLE_LOG")
        .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load the scene, apply CLI overrides and validate. Returns the config and its assets root.
fn load_scene(args: &SceneArgs) -> anyhow::Result<(spindle::SceneConfig, PathBuf)> {
    let (mut config, root) = match &args.config {
        Some(path) => {
            let config = spindle::SceneConfig::from_path(path)
                .with_context(|| format!("load scene '{}'", path.display()))?;
            let root = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            (config, root)
        }
        None => (spindle::SceneConfig::default(), PathBuf::from(".")),
    };
    if let Some(w) = args.width {
        config.canvas.width = w;
    }
    if let Some(h) = args.height {
        config.canvas.height = h;
    }
    if let Some(fps) = args.fps {
        config.fps = spindle::Fps::new(fps, 1)?;
    }
    config.validate().context("invalid scene")?;
    Ok((config, root))
}

fn cycles_range(sess: &spindle::RenderSession, cycles: u64) -> anyhow::Result<spindle::FrameRange> {
    anyhow::ensure!(cycles >= 1, "--cycles must be >= 1");
    let one = sess.cycle_range();
    let end = one
        .len_frames()
        .checked_mul(cycles)
        .context("--cycles is too large")?;
    Ok(spindle::FrameRange::new(
        spindle::FrameIndex(0),
        spindle::FrameIndex(end),
    )?)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (config, root) = load_scene(&args.scene)?;
    let mut sess =
        spindle::RenderSession::new(config, &root, spindle::RenderSessionOpts::default())?;
    let frame = sess.render_at(args.at_ms)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    spindle::encode::png::write_png(&args.out, &frame)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (config, root) = load_scene(&args.scene)?;
    let opts = spindle::RenderSessionOpts {
        parallel: args.parallel,
        chunk_size: args.chunk_size,
        threads: args.threads,
        channel_capacity: 4,
    };
    let mut sess = spindle::RenderSession::new(config, &root, opts)?;

    let sink_opts = spindle::FfmpegSinkOpts {
        out_path: args.out.clone(),
        overwrite: !args.no_overwrite,
        bg_rgba: [0, 0, 0, 255],
    };
    let mut sink = spindle::FfmpegSink::new(sink_opts);

    let range = cycles_range(&sess, args.cycles)?;
    let stats = sess.render_range(range, &mut sink)?;

    tracing::info!(frames = stats.frames_rendered, "render finished");
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let (config, root) = load_scene(&args.scene)?;
    let opts = spindle::RenderSessionOpts {
        parallel: args.parallel,
        ..spindle::RenderSessionOpts::default()
    };
    let mut sess = spindle::RenderSession::new(config, &root, opts)?;
    let mut sink = spindle::PngSequenceSink::new(&args.out_dir);

    let range = cycles_range(&sess, args.cycles)?;
    let stats = sess.render_range(range, &mut sink)?;

    eprintln!(
        "wrote {} frames to {}",
        stats.frames_rendered,
        args.out_dir.display()
    );
    Ok(())
}

fn cmd_live(args: LiveArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.seconds.is_finite() && args.seconds > 0.0,
        "--seconds must be > 0"
    );
    let (config, root) = load_scene(&args.scene)?;
    let fps = config.fps;
    let mut sink = spindle::PngSequenceSink::new(&args.out_dir);
    sink.begin(spindle::SinkConfig {
        width: config.canvas.width,
        height: config.canvas.height,
        fps,
    })?;
    let mut player = spindle::Player::new(config, &root)?;

    let limit_ms = args.seconds * 1000.0;
    let failure = Arc::new(Mutex::new(None::<spindle::SpindleError>));
    let failure_slot = failure.clone();
    let sink = Arc::new(Mutex::new(sink));
    let sink_cb = sink.clone();
    let mut next = 0u64;

    let mut scheduler = spindle::IntervalScheduler::new(fps)?;
    scheduler.start(Box::new(move |now_ms| {
        if now_ms >= limit_ms {
            return ControlFlow::Break(());
        }
        let pushed = player.tick(now_ms).and_then(|frame| match frame {
            Some(frame) => {
                let mut sink = sink_cb
                    .lock()
                    .map_err(|_| spindle::SpindleError::encode("png sink lock poisoned"))?;
                sink.push_frame(spindle::FrameIndex(next), &frame)?;
                next += 1;
                Ok(())
            }
            None => Ok(()),
        });
        match pushed {
            Ok(()) => ControlFlow::Continue(()),
            Err(e) => {
                if let Ok(mut slot) = failure_slot.lock() {
                    *slot = Some(e);
                }
                ControlFlow::Break(())
            }
        }
    }))?;
    let skipped = scheduler.join()?;

    if let Some(e) = failure
        .lock()
        .map_err(|_| anyhow::anyhow!("failure slot lock poisoned"))?
        .take()
    {
        return Err(e).context("live run failed");
    }

    let mut sink = sink
        .lock()
        .map_err(|_| anyhow::anyhow!("png sink lock poisoned"))?;
    sink.end()?;
    eprintln!(
        "wrote {} frames to {} ({} ticks skipped)",
        sink.written(),
        args.out_dir.display(),
        skipped
    );
    Ok(())
}
