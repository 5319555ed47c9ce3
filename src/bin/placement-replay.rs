use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use placement_replay::{
    DEFAULT_GIF_FPS, FfmpegSink, FfmpegSinkOpts, Fps, FrameSink, GifSink, GifSinkOpts,
    InitialLayout, RasterOpts, ReplayMode, ReplaySession, ReplaySessionOpts, StepDeck,
};

#[derive(Parser, Debug)]
#[command(name = "placement-replay", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the replay as a video (requires `ffmpeg` on PATH) or, for a `.gif` output, as an
    /// animated GIF.
    Render(RenderArgs),
    /// Render a single replay frame as a PNG.
    Frame(FrameArgs),
    /// Build the step deck and dump it as JSON.
    Deck(DeckArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Initial layout (`.lg`).
    #[arg(long)]
    lg: PathBuf,

    /// Banking log (`.opt`).
    #[arg(long)]
    opt: PathBuf,

    /// Legalization log (`.postlg`).
    #[arg(long)]
    postlg: PathBuf,
}

#[derive(Args, Debug)]
struct ViewArgs {
    /// Animate every legalization phase instead of one frame per step.
    #[arg(long, default_value_t = false)]
    detail: bool,

    /// Output height in pixels; the width follows the die aspect ratio.
    #[arg(long, default_value_t = placement_replay::DEFAULT_HEIGHT)]
    height: u32,

    /// Draw placement rows behind the cells.
    #[arg(long, default_value_t = false)]
    rows: bool,

    /// Outline thickness in pixels.
    #[arg(long, default_value_t = 1.0)]
    line_width: f64,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    view: ViewArgs,

    /// Output path; a `.gif` extension selects GIF output.
    #[arg(long)]
    out: PathBuf,

    /// Frames per second [default: 60, or 5 for GIF].
    #[arg(long)]
    fps: Option<u32>,

    /// Video codec (ignored for GIF).
    #[arg(long, default_value = "libx264")]
    vcodec: String,

    /// Output pixel format.
    #[arg(long, default_value = "yuv444p")]
    pix_fmt: String,

    /// Constant rate factor.
    #[arg(long, default_value_t = 18)]
    crf: u8,

    /// Encoder preset.
    #[arg(long, default_value = "veryfast")]
    preset: String,

    /// Fail instead of replacing an existing output file.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    view: ViewArgs,

    /// Frame index (0 is the initial layout).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct DeckArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output JSON path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Deck(args) => cmd_deck(args),
    }
}

fn load(input: &InputArgs) -> anyhow::Result<(InitialLayout, StepDeck)> {
    let layout = placement_replay::read_lg(&input.lg)?;
    let merges = placement_replay::read_opt(&input.opt)?;
    let post = placement_replay::read_postlg(&input.postlg)?;
    let deck = placement_replay::build_deck(&layout, &merges, &post)?;
    Ok((layout, deck))
}

fn session_opts(view: &ViewArgs) -> ReplaySessionOpts {
    let mode = if view.detail {
        ReplayMode::Detail
    } else {
        ReplayMode::Coarse
    };
    ReplaySessionOpts {
        height: view.height,
        raster: RasterOpts {
            rows: view.rows,
            line_width: view.line_width,
            ..RasterOpts::default()
        },
        ..ReplaySessionOpts::new(mode)
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (layout, deck) = load(&args.input)?;
    let gif = is_gif(&args.out);
    let fps = args.fps.unwrap_or(if gif { DEFAULT_GIF_FPS } else { 60 });
    let opts = ReplaySessionOpts {
        fps: Fps::new(fps, 1)?,
        ..session_opts(&args.view)
    };
    let mut sess = ReplaySession::new(&layout, deck, opts)?;

    let mut sink: Box<dyn FrameSink> = if gif {
        Box::new(GifSink::new(
            GifSinkOpts::new(&args.out).with_overwrite(!args.no_overwrite),
        ))
    } else {
        let sink_opts = FfmpegSinkOpts::new(&args.out)
            .with_overwrite(!args.no_overwrite)
            .with_vcodec(args.vcodec)
            .with_pix_fmt(args.pix_fmt)
            .with_crf(Some(args.crf))
            .with_preset(Some(args.preset));
        Box::new(FfmpegSink::new(sink_opts))
    };

    let stats = sess.run(sink.as_mut())?;
    eprintln!(
        "wrote {} ({} frames, {} steps, {:.1}s)",
        args.out.display(),
        stats.frames,
        stats.steps,
        stats.duration_secs
    );
    Ok(())
}

fn is_gif(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gif"))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (layout, deck) = load(&args.input)?;
    let mut sess = ReplaySession::new(&layout, deck, session_opts(&args.view))?;
    let frame = sess.frame_at(args.frame)?;

    create_parent(&args.out)?;
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

fn cmd_deck(args: DeckArgs) -> anyhow::Result<()> {
    let (_, deck) = load(&args.input)?;
    let json = deck.to_json_pretty()?;
    match args.out {
        Some(out) => {
            create_parent(&out)?;
            std::fs::write(&out, json).with_context(|| format!("write '{}'", out.display()))?;
            eprintln!(
                "wrote {} ({} steps, {} displacements)",
                out.display(),
                deck.len(),
                deck.total_displacements()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn create_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
