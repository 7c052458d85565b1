use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};

use pianoreel::{
    AssetSource, CancelToken, FfmpegSink, FfmpegSinkOpts, KeyAssetSources, KeyAssets, LoadOpts,
    RenderConfig, RenderSession, Timeline, TimelineMode,
};

#[derive(Parser, Debug)]
#[command(name = "pianoreel", version, about = "Render MIDI scores as keyboard animation videos")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Print the note timeline as JSON.
    Timeline(TimelineArgs),
    /// Render a single tick as a PNG.
    Frame(FrameArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    OneShot,
    Sounding,
}

impl From<ModeChoice> for TimelineMode {
    fn from(m: ModeChoice) -> Self {
        match m {
            ModeChoice::OneShot => TimelineMode::OneShot,
            ModeChoice::Sounding => TimelineMode::Sounding,
        }
    }
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// Input Standard MIDI File.
    #[arg(long)]
    midi: PathBuf,

    /// JSON render configuration; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fixed tempo in beats per minute (tempo changes in the file are ignored).
    #[arg(long)]
    bpm: Option<f64>,

    #[arg(long, value_enum)]
    mode: Option<ModeChoice>,
}

#[derive(Args, Debug)]
struct SceneArgs {
    #[command(flatten)]
    score: ScoreArgs,

    /// Asset for white keys (image or clip).
    #[arg(long)]
    white: PathBuf,

    /// Asset for black keys (image or clip).
    #[arg(long)]
    black: PathBuf,

    /// Single-channel mask clip giving the white-key clip its alpha.
    #[arg(long)]
    white_mask: Option<PathBuf>,

    /// Single-channel mask clip giving the black-key clip its alpha.
    #[arg(long)]
    black_mask: Option<PathBuf>,

    /// Per-note asset override, e.g. `--key 60=middle_c.png`.
    #[arg(long = "key", value_parser = parse_key_override)]
    keys: Vec<(u8, PathBuf)>,

    #[arg(long)]
    fps: Option<u32>,

    /// Uniform asset scale factor.
    #[arg(long)]
    scale: Option<f64>,

    /// Seconds rendered after the last note.
    #[arg(long)]
    trailing: Option<f64>,

    /// Hide the time/tempo overlay.
    #[arg(long)]
    no_overlay: bool,

    /// Draw a plain keyboard under the animations.
    #[arg(long)]
    backdrop: bool,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Replace an existing output file.
    #[arg(long)]
    overwrite: bool,
}

#[derive(Args, Debug)]
struct TimelineArgs {
    #[command(flatten)]
    score: ScoreArgs,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Tick index (0-based).
    #[arg(long)]
    tick: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn parse_key_override(s: &str) -> Result<(u8, PathBuf), String> {
    let (note, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NOTE=PATH, got '{s}'"))?;
    let note: u8 = note
        .trim()
        .parse()
        .map_err(|e| format!("invalid note '{note}': {e}"))?;
    if path.is_empty() {
        return Err("override path is empty".to_owned());
    }
    Ok((note, PathBuf::from(path)))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Timeline(args) => cmd_timeline(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn load_config(score: &ScoreArgs) -> anyhow::Result<RenderConfig> {
    let mut cfg = match &score.config {
        Some(path) => RenderConfig::from_path(path)?,
        None => RenderConfig::default(),
    };
    if let Some(bpm) = score.bpm {
        cfg.tempo.bpm = bpm;
    }
    if let Some(mode) = score.mode {
        cfg.tempo.mode = mode.into();
    }
    Ok(cfg)
}

fn scene_config(scene: &SceneArgs) -> anyhow::Result<RenderConfig> {
    let mut cfg = load_config(&scene.score)?;
    if let Some(fps) = scene.fps {
        cfg.output.fps = pianoreel::Fps::whole(fps)?;
    }
    if let Some(scale) = scene.scale {
        cfg.assets.scale = scale;
    }
    if let Some(trailing) = scene.trailing {
        cfg.trailing_secs = trailing;
    }
    if scene.no_overlay {
        cfg.overlay = false;
    }
    if scene.backdrop {
        cfg.backdrop = true;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn read_timeline(score: &ScoreArgs, cfg: &RenderConfig) -> anyhow::Result<Timeline> {
    let timeline = Timeline::from_path(&score.midi, cfg.tempo()?, cfg.tempo.mode)?;
    tracing::info!(
        events = timeline.len(),
        total_secs = timeline.total_duration(),
        bpm = cfg.tempo.bpm,
        "timeline built"
    );
    Ok(timeline)
}

fn asset_source(path: &Path, mask: Option<&PathBuf>) -> anyhow::Result<AssetSource> {
    Ok(match mask {
        Some(mask) => AssetSource::masked(path, mask)?,
        None => AssetSource::from_path(path)?,
    })
}

fn load_assets(scene: &SceneArgs, opts: &LoadOpts) -> anyhow::Result<KeyAssets> {
    let mut overrides = BTreeMap::new();
    for (note, path) in &scene.keys {
        overrides.insert(*note, AssetSource::from_path(path)?);
    }
    let sources = KeyAssetSources {
        white: asset_source(&scene.white, scene.white_mask.as_ref())?,
        black: asset_source(&scene.black, scene.black_mask.as_ref())?,
        overrides,
    };
    Ok(KeyAssets::load(&sources, opts)?)
}

fn build_session(scene: &SceneArgs) -> anyhow::Result<(RenderConfig, RenderSession)> {
    let cfg = scene_config(scene)?;
    let timeline = read_timeline(&scene.score, &cfg)?;
    let assets = load_assets(scene, &cfg.load_opts())?;
    let session = RenderSession::new(&cfg, timeline, assets)?;
    Ok((cfg, session))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (mut cfg, mut session) = build_session(&args.scene)?;
    if args.overwrite {
        cfg.output.overwrite = true;
    }

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel()).context("install Ctrl-C handler")?;

    let mut sink = FfmpegSink::new(FfmpegSinkOpts {
        out_path: args.out.clone(),
        overwrite: cfg.output.overwrite,
        codec: cfg.output.codec.clone(),
    });
    let stats = session.render(&mut sink, &cancel)?;

    if stats.cancelled {
        eprintln!(
            "cancelled after {}/{} frames; partial video at {}",
            stats.frames_written,
            stats.frames_total,
            args.out.display()
        );
    } else {
        eprintln!(
            "wrote {} ({} frames, {} events)",
            args.out.display(),
            stats.frames_written,
            stats.events_applied
        );
    }
    Ok(())
}

fn cmd_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.score)?;
    let timeline = read_timeline(&args.score, &cfg)?;
    let stdout = std::io::stdout();
    serde_json::to_writer_pretty(stdout.lock(), &timeline).context("write timeline JSON")?;
    println!();
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (_, mut session) = build_session(&args.scene)?;
    let canvas = session.render_frame(args.tick)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    canvas
        .to_image()?
        .save(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
