//! `oneshot`: run a OneShot script from the command line.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use oneshot::audio::{NullAudio, OfflineMixer};
use oneshot::host::{NullInput, StdConsole, TracingSurface};
use oneshot::sequencer::{VirtualTimer, WallTimer};
use oneshot::{Config, Interpreter, RunOutcome, StopHandle};

/// Run a OneShot script
#[derive(Parser)]
#[command(name = "oneshot")]
#[command(about = "Interpreter for the OneShot game scripting language")]
struct Args {
    /// Script to run
    script: PathBuf,

    /// Render all scheduled audio to a WAV file
    #[arg(long)]
    wav: Option<PathBuf>,

    /// Seed for RANDOM()
    #[arg(long)]
    seed: Option<u64>,

    /// Run SLEEP and playback on a virtual clock without waiting
    #[arg(long)]
    no_realtime: bool,

    /// How long to keep background playback going after the script ends
    #[arg(long)]
    linger_ms: Option<u64>,

    /// Surface pixels per grid unit
    #[arg(long)]
    scale: Option<f64>,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Config file (default: ~/.oneshot/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        };
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if self.no_realtime {
            config.realtime = false;
        }
        if let Some(linger) = self.linger_ms {
            config.linger_ms = linger;
        }
        if let Some(scale) = self.scale {
            config.grid_scale = scale;
        }
        config
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(&args.log_level)
        .with_writer(std::io::stderr)
        .init();

    let config = args.config();
    let source = std::fs::read_to_string(&args.script)
        .with_context(|| format!("reading {}", args.script.display()))?;

    let handle = StopHandle::new();
    let signal = handle.clone();
    ctrlc::set_handler(move || signal.stop()).context("installing Ctrl-C handler")?;

    let mixer = OfflineMixer::new();
    let mut builder = Interpreter::builder()
        .config(&config)
        .stop_handle(handle)
        .surface(TracingSurface)
        .input(NullInput)
        .console(StdConsole);
    builder = if args.wav.is_some() {
        builder.audio(mixer.clone())
    } else {
        builder.audio(NullAudio::default())
    };
    builder = if config.realtime {
        builder.timer(WallTimer)
    } else {
        builder.timer(VirtualTimer)
    };
    let mut interpreter = builder.build();

    info!(script = %args.script.display(), "oneshot v{}", env!("CARGO_PKG_VERSION"));
    match interpreter.run(&source)? {
        RunOutcome::Completed => {
            if !interpreter.drain(config.linger_ms) {
                warn!(linger_ms = config.linger_ms, "playback still running at exit");
            }
        }
        RunOutcome::Cancelled => info!("cancelled"),
    }

    if let Some(path) = &args.wav {
        let duration = mixer.end_time().max(interpreter.now());
        mixer
            .write_wav(path, config.sample_rate, duration)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), seconds = duration, "wrote wav");
    }
    Ok(())
}
