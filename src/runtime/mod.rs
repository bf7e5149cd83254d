//! The tree-walking interpreter and the context it threads through every
//! statement: host backends, scopes, sprites and the sequencer.

pub mod environment;
pub mod sprite;

mod eval;
mod exec;

pub use environment::{Environment, ScopeId};
pub use sprite::{Frame, Sprite, SpriteId};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::audio::{AudioBackend, NullAudio};
use crate::config::Config;
use crate::host::{Console, InputBackend, NullInput, PrintHook, StdConsole, Surface, TracingSurface};
use crate::lang::{self, Error};
use crate::sequencer::{Sequencer, Timer, VirtualTimer};

/// Slice of virtual time [`Interpreter::drain`] advances between checks of
/// the running flag.
const DRAIN_SLICE_SECONDS: f64 = 0.1;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every top-level statement executed.
    Completed,
    /// A loop saw the running flag cleared and unwound.
    Cancelled,
}

/// Whether execution continues after a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Next,
    Halt,
}

/// Thread-safe handle that requests cooperative cancellation.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl Default for StopHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl StopHandle {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn stop(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Wires host backends and configuration into an [`Interpreter`].
#[derive(Default)]
pub struct InterpreterBuilder {
    surface: Option<Box<dyn Surface>>,
    audio: Option<Box<dyn AudioBackend>>,
    input: Option<Box<dyn InputBackend>>,
    console: Option<Box<dyn Console>>,
    timer: Option<Box<dyn Timer>>,
    running: Option<StopHandle>,
    config: Config,
}

impl InterpreterBuilder {
    pub fn surface(mut self, surface: impl Surface + 'static) -> Self {
        self.surface = Some(Box::new(surface));
        self
    }

    pub fn audio(mut self, audio: impl AudioBackend + 'static) -> Self {
        self.audio = Some(Box::new(audio));
        self
    }

    pub fn input(mut self, input: impl InputBackend + 'static) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    pub fn console(mut self, console: impl Console + 'static) -> Self {
        self.console = Some(Box::new(console));
        self
    }

    /// Route PRINT output to `hook`. DEBUG output is dropped.
    pub fn on_print(self, hook: impl FnMut(&str) + 'static) -> Self {
        self.console(PrintHook(hook))
    }

    pub fn timer(mut self, timer: impl Timer + 'static) -> Self {
        self.timer = Some(Box::new(timer));
        self
    }

    /// Share a running flag created before the interpreter, e.g. by a signal
    /// handler or a host callback.
    pub fn stop_handle(mut self, handle: StopHandle) -> Self {
        self.running = Some(handle);
        self
    }

    pub fn config(mut self, config: &Config) -> Self {
        self.config = config.clone();
        self
    }

    pub fn build(self) -> Interpreter {
        let rng = match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Interpreter {
            surface: self.surface.unwrap_or_else(|| Box::new(TracingSurface)),
            audio: self.audio.unwrap_or_else(|| Box::new(NullAudio::default())),
            input: self.input.unwrap_or_else(|| Box::new(NullInput)),
            console: self.console.unwrap_or_else(|| Box::new(StdConsole)),
            timer: self.timer.unwrap_or_else(|| Box::new(VirtualTimer)),
            env: Environment::new(),
            sprites: Vec::new(),
            sequencer: Sequencer::with_tail(self.config.tail_ms as f64 / 1000.0),
            rng,
            running: self.running.unwrap_or_default().0,
            scale: self.config.grid_scale,
            font: self.config.font,
            color: String::new(),
            window: (0.0, 0.0),
        }
    }
}

/// Executes OneShot programs against a set of host backends.
pub struct Interpreter {
    surface: Box<dyn Surface>,
    audio: Box<dyn AudioBackend>,
    input: Box<dyn InputBackend>,
    console: Box<dyn Console>,
    timer: Box<dyn Timer>,
    env: Environment,
    sprites: Vec<Sprite>,
    sequencer: Sequencer,
    rng: ChaCha8Rng,
    running: Arc<AtomicBool>,
    /// Surface pixels per grid unit.
    scale: f64,
    font: String,
    /// The script's current fill colour.
    color: String,
    /// Window size in grid units.
    window: (f64, f64),
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Interpreter {
    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::default()
    }

    /// Lex, parse and execute `source`. Each run starts from a fresh root
    /// scope; songs already playing keep playing.
    pub fn run(&mut self, source: &str) -> Result<RunOutcome, Error> {
        let program = lang::parse(source)?;
        info!(statements = program.len(), "run start");

        self.running.store(true, Ordering::SeqCst);
        self.env = Environment::new();
        self.sprites.clear();

        let root = self.env.root();
        let outcome = match self.execute_all(&program, root)? {
            Flow::Next => RunOutcome::Completed,
            Flow::Halt => RunOutcome::Cancelled,
        };
        info!(?outcome, "run finished");
        Ok(outcome)
    }

    /// Clear the running flag and the surface.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.surface.clear();
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.running))
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Keep background playback going for up to `max_ms`, or until every
    /// sheet has finished or the running flag is cleared. Returns `true` when
    /// nothing is left playing.
    pub fn drain(&mut self, max_ms: u64) -> bool {
        let mut remaining = max_ms as f64 / 1000.0;
        while remaining > 0.0 && self.is_running() {
            let slice = remaining.min(DRAIN_SLICE_SECONDS);
            if self
                .sequencer
                .drain(slice, self.audio.as_mut(), self.timer.as_mut())
            {
                return true;
            }
            remaining -= slice;
        }
        debug!(tasks = self.sequencer.active_tasks(), "drain finished");
        self.sequencer.active_tasks() == 0
    }

    /// Current time on the shared playback clock, in seconds.
    pub fn now(&self) -> f64 {
        self.sequencer.now()
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Look up a sprite registered during the last run.
    pub fn sprite(&self, name: &str) -> Option<&Sprite> {
        self.sprites.iter().rev().find(|s| s.name == name)
    }
}
