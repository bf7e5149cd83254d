//! OneShot: a small scripting language for self-contained pixel games.
//!
//! Source text is lexed and parsed by [`lang`], executed by the
//! [`Interpreter`] in [`runtime`], and drives host backends for drawing
//! ([`host`]) and audio ([`audio`]) with background music scheduled by the
//! [`sequencer`].

pub mod audio;
pub mod config;
pub mod host;
pub mod lang;
pub mod runtime;
pub mod sequencer;

pub use config::Config;
pub use lang::{parse, scan, Error, Value};
pub use runtime::{Interpreter, InterpreterBuilder, RunOutcome, StopHandle};
