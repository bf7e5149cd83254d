//! Host-side backends the interpreter drives: drawing, input and console.
//!
//! Each seam is a trait with a recording implementation for tests and a
//! minimal one for the CLI.

pub mod console;
pub mod input;
pub mod surface;

pub use console::{CapturedConsole, Console, Output, PrintHook, StdConsole};
pub use input::{InputBackend, NullInput, ScriptedInput};
pub use surface::{DrawCommand, RecordingSurface, Surface, TracingSurface};
