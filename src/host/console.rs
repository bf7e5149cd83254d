//! Where PRINT and DEBUG output goes.

use std::cell::RefCell;
use std::rc::Rc;

/// Host hooks for script output.
pub trait Console {
    /// Called once per PRINT with the value already formatted for display.
    fn print(&mut self, message: &str);
    /// Called once per DEBUG.
    fn debug(&mut self, message: &str);
}

/// PRINT to stdout, DEBUG to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl Console for StdConsole {
    fn print(&mut self, message: &str) {
        println!("{message}");
    }

    fn debug(&mut self, message: &str) {
        eprintln!("[debug] {message}");
    }
}

/// A console built from a host-supplied print callback. DEBUG output is
/// discarded.
pub struct PrintHook<F: FnMut(&str)>(pub F);

impl<F: FnMut(&str)> Console for PrintHook<F> {
    fn print(&mut self, message: &str) {
        (self.0)(message);
    }

    fn debug(&mut self, _message: &str) {}
}

/// Captured output lines, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Print(String),
    Debug(String),
}

/// Console that keeps everything. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct CapturedConsole {
    lines: Rc<RefCell<Vec<Output>>>,
}

impl CapturedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self) -> Vec<Output> {
        self.lines.borrow().clone()
    }

    pub fn printed(&self) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter_map(|line| match line {
                Output::Print(s) => Some(s.clone()),
                Output::Debug(_) => None,
            })
            .collect()
    }

    pub fn debugged(&self) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter_map(|line| match line {
                Output::Debug(s) => Some(s.clone()),
                Output::Print(_) => None,
            })
            .collect()
    }
}

impl Console for CapturedConsole {
    fn print(&mut self, message: &str) {
        self.lines
            .borrow_mut()
            .push(Output::Print(message.to_string()));
    }

    fn debug(&mut self, message: &str) {
        self.lines
            .borrow_mut()
            .push(Output::Debug(message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captured_separates_print_and_debug() {
        let console = CapturedConsole::new();
        let mut handle = console.clone();
        handle.print("a");
        handle.debug("b");
        handle.print("c");
        assert_eq!(console.printed(), vec!["a", "c"]);
        assert_eq!(console.debugged(), vec!["b"]);
        assert_eq!(console.output().len(), 3);
    }

    #[test]
    fn print_hook_forwards() {
        let mut seen = Vec::new();
        {
            let mut hook = PrintHook(|m: &str| seen.push(m.to_string()));
            hook.print("hello");
            hook.debug("ignored");
        }
        assert_eq!(seen, vec!["hello"]);
    }
}
