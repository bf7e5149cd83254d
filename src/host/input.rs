//! Input polling seam.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Keyboard and pointer state, polled by INPUT and MOUSEX/MOUSEY.
pub trait InputBackend {
    fn is_key_down(&self, name: &str) -> bool;
    /// Pointer position in surface pixels.
    fn pointer_position(&self) -> (f64, f64);
}

/// No keys held, pointer at the origin.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullInput;

impl InputBackend for NullInput {
    fn is_key_down(&self, _name: &str) -> bool {
        false
    }

    fn pointer_position(&self) -> (f64, f64) {
        (0.0, 0.0)
    }
}

#[derive(Debug, Default)]
struct InputState {
    keys: HashSet<String>,
    pointer: (f64, f64),
}

/// Input whose state is set by the host or a test. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    state: Rc<RefCell<InputState>>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self, key: &str) {
        self.state.borrow_mut().keys.insert(key.to_string());
    }

    pub fn release(&self, key: &str) {
        self.state.borrow_mut().keys.remove(key);
    }

    pub fn move_pointer(&self, x: f64, y: f64) {
        self.state.borrow_mut().pointer = (x, y);
    }
}

impl InputBackend for ScriptedInput {
    fn is_key_down(&self, name: &str) -> bool {
        self.state.borrow().keys.contains(name)
    }

    fn pointer_position(&self) -> (f64, f64) {
        self.state.borrow().pointer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let input = ScriptedInput::new();
        let handle = input.clone();
        handle.press("ArrowLeft");
        assert!(input.is_key_down("ArrowLeft"));
        assert!(!input.is_key_down("ArrowRight"));
        handle.release("ArrowLeft");
        assert!(!input.is_key_down("ArrowLeft"));
    }

    #[test]
    fn pointer_moves() {
        let input = ScriptedInput::new();
        input.move_pointer(12.0, 7.5);
        assert_eq!(input.pointer_position(), (12.0, 7.5));
        assert_eq!(NullInput.pointer_position(), (0.0, 0.0));
    }
}
