//! Rendering surface seam.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

/// Pixel-rendering backend. Coordinates are in surface pixels.
pub trait Surface {
    fn resize(&mut self, width: f64, height: f64);
    fn set_fill_color(&mut self, color: &str);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn fill_text(&mut self, text: &str, x: f64, y: f64, font: &str);
    fn clear(&mut self);
}

/// A draw call as seen by a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Resize {
        width: f64,
        height: f64,
    },
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: String,
    },
    FillText {
        text: String,
        x: f64,
        y: f64,
        font: String,
        color: String,
    },
    Clear,
}

#[derive(Debug, Default)]
struct Recording {
    color: String,
    commands: Vec<DrawCommand>,
}

/// Surface that records every call. Clones share the same recording.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    inner: Rc<RefCell<Recording>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<DrawCommand> {
        self.inner.borrow().commands.clone()
    }

    /// Only the filled rectangles, in draw order.
    pub fn rects(&self) -> Vec<DrawCommand> {
        self.inner
            .borrow()
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillRect { .. }))
            .cloned()
            .collect()
    }

    pub fn fill_color(&self) -> String {
        self.inner.borrow().color.clone()
    }
}

impl Surface for RecordingSurface {
    fn resize(&mut self, width: f64, height: f64) {
        self.inner
            .borrow_mut()
            .commands
            .push(DrawCommand::Resize { width, height });
    }

    fn set_fill_color(&mut self, color: &str) {
        self.inner.borrow_mut().color = color.to_string();
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let mut inner = self.inner.borrow_mut();
        let color = inner.color.clone();
        inner.commands.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, font: &str) {
        let mut inner = self.inner.borrow_mut();
        let color = inner.color.clone();
        inner.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            x,
            y,
            font: font.to_string(),
            color,
        });
    }

    fn clear(&mut self) {
        self.inner.borrow_mut().commands.push(DrawCommand::Clear);
    }
}

/// Surface that only emits `trace` events; used by the CLI.
#[derive(Debug, Default)]
pub struct TracingSurface;

impl Surface for TracingSurface {
    fn resize(&mut self, width: f64, height: f64) {
        trace!(target: "oneshot::draw", width, height, "resize");
    }

    fn set_fill_color(&mut self, color: &str) {
        trace!(target: "oneshot::draw", color, "fill color");
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        trace!(target: "oneshot::draw", x, y, width, height, "fill rect");
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, font: &str) {
        trace!(target: "oneshot::draw", text, x, y, font, "fill text");
    }

    fn clear(&mut self) {
        trace!(target: "oneshot::draw", "clear");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_captures_current_color() {
        let mut surface = RecordingSurface::new();
        surface.set_fill_color("red");
        surface.fill_rect(0.0, 0.0, 4.0, 4.0);
        surface.set_fill_color("blue");
        surface.fill_rect(4.0, 0.0, 4.0, 4.0);

        let rects = surface.rects();
        assert_eq!(rects.len(), 2);
        assert!(matches!(&rects[0], DrawCommand::FillRect { color, .. } if color == "red"));
        assert!(matches!(&rects[1], DrawCommand::FillRect { color, .. } if color == "blue"));
    }

    #[test]
    fn clones_share_recording() {
        let surface = RecordingSurface::new();
        let mut handle = surface.clone();
        handle.clear();
        assert_eq!(surface.commands(), vec![DrawCommand::Clear]);
    }
}
