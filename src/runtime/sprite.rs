//! Sprites and their frames.

use std::collections::HashMap;

use crate::lang::Error;

/// Index of a sprite in the interpreter's sprite store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteId(pub usize);

/// One pixel-grid image: a palette and rows of palette characters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub palette: HashMap<char, String>,
    pub rows: Vec<String>,
}

impl Frame {
    /// Every palette-mapped cell as `(column, row, color)`. Characters with no
    /// palette entry are transparent.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &str)> + '_ {
        self.rows.iter().enumerate().flat_map(move |(y, row)| {
            row.chars()
                .enumerate()
                .filter_map(move |(x, ch)| self.palette.get(&ch).map(|c| (x, y, c.as_str())))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sprite {
    pub name: String,
    pub width: usize,
    pub height: usize,
    pub frames: Vec<Frame>,
    by_name: HashMap<String, usize>,
    pub current: usize,
}

impl Sprite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a frame and make it current.
    pub fn add_frame(&mut self, name: Option<&str>) -> usize {
        self.frames.push(Frame::default());
        let index = self.frames.len() - 1;
        if let Some(name) = name {
            self.by_name.insert(name.to_string(), index);
        }
        self.current = index;
        index
    }

    fn frame_mut(&mut self, index: usize) -> Result<&mut Frame, Error> {
        let name = &self.name;
        self.frames
            .get_mut(index)
            .ok_or_else(|| Error::runtime(format!("sprite '{name}' has no frame {index}")))
    }

    pub fn set_color(&mut self, frame: usize, key: char, color: &str) -> Result<(), Error> {
        self.frame_mut(frame)?.palette.insert(key, color.to_string());
        Ok(())
    }

    /// Append a row to frame `frame`, enforcing the declared size.
    pub fn push_row(&mut self, frame: usize, row: &str) -> Result<(), Error> {
        let (width, height, name) = (self.width, self.height, self.name.clone());
        let frame = self.frame_mut(frame)?;

        let len = row.chars().count();
        if len > width {
            return Err(Error::runtime(format!(
                "pixel row \"{row}\" is {len} wide but sprite '{name}' is {width} wide"
            )));
        }
        if frame.rows.len() >= height {
            return Err(Error::runtime(format!(
                "too many pixel rows for sprite '{name}' (height {height})"
            )));
        }
        frame.rows.push(row.to_string());
        Ok(())
    }

    pub fn frame_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }
}
