//! Songs and sheets.

use crate::audio::{NodeId, Waveform};

use super::envelope::Envelope;
use super::note::{parse_bar, Note};

pub const DEFAULT_BPM: f64 = 120.0;
pub const DEFAULT_GAIN: f64 = 0.8;

/// Index of a song in the sequencer's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SongId(pub usize);

/// One voice of a song.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    /// Raw bar text, one BAR statement per line.
    pub bar: String,
    /// Built from `bar` just before playback.
    pub notes: Vec<Note>,
    pub gain: f64,
    pub waveform: Waveform,
    pub envelope: Envelope,
    pub playing: bool,
}

impl Default for Sheet {
    fn default() -> Self {
        Self {
            bar: String::new(),
            notes: Vec::new(),
            gain: DEFAULT_GAIN,
            waveform: Waveform::default(),
            envelope: Envelope::default(),
            playing: false,
        }
    }
}

impl Sheet {
    pub fn append_bar(&mut self, text: &str) {
        if !self.bar.is_empty() {
            self.bar.push('\n');
        }
        self.bar.push_str(text);
    }

    /// Rebuild the note list from the bar text.
    pub fn prepare(&mut self) {
        self.notes = parse_bar(&self.bar);
    }
}

/// A named group of sheets sharing tempo, loop setting and an output bus.
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub name: String,
    pub sheets: Vec<Sheet>,
    pub bus: NodeId,
    pub bpm: f64,
    pub looping: bool,
}

impl Song {
    pub fn new(name: impl Into<String>, bus: NodeId) -> Self {
        Self {
            name: name.into(),
            sheets: Vec::new(),
            bus,
            bpm: DEFAULT_BPM,
            looping: false,
        }
    }

    /// Append a sheet and return its index.
    pub fn add_sheet(&mut self) -> usize {
        self.sheets.push(Sheet::default());
        self.sheets.len() - 1
    }

    pub fn sheet_mut(&mut self, index: usize) -> Option<&mut Sheet> {
        self.sheets.get_mut(index)
    }

    /// Seconds a note of `length` steps lasts at this song's tempo.
    pub fn note_seconds(&self, length: u32) -> f64 {
        length as f64 * (DEFAULT_BPM / self.bpm)
    }
}
