//! Bar text → notes, and pitch names → frequencies.

/// Extends the previous note by one step.
pub const HOLD: &str = "-";
/// Also extends the previous note; reads better at the end of a phrase.
pub const EXTEND: &str = "_";
/// A silent step.
pub const REST: &str = ".";

/// A pitched or silent segment with a duration multiplier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub pitch: Pitch,
    pub length: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pitch {
    /// Unvalidated pitch text, e.g. `"A4"` or `"F#3"`.
    Tone(String),
    Rest,
}

impl Note {
    pub fn tone(pitch: impl Into<String>) -> Self {
        Self {
            pitch: Pitch::Tone(pitch.into()),
            length: 1,
        }
    }

    pub fn rest() -> Self {
        Self {
            pitch: Pitch::Rest,
            length: 1,
        }
    }

    pub fn is_rest(&self) -> bool {
        self.pitch == Pitch::Rest
    }
}

/// Split bar text into notes.
///
/// Newlines and tabs count as spaces. Hold and extend markers lengthen the
/// previous note instead of adding one; a marker with nothing before it
/// becomes a rest.
pub fn parse_bar(text: &str) -> Vec<Note> {
    let normalized = text.replace(['\n', '\r', '\t'], " ");
    let mut notes: Vec<Note> = Vec::new();

    for token in normalized.split_whitespace() {
        match token {
            HOLD | EXTEND => match notes.last_mut() {
                Some(prev) => prev.length += 1,
                None => notes.push(Note::rest()),
            },
            REST => notes.push(Note::rest()),
            pitch => notes.push(Note::tone(pitch)),
        }
    }

    notes
}

/// Semitone offset of a natural pitch letter from A in the same octave.
fn letter_offset(letter: char) -> Option<i32> {
    let offset = match letter {
        'C' => -9,
        'D' => -7,
        'E' => -5,
        'F' => -4,
        'G' => -2,
        'A' => 0,
        'B' => 2,
        _ => return None,
    };
    Some(offset)
}

/// Semitones from A4 for a pitch name.
///
/// Format: `<letter A-G><optional # or b><octave>`.
pub fn semitones_from_a4(name: &str) -> Option<i32> {
    let mut chars = name.chars();
    let base = letter_offset(chars.next()?)?;

    let rest = chars.as_str();
    let (accidental, octave_str) = if let Some(r) = rest.strip_prefix('#') {
        (1, r)
    } else if let Some(r) = rest.strip_prefix('b') {
        (-1, r)
    } else {
        (0, rest)
    };

    if octave_str.is_empty() || !octave_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let octave: i32 = octave_str.parse().ok()?;

    Some(base + accidental + (octave - 4) * 12)
}

/// Equal-tempered frequency in Hz, A4 = 440.
pub fn frequency(name: &str) -> Option<f64> {
    let semitones = semitones_from_a4(name)?;
    Some(440.0 * 2.0f64.powf(semitones as f64 / 12.0))
}
