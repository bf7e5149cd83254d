//! Note sequencer: songs, sheets and cooperative playback on a shared clock.
//!
//! PLAY spawns one playback task per sheet. Tasks never run on their own
//! thread: they are resumed by [`Sequencer::advance`] (called from SLEEP) and
//! [`Sequencer::drain`] (called by the host after the script ends), each in
//! wake-time order. A task schedules one note on the audio backend, sleeps for
//! the note's duration plus a guard margin, releases the note's nodes and
//! moves on. STOP only clears the sheet's playing flag, so the note already
//! sounding always finishes.

pub mod clock;
pub mod envelope;
pub mod note;
pub mod song;

pub use clock::{Clock, Timer, VirtualTimer, WallTimer};
pub use envelope::{Envelope, RampPlan};
pub use note::{frequency, parse_bar, Note, Pitch};
pub use song::{Sheet, Song, SongId};

use tracing::{debug, trace, warn};

use crate::audio::{AudioBackend, NodeId};

/// A note step waits this multiple of the note's duration before advancing.
pub const GUARD: f64 = 1.1;

/// Default trailing delay after the last note of a non-looping sheet.
pub const DEFAULT_TAIL_SECONDS: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    NextNote,
    /// A pitched note was scheduled; release its nodes, then advance.
    Release { osc: NodeId, gain: NodeId },
    /// A rest elapsed; advance.
    Advance,
    /// The trailing delay after the last note elapsed.
    Tail,
}

enum Resume {
    Wait(f64),
    Finished,
}

/// Playback of one sheet.
#[derive(Debug, Clone)]
struct PlaybackTask {
    id: u64,
    song: SongId,
    sheet: usize,
    cursor: usize,
    wake_at: f64,
    phase: Phase,
}

impl PlaybackTask {
    fn resume(
        &mut self,
        song: &mut Song,
        now: f64,
        tail: f64,
        audio: &mut dyn AudioBackend,
    ) -> Resume {
        loop {
            match std::mem::replace(&mut self.phase, Phase::NextNote) {
                Phase::Release { osc, gain } => {
                    audio.release(osc);
                    audio.release(gain);
                    self.cursor += 1;
                }
                Phase::Advance => self.cursor += 1,
                Phase::Tail => {
                    if let Some(sheet) = song.sheets.get_mut(self.sheet) {
                        sheet.playing = false;
                    }
                    return Resume::Finished;
                }
                Phase::NextNote => {}
            }

            let Some(sheet) = song.sheets.get(self.sheet) else {
                return Resume::Finished;
            };
            if !sheet.playing {
                return Resume::Finished;
            }

            if self.cursor >= sheet.notes.len() {
                if song.looping && !sheet.notes.is_empty() {
                    self.cursor = 0;
                } else {
                    self.phase = Phase::Tail;
                    return Resume::Wait(now + tail);
                }
            }

            let note = sheet.notes[self.cursor].clone();
            let duration = song.note_seconds(note.length);
            let wake = now + duration * GUARD;

            let name = match note.pitch {
                Pitch::Rest => {
                    self.phase = Phase::Advance;
                    return Resume::Wait(wake);
                }
                Pitch::Tone(name) => name,
            };

            let Some(freq) = frequency(&name) else {
                warn!(
                    song = %song.name,
                    sheet = self.sheet,
                    "invalid pitch '{name}', stopping sheet"
                );
                if let Some(sheet) = song.sheets.get_mut(self.sheet) {
                    sheet.playing = false;
                }
                return Resume::Finished;
            };

            let plan = sheet.envelope.plan(now, duration, sheet.gain);
            let osc = audio.create_oscillator(freq, sheet.waveform);
            let gain = audio.create_gain();
            audio.connect(osc, gain);
            audio.connect(gain, song.bus);
            audio.set_value_at(gain, 0.0, plan.start);
            audio.schedule_linear_ramp(gain, plan.peak, plan.attack_end);
            audio.schedule_linear_ramp(gain, plan.peak, plan.release_start);
            audio.schedule_linear_ramp(gain, 0.0, plan.end);
            audio.start(osc, plan.start);
            audio.stop(osc, plan.end);
            trace!(
                song = %song.name,
                sheet = self.sheet,
                pitch = %name,
                at = now,
                duration,
                "note"
            );

            self.phase = Phase::Release { osc, gain };
            return Resume::Wait(wake);
        }
    }
}

/// Owns every song and drives their playback tasks.
#[derive(Debug)]
pub struct Sequencer {
    songs: Vec<Song>,
    tasks: Vec<PlaybackTask>,
    clock: Clock,
    tail: f64,
    next_task: u64,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequencer {
    pub fn new() -> Self {
        Self::with_tail(DEFAULT_TAIL_SECONDS)
    }

    /// A sequencer whose non-looping sheets linger `tail` seconds after their
    /// last note.
    pub fn with_tail(tail: f64) -> Self {
        Self {
            songs: Vec::new(),
            tasks: Vec::new(),
            clock: Clock::new(),
            tail: tail.max(0.0),
            next_task: 0,
        }
    }

    /// Current shared clock time in seconds.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Create a song with its own output bus connected to the destination.
    pub fn create_song(&mut self, name: &str, audio: &mut dyn AudioBackend) -> SongId {
        let bus = audio.create_gain();
        let destination = audio.destination();
        audio.connect(bus, destination);
        self.songs.push(Song::new(name, bus));
        debug!(song = name, "song created");
        SongId(self.songs.len() - 1)
    }

    pub fn song(&self, id: SongId) -> Option<&Song> {
        self.songs.get(id.0)
    }

    pub fn song_mut(&mut self, id: SongId) -> Option<&mut Song> {
        self.songs.get_mut(id.0)
    }

    /// Whether any sheet of the song still has a live playback task.
    pub fn is_playing(&self, id: SongId) -> bool {
        self.tasks.iter().any(|t| t.song == id)
    }

    /// Number of live playback tasks across all songs.
    pub fn active_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Start every sheet of a song concurrently. Returns immediately after the
    /// first note of each sheet is scheduled; returns `false` if the song is
    /// unknown or already playing.
    pub fn play(&mut self, id: SongId, audio: &mut dyn AudioBackend) -> bool {
        if self.is_playing(id) {
            debug!(song = id.0, "already playing, ignoring PLAY");
            return false;
        }
        let Some(song) = self.songs.get_mut(id.0) else {
            return false;
        };

        let now = self.clock.now();
        for (index, sheet) in song.sheets.iter_mut().enumerate() {
            sheet.prepare();
            sheet.playing = true;
            self.tasks.push(PlaybackTask {
                id: self.next_task,
                song: id,
                sheet: index,
                cursor: 0,
                wake_at: now,
                phase: Phase::NextNote,
            });
            self.next_task += 1;
        }
        debug!(song = %song.name, sheets = song.sheets.len(), "play");

        self.run_due(now, audio, &mut VirtualTimer);
        true
    }

    /// Clear the playing flag of every sheet. Takes effect at each sheet's
    /// next note boundary.
    pub fn stop(&mut self, id: SongId) {
        if let Some(song) = self.songs.get_mut(id.0) {
            for sheet in &mut song.sheets {
                sheet.playing = false;
            }
            debug!(song = %song.name, "stop");
        }
    }

    /// Let `seconds` pass on the shared clock, resuming every task that comes
    /// due along the way.
    pub fn advance(&mut self, seconds: f64, audio: &mut dyn AudioBackend, timer: &mut dyn Timer) {
        let target = self.clock.now() + seconds.max(0.0);
        self.run_due(target, audio, timer);
        self.clock.advance_to(target, timer);
    }

    /// Keep playing until every task finishes or `max_seconds` pass.
    /// Returns `true` when nothing is left playing.
    pub fn drain(
        &mut self,
        max_seconds: f64,
        audio: &mut dyn AudioBackend,
        timer: &mut dyn Timer,
    ) -> bool {
        let deadline = self.clock.now() + max_seconds.max(0.0);
        self.run_due(deadline, audio, timer);
        if self.tasks.is_empty() {
            true
        } else {
            self.clock.advance_to(deadline, timer);
            false
        }
    }

    fn run_due(&mut self, target: f64, audio: &mut dyn AudioBackend, timer: &mut dyn Timer) {
        while let Some(index) = self.next_due(target) {
            self.clock.advance_to(self.tasks[index].wake_at, timer);
            self.step(index, audio);
        }
    }

    /// The earliest task due at or before `target`; ties go to the oldest task.
    fn next_due(&self, target: f64) -> Option<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.wake_at <= target)
            .min_by(|(_, a), (_, b)| {
                a.wake_at
                    .total_cmp(&b.wake_at)
                    .then_with(|| a.id.cmp(&b.id))
            })
            .map(|(i, _)| i)
    }

    fn step(&mut self, index: usize, audio: &mut dyn AudioBackend) {
        let now = self.clock.now();
        let task = &mut self.tasks[index];
        let outcome = match self.songs.get_mut(task.song.0) {
            Some(song) => task.resume(song, now, self.tail, audio),
            None => Resume::Finished,
        };

        match outcome {
            Resume::Wait(at) => task.wake_at = at,
            Resume::Finished => {
                let task = self.tasks.remove(index);
                debug!(song = task.song.0, sheet = task.sheet, at = now, "sheet finished");
            }
        }
    }
}
