//! Audio backend seam.
//!
//! The sequencer never produces samples itself. It builds a small graph of
//! oscillator and gain nodes through an [`AudioBackend`] and schedules gain
//! automation at absolute times on the shared clock (seconds). Backends decide
//! what "playing" means: [`OfflineMixer`] records the graph and renders it to
//! PCM, [`NullAudio`] discards it.

pub mod mixer;
pub mod waveform;

pub use mixer::OfflineMixer;
pub use waveform::Waveform;

/// Handle to a node created by an [`AudioBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// Oscillator/gain primitives the sequencer drives.
pub trait AudioBackend {
    /// The node everything audible is ultimately connected to.
    fn destination(&self) -> NodeId;

    fn create_oscillator(&mut self, frequency: f64, waveform: Waveform) -> NodeId;

    /// A gain node. Its value is 1.0 until automation says otherwise.
    fn create_gain(&mut self) -> NodeId;

    /// Jump a gain node to `value` at `at` seconds.
    fn set_value_at(&mut self, node: NodeId, value: f64, at: f64);

    /// Ramp linearly from the previous automation point to `target`, arriving at `at`.
    fn schedule_linear_ramp(&mut self, node: NodeId, target: f64, at: f64);

    fn connect(&mut self, from: NodeId, to: NodeId);

    fn start(&mut self, node: NodeId, at: f64);

    fn stop(&mut self, node: NodeId, at: f64);

    /// Tear a node down once nothing scheduled on it remains audible.
    fn release(&mut self, node: NodeId);
}

/// Backend that accepts every call and produces nothing.
#[derive(Debug, Default)]
pub struct NullAudio {
    next: usize,
}

impl NullAudio {
    fn allocate(&mut self) -> NodeId {
        self.next += 1;
        NodeId(self.next)
    }
}

impl AudioBackend for NullAudio {
    fn destination(&self) -> NodeId {
        NodeId(0)
    }

    fn create_oscillator(&mut self, _frequency: f64, _waveform: Waveform) -> NodeId {
        self.allocate()
    }

    fn create_gain(&mut self) -> NodeId {
        self.allocate()
    }

    fn set_value_at(&mut self, _node: NodeId, _value: f64, _at: f64) {}

    fn schedule_linear_ramp(&mut self, _node: NodeId, _target: f64, _at: f64) {}

    fn connect(&mut self, _from: NodeId, _to: NodeId) {}

    fn start(&mut self, _node: NodeId, _at: f64) {}

    fn stop(&mut self, _node: NodeId, _at: f64) {}

    fn release(&mut self, _node: NodeId) {}
}
