//! Offline mixer: records the node graph and renders it to PCM or WAV.
//!
//! Handles are cheap clones sharing one graph, so a caller can keep a handle
//! for rendering after giving another to the interpreter.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use super::{AudioBackend, NodeId, Waveform};

/// Output ceiling applied after mixing.
const CEILING: f32 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Automation {
    Set { value: f64, at: f64 },
    Ramp { target: f64, at: f64 },
}

impl Automation {
    fn time(&self) -> f64 {
        match *self {
            Automation::Set { at, .. } | Automation::Ramp { at, .. } => at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum NodeKind {
    Destination,
    Oscillator { frequency: f64, waveform: Waveform },
    Gain { automation: Vec<Automation> },
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    outputs: Vec<NodeId>,
    start: Option<f64>,
    stop: Option<f64>,
    released: bool,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            outputs: Vec::new(),
            start: None,
            stop: None,
            released: false,
        }
    }
}

/// A scheduled tone as seen by the mixer, for inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledTone {
    pub frequency: f64,
    pub waveform: Waveform,
    pub start: f64,
    pub stop: f64,
}

#[derive(Debug, Default)]
struct Graph {
    nodes: Vec<Node>,
}

/// Recording [`AudioBackend`] that can mix what was scheduled.
#[derive(Debug, Clone)]
pub struct OfflineMixer {
    graph: Rc<RefCell<Graph>>,
}

impl Default for OfflineMixer {
    fn default() -> Self {
        Self::new()
    }
}

impl OfflineMixer {
    pub fn new() -> Self {
        let graph = Graph {
            nodes: vec![Node::new(NodeKind::Destination)],
        };
        Self {
            graph: Rc::new(RefCell::new(graph)),
        }
    }

    fn add(&self, kind: NodeKind) -> NodeId {
        let mut graph = self.graph.borrow_mut();
        graph.nodes.push(Node::new(kind));
        NodeId(graph.nodes.len() - 1)
    }

    /// Every oscillator that was started, in creation order.
    pub fn tones(&self) -> Vec<ScheduledTone> {
        self.graph
            .borrow()
            .nodes
            .iter()
            .filter_map(|node| match (&node.kind, node.start) {
                (
                    NodeKind::Oscillator {
                        frequency,
                        waveform,
                    },
                    Some(start),
                ) => Some(ScheduledTone {
                    frequency: *frequency,
                    waveform: *waveform,
                    start,
                    stop: node.stop.unwrap_or(f64::INFINITY),
                }),
                _ => None,
            })
            .collect()
    }

    /// Number of nodes not yet released, excluding the destination.
    pub fn live_nodes(&self) -> usize {
        self.graph
            .borrow()
            .nodes
            .iter()
            .skip(1)
            .filter(|n| !n.released)
            .count()
    }

    /// Time at which the last scheduled oscillator stops.
    pub fn end_time(&self) -> f64 {
        self.tones()
            .iter()
            .map(|t| t.stop)
            .filter(|t| t.is_finite())
            .fold(0.0, f64::max)
    }

    /// Gain of `node` at time `t`, following its automation.
    pub fn gain_at(&self, node: NodeId, t: f64) -> f64 {
        let graph = self.graph.borrow();
        match graph.nodes.get(node.0).map(|n| &n.kind) {
            Some(NodeKind::Gain { automation }) => automation_value(automation, t),
            _ => 1.0,
        }
    }

    /// Mix everything scheduled into mono samples covering `[0, duration)`.
    pub fn render(&self, sample_rate: u32, duration: f64) -> Vec<f32> {
        let graph = self.graph.borrow();
        let frames = (duration.max(0.0) * sample_rate as f64).ceil() as usize;
        let mut out = vec![0.0f32; frames];
        let sr = sample_rate as f64;

        for node in &graph.nodes {
            let (frequency, waveform) = match node.kind {
                NodeKind::Oscillator {
                    frequency,
                    waveform,
                } => (frequency, waveform),
                _ => continue,
            };
            let Some(start) = node.start else { continue };
            let stop = node.stop.unwrap_or(duration).min(duration);
            let first = (start * sr).ceil().max(0.0) as usize;
            let last = ((stop * sr).ceil() as usize).min(frames);

            for (i, sample) in out.iter_mut().enumerate().take(last).skip(first) {
                let t = i as f64 / sr;
                let phase = ((t - start) * frequency).fract();
                let level: f64 = node
                    .outputs
                    .iter()
                    .map(|&next| path_gain(&graph.nodes, next, t))
                    .sum();
                *sample += (waveform.sample(phase) * level) as f32;
            }
        }

        for sample in out.iter_mut() {
            *sample = sample.clamp(-CEILING, CEILING);
        }
        out
    }

    /// Render to a 32-bit float mono WAV file.
    pub fn write_wav(
        &self,
        path: impl AsRef<Path>,
        sample_rate: u32,
        duration: f64,
    ) -> Result<(), hound::Error> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for sample in self.render(sample_rate, duration) {
            writer.write_sample(sample)?;
        }
        writer.finalize()
    }
}

/// Product of gains from `node` down to the destination, summed over fan-out.
fn path_gain(nodes: &[Node], node: NodeId, t: f64) -> f64 {
    let Some(n) = nodes.get(node.0) else {
        return 0.0;
    };
    match &n.kind {
        NodeKind::Destination => 1.0,
        NodeKind::Gain { automation } => {
            let own = automation_value(automation, t);
            n.outputs
                .iter()
                .map(|&next| own * path_gain(nodes, next, t))
                .sum()
        }
        NodeKind::Oscillator { .. } => 0.0,
    }
}

fn automation_value(automation: &[Automation], t: f64) -> f64 {
    let mut value = 1.0;
    let mut prev_time = 0.0;

    for event in automation {
        match *event {
            Automation::Set { value: v, at } => {
                if t < at {
                    return value;
                }
                value = v;
                prev_time = at;
            }
            Automation::Ramp { target, at } => {
                if t < at {
                    let span = at - prev_time;
                    if span <= 0.0 || t < prev_time {
                        return value;
                    }
                    return value + (target - value) * (t - prev_time) / span;
                }
                value = target;
                prev_time = at;
            }
        }
    }
    value
}

impl AudioBackend for OfflineMixer {
    fn destination(&self) -> NodeId {
        NodeId(0)
    }

    fn create_oscillator(&mut self, frequency: f64, waveform: Waveform) -> NodeId {
        self.add(NodeKind::Oscillator {
            frequency,
            waveform,
        })
    }

    fn create_gain(&mut self) -> NodeId {
        self.add(NodeKind::Gain {
            automation: Vec::new(),
        })
    }

    fn set_value_at(&mut self, node: NodeId, value: f64, at: f64) {
        push_automation(&self.graph, node, Automation::Set { value, at });
    }

    fn schedule_linear_ramp(&mut self, node: NodeId, target: f64, at: f64) {
        push_automation(&self.graph, node, Automation::Ramp { target, at });
    }

    fn connect(&mut self, from: NodeId, to: NodeId) {
        if let Some(node) = self.graph.borrow_mut().nodes.get_mut(from.0) {
            node.outputs.push(to);
        }
    }

    fn start(&mut self, node: NodeId, at: f64) {
        if let Some(node) = self.graph.borrow_mut().nodes.get_mut(node.0) {
            node.start = Some(at);
        }
    }

    fn stop(&mut self, node: NodeId, at: f64) {
        if let Some(node) = self.graph.borrow_mut().nodes.get_mut(node.0) {
            node.stop = Some(at);
        }
    }

    fn release(&mut self, node: NodeId) {
        if let Some(node) = self.graph.borrow_mut().nodes.get_mut(node.0) {
            node.released = true;
        }
    }
}

/// Automation stays sorted by time; equal times keep insertion order.
fn push_automation(graph: &Rc<RefCell<Graph>>, node: NodeId, event: Automation) {
    let mut graph = graph.borrow_mut();
    if let Some(Node {
        kind: NodeKind::Gain { automation },
        ..
    }) = graph.nodes.get_mut(node.0)
    {
        let pos = automation.partition_point(|e| e.time() <= event.time());
        automation.insert(pos, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn tone(mixer: &mut OfflineMixer, start: f64, stop: f64) -> NodeId {
        let osc = mixer.create_oscillator(440.0, Waveform::Square);
        let gain = mixer.create_gain();
        mixer.connect(osc, gain);
        mixer.connect(gain, mixer.destination());
        mixer.start(osc, start);
        mixer.stop(osc, stop);
        gain
    }

    #[test]
    fn unautomated_gain_is_unity() {
        let mut mixer = OfflineMixer::new();
        let gain = mixer.create_gain();
        assert_approx_eq!(mixer.gain_at(gain, 3.0), 1.0);
    }

    #[test]
    fn linear_ramp_interpolates() {
        let mut mixer = OfflineMixer::new();
        let gain = mixer.create_gain();
        mixer.set_value_at(gain, 0.0, 1.0);
        mixer.schedule_linear_ramp(gain, 0.8, 2.0);
        mixer.schedule_linear_ramp(gain, 0.0, 4.0);

        assert_approx_eq!(mixer.gain_at(gain, 0.5), 1.0);
        assert_approx_eq!(mixer.gain_at(gain, 1.0), 0.0);
        assert_approx_eq!(mixer.gain_at(gain, 1.5), 0.4);
        assert_approx_eq!(mixer.gain_at(gain, 2.0), 0.8);
        assert_approx_eq!(mixer.gain_at(gain, 3.0), 0.4);
        assert_approx_eq!(mixer.gain_at(gain, 5.0), 0.0);
    }

    #[test]
    fn tones_report_schedule() {
        let mut mixer = OfflineMixer::new();
        tone(&mut mixer, 0.5, 1.5);
        let tones = mixer.tones();
        assert_eq!(tones.len(), 1);
        assert_approx_eq!(tones[0].start, 0.5);
        assert_approx_eq!(tones[0].stop, 1.5);
        assert_approx_eq!(mixer.end_time(), 1.5);
    }

    #[test]
    fn render_is_silent_outside_tone() {
        let mut mixer = OfflineMixer::new();
        tone(&mut mixer, 0.5, 1.0);
        let samples = mixer.render(1000, 2.0);
        assert_eq!(samples.len(), 2000);
        assert!(samples[..500].iter().all(|s| *s == 0.0));
        assert!(samples[1000..].iter().all(|s| *s == 0.0));
        assert!(samples[500..1000].iter().any(|s| s.abs() > 0.5));
    }

    #[test]
    fn render_respects_ceiling() {
        let mut mixer = OfflineMixer::new();
        tone(&mut mixer, 0.0, 1.0);
        tone(&mut mixer, 0.0, 1.0);
        let samples = mixer.render(1000, 1.0);
        assert!(samples.iter().all(|s| s.abs() <= CEILING));
    }

    #[test]
    fn release_tracks_live_nodes() {
        let mut mixer = OfflineMixer::new();
        let gain = tone(&mut mixer, 0.0, 1.0);
        assert_eq!(mixer.live_nodes(), 2);
        mixer.release(gain);
        assert_eq!(mixer.live_nodes(), 1);
    }

    #[test]
    fn clones_share_graph() {
        let mixer = OfflineMixer::new();
        let mut handle = mixer.clone();
        tone(&mut handle, 0.0, 0.25);
        assert_eq!(mixer.tones().len(), 1);
    }

    #[test]
    fn write_wav_round_trip_length() {
        let mut mixer = OfflineMixer::new();
        tone(&mut mixer, 0.0, 0.1);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        mixer.write_wav(&path, 8000, 0.25).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 8000);
        assert_eq!(reader.len(), 2000);
    }
}
