//! Song playback end to end: scripts schedule notes on an offline mixer and
//! time passes on the virtual clock.

use assert_approx_eq::assert_approx_eq;

use oneshot::audio::{OfflineMixer, Waveform};
use oneshot::host::CapturedConsole;
use oneshot::Interpreter;

fn song(sheets: &[&str], extra: &str) -> String {
    let mut source = format!("SONG tune\n{extra}\n");
    for bar in sheets {
        source.push_str(&format!("SHEET\nBAR \"{bar}\"\nEND\n"));
    }
    source.push_str("END\n");
    source
}

fn interpreter(mixer: &OfflineMixer) -> (Interpreter, CapturedConsole) {
    let console = CapturedConsole::new();
    let interp = Interpreter::builder()
        .audio(mixer.clone())
        .console(console.clone())
        .build();
    (interp, console)
}

#[test]
fn play_returns_immediately() {
    let mixer = OfflineMixer::new();
    let (mut interp, console) = interpreter(&mixer);
    interp
        .run(&format!("{}PLAY tune\nPRINT \"after\"", song(&["A4 C5"], "")))
        .unwrap();

    assert_eq!(console.printed(), vec!["after"]);
    assert_approx_eq!(interp.now(), 0.0);
    let tones = mixer.tones();
    assert_eq!(tones.len(), 1);
    assert_approx_eq!(tones[0].frequency, 440.0);
    assert_approx_eq!(tones[0].start, 0.0);
    assert_approx_eq!(tones[0].stop, 1.0);
}

#[test]
fn drain_finishes_the_song() {
    let mixer = OfflineMixer::new();
    let (mut interp, _) = interpreter(&mixer);
    interp
        .run(&format!("{}PLAY tune", song(&["A4 C5"], "")))
        .unwrap();

    assert!(interp.drain(10_000));
    let tones = mixer.tones();
    assert_eq!(tones.len(), 2);
    assert_approx_eq!(tones[1].start, 1.1);
    assert_approx_eq!(tones[1].frequency, 523.251, 1e-2);
    assert_eq!(mixer.live_nodes(), 1, "only the song bus remains");
}

#[test]
fn sleep_lets_background_playback_advance() {
    let mixer = OfflineMixer::new();
    let (mut interp, _) = interpreter(&mixer);
    interp
        .run(&format!("{}PLAY tune\nSLEEP 1500", song(&["A4 C5 E5"], "")))
        .unwrap();

    assert_approx_eq!(interp.now(), 1.5);
    assert_eq!(mixer.tones().len(), 2);
}

#[test]
fn sheets_play_concurrently() {
    let mixer = OfflineMixer::new();
    let (mut interp, _) = interpreter(&mixer);
    interp
        .run(&format!("{}PLAY tune", song(&["A4", "E4"], "")))
        .unwrap();

    let tones = mixer.tones();
    assert_eq!(tones.len(), 2);
    assert_approx_eq!(tones[0].start, 0.0);
    assert_approx_eq!(tones[1].start, 0.0);
}

#[test]
fn bpm_and_holds_set_durations() {
    let mixer = OfflineMixer::new();
    let (mut interp, _) = interpreter(&mixer);
    interp
        .run(&format!("{}PLAY tune", song(&["A4 - _ . A4"], "BPM 240")))
        .unwrap();
    interp.drain(10_000);

    let tones = mixer.tones();
    assert_eq!(tones.len(), 2);
    // Three beats at half a second each.
    assert_approx_eq!(tones[0].stop, 1.5);
    // Held note, then a one-beat rest, each followed by the guard margin.
    assert_approx_eq!(tones[1].start, 1.65 + 0.55);
}

#[test]
fn stop_waits_for_the_current_note() {
    let mixer = OfflineMixer::new();
    let (mut interp, _) = interpreter(&mixer);
    let program = format!("{}PLAY tune\nSLEEP 500\nSTOP tune", song(&["A4"], "LOOP TRUE"));
    interp.run(&program).unwrap();

    assert!(interp.drain(10_000));
    let tones = mixer.tones();
    assert_eq!(tones.len(), 1);
    assert_approx_eq!(tones[0].stop, 1.0);
}

#[test]
fn looping_song_keeps_playing() {
    let mixer = OfflineMixer::new();
    let (mut interp, _) = interpreter(&mixer);
    interp
        .run(&format!("{}PLAY tune", song(&["A4"], "LOOP TRUE")))
        .unwrap();

    assert!(!interp.drain(5_000));
    let starts: Vec<f64> = mixer.tones().iter().map(|t| t.start).collect();
    assert_eq!(starts.len(), 5);
    assert_approx_eq!(starts[4], 4.4);
}

#[test]
fn invalid_pitch_stops_only_its_sheet() {
    let mixer = OfflineMixer::new();
    let (mut interp, console) = interpreter(&mixer);
    interp
        .run(&format!(
            "{}PLAY tune\nPRINT \"still running\"",
            song(&["A4 H4 A4", "C4 D4"], "")
        ))
        .unwrap();

    assert!(interp.drain(10_000));
    assert_eq!(console.printed(), vec!["still running"]);
    assert_eq!(mixer.tones().len(), 3);
}

#[test]
fn repeated_play_is_ignored() {
    let mixer = OfflineMixer::new();
    let (mut interp, _) = interpreter(&mixer);
    interp
        .run(&format!("{}PLAY tune\nPLAY tune", song(&["A4"], "")))
        .unwrap();
    assert_eq!(mixer.tones().len(), 1);
}

#[test]
fn sheet_settings_reach_the_mixer() {
    let mixer = OfflineMixer::new();
    let (mut interp, _) = interpreter(&mixer);
    let program = "SONG tune\nSHEET\nTYPE \"square\"\nGAIN 0.5\nBAR \"A4\"\nEND\nEND\nPLAY tune";
    interp.run(program).unwrap();

    let tones = mixer.tones();
    assert_eq!(tones[0].waveform, Waveform::Square);
    // Mid-note the envelope holds the sheet gain; node 3 is the note's gain.
    assert_approx_eq!(mixer.gain_at(oneshot::audio::NodeId(3), 0.5), 0.5);
}

#[test]
fn rendered_wav_has_expected_length() {
    let mixer = OfflineMixer::new();
    let (mut interp, _) = interpreter(&mixer);
    interp
        .run(&format!("{}PLAY tune", song(&["A4"], "")))
        .unwrap();
    interp.drain(10_000);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tune.wav");
    mixer.write_wav(&path, 8_000, mixer.end_time()).unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().sample_rate, 8_000);
    assert_eq!(reader.len(), 8_000);
}
