use midly::num::{u4, u7, u15, u24, u28};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};

use super::*;

fn note_on(delta: u32, key: u8, vel: u8) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(0),
            message: MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(vel),
            },
        },
    }
}

fn note_off(delta: u32, key: u8) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(0),
            message: MidiMessage::NoteOff {
                key: u7::new(key),
                vel: u7::new(64),
            },
        },
    }
}

fn tempo_change(delta: u32, micros_per_beat: u32) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(micros_per_beat))),
    }
}

fn smf(tpb: u16, tracks: Vec<Vec<TrackEvent<'static>>>) -> Smf<'static> {
    Smf {
        header: Header {
            format: Format::Parallel,
            timing: Timing::Metrical(u15::new(tpb)),
        },
        tracks,
    }
}

fn bpm(v: f64) -> Tempo {
    Tempo::new(v).unwrap()
}

#[test]
fn tempo_rejects_non_positive_and_non_finite() {
    assert!(Tempo::new(0.0).is_err());
    assert!(Tempo::new(-10.0).is_err());
    assert!(Tempo::new(f64::NAN).is_err());
    assert!(Tempo::new(f64::INFINITY).is_err());
}

#[test]
fn ticks_to_secs_uses_fixed_bpm() {
    // 120 bpm => 500_000 us per beat => one beat is half a second.
    let t = bpm(120.0);
    assert!((t.micros_per_beat() - 500_000.0).abs() < 1e-9);
    assert!((t.ticks_to_secs(480, 480) - 0.5).abs() < 1e-12);
    assert!((t.ticks_to_secs(960, 480) - 1.0).abs() < 1e-12);
}

#[test]
fn empty_score_has_zero_duration() {
    let tl = Timeline::from_smf(&smf(480, vec![vec![]]), bpm(120.0), TimelineMode::Sounding)
        .unwrap();
    assert!(tl.is_empty());
    assert_eq!(tl.total_duration(), 0.0);
}

#[test]
fn all_silent_score_in_one_shot_mode_is_empty() {
    let tracks = vec![vec![note_on(0, 60, 0), note_off(120, 62), tempo_change(10, 400_000)]];
    let tl = Timeline::from_smf(&smf(480, tracks), bpm(120.0), TimelineMode::OneShot).unwrap();
    assert!(tl.is_empty());
    assert_eq!(tl.total_duration(), 0.0);
}

#[test]
fn zero_velocity_note_on_is_a_note_off() {
    let tracks = vec![vec![note_on(0, 60, 100), note_on(480, 60, 0)]];
    let tl = Timeline::from_smf(&smf(480, tracks), bpm(120.0), TimelineMode::Sounding).unwrap();
    let kinds: Vec<_> = tl.events().iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![NoteKind::On, NoteKind::Off]);
    assert!((tl.total_duration() - 0.5).abs() < 1e-12);
}

#[test]
fn one_shot_mode_keeps_only_onsets() {
    let tracks = vec![vec![
        note_on(0, 60, 100),
        note_off(240, 60),
        note_on(240, 64, 90),
        note_off(480, 64),
    ]];
    let tl = Timeline::from_smf(&smf(480, tracks), bpm(120.0), TimelineMode::OneShot).unwrap();
    assert_eq!(tl.len(), 2);
    assert!(tl.events().iter().all(|e| e.kind == NoteKind::On));
    // Duration is the last emitted event, not the trailing note-off.
    assert!((tl.total_duration() - 0.5).abs() < 1e-12);
}

#[test]
fn tempo_meta_events_are_counted_but_never_applied() {
    let plain = vec![vec![note_on(0, 60, 100), note_on(960, 62, 100)]];
    let with_tempo = vec![vec![
        tempo_change(0, 250_000),
        note_on(0, 60, 100),
        tempo_change(480, 1_000_000),
        note_on(480, 62, 100),
    ]];

    let a = Timeline::from_smf(&smf(480, plain), bpm(120.0), TimelineMode::OneShot).unwrap();
    let b = Timeline::from_smf(&smf(480, with_tempo), bpm(120.0), TimelineMode::OneShot).unwrap();

    assert_eq!(a.events(), b.events());
    assert_eq!(b.ignored_tempo_changes(), 2);
    assert!((b.total_duration() - 1.0).abs() < 1e-12);
}

#[test]
fn merge_is_ordered_by_tick_with_track_order_tie_break() {
    let tracks = vec![
        vec![note_on(100, 60, 100), note_on(100, 61, 100)],
        vec![note_on(50, 70, 100), note_on(50, 71, 100), note_on(100, 72, 100)],
    ];
    let tl = Timeline::from_smf(&smf(480, tracks), bpm(120.0), TimelineMode::OneShot).unwrap();
    let notes: Vec<u8> = tl.events().iter().map(|e| e.note).collect();
    // ticks: 60@100, 61@200, 70@50, 71@100, 72@200
    assert_eq!(notes, vec![70, 60, 71, 61, 72]);

    for pair in tl.events().windows(2) {
        assert!(pair[0].time <= pair[1].time);
    }
}

#[test]
fn notes_outside_keyboard_range_are_dropped() {
    let tracks = vec![vec![
        note_on(0, 20, 100),
        note_on(0, 21, 100),
        note_on(0, 108, 100),
        note_on(10, 109, 100),
    ]];
    let tl = Timeline::from_smf(&smf(480, tracks), bpm(120.0), TimelineMode::OneShot).unwrap();
    let notes: Vec<u8> = tl.events().iter().map(|e| e.note).collect();
    assert_eq!(notes, vec![21, 108]);
    assert_eq!(tl.dropped_out_of_range(), 2);
    assert_eq!(tl.total_duration(), 0.0);
}

#[test]
fn smpte_timing_is_rejected() {
    let s = Smf {
        header: Header {
            format: Format::SingleTrack,
            timing: Timing::Timecode(midly::Fps::Fps25, 40),
        },
        tracks: vec![vec![note_on(0, 60, 100)]],
    };
    let err = Timeline::from_smf(&s, bpm(120.0), TimelineMode::OneShot).unwrap_err();
    assert!(err.to_string().contains("SMPTE"));
}

#[test]
fn zero_ticks_per_beat_is_rejected() {
    let err = Timeline::from_smf(
        &smf(0, vec![vec![note_on(0, 60, 100)]]),
        bpm(120.0),
        TimelineMode::OneShot,
    )
    .unwrap_err();
    assert!(matches!(err, ReelError::Score(_)));
}

#[test]
fn from_bytes_round_trips_through_smf_writer() {
    let s = smf(480, vec![vec![note_on(0, 60, 100), note_on(480, 62, 100)]]);
    let mut buf = Vec::new();
    s.write(&mut buf).unwrap();

    let tl = Timeline::from_bytes(&buf, bpm(120.0), TimelineMode::OneShot).unwrap();
    assert_eq!(tl.ticks_per_beat(), 480);
    assert_eq!(tl.len(), 2);
    assert!((tl.events()[1].time - 0.5).abs() < 1e-12);
}

#[test]
fn garbage_bytes_are_a_score_error() {
    let err = Timeline::from_bytes(b"not a midi file", bpm(120.0), TimelineMode::OneShot)
        .unwrap_err();
    assert!(matches!(err, ReelError::Score(_)));
}

#[test]
fn missing_file_reports_the_path() {
    let err = Timeline::from_path(
        std::path::Path::new("does/not/exist.mid"),
        bpm(120.0),
        TimelineMode::OneShot,
    )
    .unwrap_err();
    assert!(err.to_string().contains("does/not/exist.mid"));
}

#[test]
fn from_events_sorts_stably_and_filters_offs_in_one_shot_mode() {
    let ev = |time, note, kind| NoteEvent { time, note, kind };
    let tl = Timeline::from_events(
        vec![
            ev(1.0, 64, NoteKind::On),
            ev(0.5, 60, NoteKind::On),
            ev(0.5, 62, NoteKind::On),
            ev(0.7, 60, NoteKind::Off),
        ],
        bpm(120.0),
        TimelineMode::OneShot,
    )
    .unwrap();

    let notes: Vec<u8> = tl.events().iter().map(|e| e.note).collect();
    assert_eq!(notes, vec![60, 62, 64]);
    assert_eq!(tl.total_duration(), 1.0);
}

#[test]
fn from_events_rejects_out_of_range_notes_and_bad_times() {
    let on = |time, note| NoteEvent {
        time,
        note,
        kind: NoteKind::On,
    };
    assert!(Timeline::from_events(vec![on(0.0, 20)], bpm(120.0), TimelineMode::Sounding).is_err());
    assert!(
        Timeline::from_events(vec![on(-1.0, 60)], bpm(120.0), TimelineMode::Sounding).is_err()
    );
    assert!(
        Timeline::from_events(vec![on(f64::NAN, 60)], bpm(120.0), TimelineMode::Sounding)
            .is_err()
    );
}
