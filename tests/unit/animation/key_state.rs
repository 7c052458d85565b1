use super::*;
use crate::score::timeline::{Tempo, TimelineMode};

fn on(time: f64, note: u8) -> NoteEvent {
    NoteEvent {
        time,
        note,
        kind: NoteKind::On,
    }
}

fn off(time: f64, note: u8) -> NoteEvent {
    NoteEvent {
        time,
        note,
        kind: NoteKind::Off,
    }
}

fn timeline(events: Vec<NoteEvent>, mode: TimelineMode) -> Timeline {
    Timeline::from_events(events, Tempo::new(120.0).unwrap(), mode).unwrap()
}

fn frames(n: usize) -> impl Fn(u8) -> usize {
    move |_| n
}

#[test]
fn keys_start_idle() {
    let tl = timeline(vec![on(1.0, 60)], TimelineMode::OneShot);
    let sim = Simulation::new(&tl);
    assert!(!sim.is_playing(60));
    assert_eq!(sim.playing_notes().count(), 0);
    assert!(!sim.is_finished());
    assert_eq!(sim.pending_events(), 1);
}

#[test]
fn only_due_events_are_applied() {
    let tl = timeline(vec![on(0.1, 60), on(0.5, 62)], TimelineMode::OneShot);
    let mut sim = Simulation::new(&tl);

    assert_eq!(sim.apply_due(0.05, frames(3)), 0);
    assert_eq!(sim.apply_due(0.1, frames(3)), 1);
    assert!(sim.is_playing(60));
    assert!(!sim.is_playing(62));
    assert_eq!(sim.apply_due(1.0, frames(3)), 1);
    assert_eq!(sim.events_applied(), 2);
}

#[test]
fn one_shot_plays_exactly_frame_count_ticks() {
    let tl = timeline(vec![on(0.0, 60)], TimelineMode::OneShot);
    let mut sim = Simulation::new(&tl);
    sim.apply_due(0.0, frames(4));

    let mut drawn = Vec::new();
    for _ in 0..6 {
        drawn.push(sim.state(60).frame_index());
        sim.advance(frames(4));
    }
    assert_eq!(drawn, vec![Some(0), Some(1), Some(2), Some(3), None, None]);
    assert!(sim.is_finished());
}

#[test]
fn retrigger_restarts_at_frame_zero() {
    let tl = timeline(vec![on(0.0, 60), on(0.2, 60)], TimelineMode::OneShot);
    let mut sim = Simulation::new(&tl);

    sim.apply_due(0.0, frames(10));
    sim.advance(frames(10));
    sim.advance(frames(10));
    assert_eq!(sim.state(60).frame_index(), Some(2));

    sim.apply_due(0.2, frames(10));
    assert_eq!(sim.state(60).frame_index(), Some(0));
}

#[test]
fn note_off_stops_a_sounding_key() {
    let tl = timeline(vec![on(0.0, 60), off(0.1, 60)], TimelineMode::Sounding);
    let mut sim = Simulation::new(&tl);

    sim.apply_due(0.0, frames(10));
    sim.advance(frames(10));
    assert!(sim.is_playing(60));
    sim.apply_due(0.1, frames(10));
    assert_eq!(sim.state(60), KeyAnimationState::Idle);
}

#[test]
fn zero_frame_animation_never_plays() {
    let tl = timeline(vec![on(0.0, 60)], TimelineMode::OneShot);
    let mut sim = Simulation::new(&tl);

    assert_eq!(sim.apply_due(0.0, frames(0)), 1);
    assert!(!sim.is_playing(60));
    assert!(sim.is_finished());
}

#[test]
fn frame_counts_are_per_note() {
    let tl = timeline(vec![on(0.0, 60), on(0.0, 61)], TimelineMode::OneShot);
    let mut sim = Simulation::new(&tl);
    let counts = |note: u8| if note == 61 { 1 } else { 3 };

    sim.apply_due(0.0, counts);
    assert_eq!(
        sim.playing_notes().collect::<Vec<_>>(),
        vec![(60, 0), (61, 0)]
    );
    sim.advance(counts);
    assert_eq!(sim.playing_notes().collect::<Vec<_>>(), vec![(60, 1)]);
}

#[test]
fn out_of_range_queries_are_idle() {
    let tl = timeline(Vec::new(), TimelineMode::OneShot);
    let sim = Simulation::new(&tl);
    assert_eq!(sim.state(0), KeyAnimationState::Idle);
    assert_eq!(sim.state(127), KeyAnimationState::Idle);
    assert!(sim.is_finished());
}
