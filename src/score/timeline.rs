use std::path::Path;

use anyhow::Context as _;
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};

use crate::foundation::error::{ReelError, ReelResult};
use crate::layout::keyboard::{HIGHEST_NOTE, LOWEST_NOTE};

/// Whether an event starts or ends a note.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    On,
    Off,
}

/// A note event at an absolute time in seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NoteEvent {
    pub time: f64,
    pub note: u8,
    pub kind: NoteKind,
}

/// Which note events the builder keeps.
///
/// `OneShot` drives clip-length animations and ignores note-offs entirely; `Sounding` keeps both
/// kinds so a release can stop a key early.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimelineMode {
    #[default]
    OneShot,
    Sounding,
}

/// Fixed tempo applied to the whole score.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tempo {
    bpm: f64,
}

impl Tempo {
    pub fn new(bpm: f64) -> ReelResult<Self> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(ReelError::validation(format!(
                "tempo must be finite and > 0 bpm (got {bpm})"
            )));
        }
        Ok(Self { bpm })
    }

    pub fn bpm(self) -> f64 {
        self.bpm
    }

    pub fn micros_per_beat(self) -> f64 {
        60_000_000.0 / self.bpm
    }

    /// Convert a tick count to seconds under this tempo.
    pub fn ticks_to_secs(self, ticks: u64, ticks_per_beat: u16) -> f64 {
        (ticks as f64) * (self.micros_per_beat() / 1_000_000.0) / f64::from(ticks_per_beat)
    }
}

/// Ordered note events of a score under one fixed tempo.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Timeline {
    events: Vec<NoteEvent>,
    total_duration: f64,
    tempo: Tempo,
    mode: TimelineMode,
    ticks_per_beat: u16,
    ignored_tempo_changes: usize,
    dropped_out_of_range: usize,
}

impl Timeline {
    /// Read and parse a Standard MIDI File.
    #[tracing::instrument(skip(tempo))]
    pub fn from_path(path: &Path, tempo: Tempo, mode: TimelineMode) -> ReelResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read score '{}'", path.display()))?;
        Self::from_bytes(&bytes, tempo, mode)
            .map_err(|e| ReelError::score(format!("'{}': {e}", path.display())))
    }

    /// Parse a Standard MIDI File held in memory.
    pub fn from_bytes(bytes: &[u8], tempo: Tempo, mode: TimelineMode) -> ReelResult<Self> {
        let smf = Smf::parse(bytes).map_err(|e| ReelError::score(format!("invalid MIDI: {e}")))?;
        Self::from_smf(&smf, tempo, mode)
    }

    pub fn from_smf(smf: &Smf<'_>, tempo: Tempo, mode: TimelineMode) -> ReelResult<Self> {
        let ticks_per_beat = match smf.header.timing {
            Timing::Metrical(tpb) => tpb.as_int(),
            Timing::Timecode(..) => {
                return Err(ReelError::score(
                    "SMPTE timecode division is not supported (ticks-per-beat required)",
                ));
            }
        };
        if ticks_per_beat == 0 {
            return Err(ReelError::score("ticks-per-beat must be non-zero"));
        }

        let mut events = Vec::new();
        let mut ignored_tempo_changes = 0usize;
        let mut dropped_out_of_range = 0usize;

        for (tick, kind) in merge_tracks(&smf.tracks) {
            let (note, kind) = match kind {
                TrackEventKind::Midi { message, .. } => match *message {
                    MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                        (key.as_int(), NoteKind::On)
                    }
                    MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                        (key.as_int(), NoteKind::Off)
                    }
                    _ => continue,
                },
                TrackEventKind::Meta(MetaMessage::Tempo(_)) => {
                    ignored_tempo_changes += 1;
                    continue;
                }
                _ => continue,
            };

            if kind == NoteKind::Off && mode == TimelineMode::OneShot {
                continue;
            }
            if !(LOWEST_NOTE..=HIGHEST_NOTE).contains(&note) {
                dropped_out_of_range += 1;
                continue;
            }

            events.push(NoteEvent {
                time: tempo.ticks_to_secs(tick, ticks_per_beat),
                note,
                kind,
            });
        }

        let total_duration = events.last().map_or(0.0, |e| e.time);
        if ignored_tempo_changes > 0 {
            tracing::debug!(
                ignored_tempo_changes,
                bpm = tempo.bpm(),
                "score tempo changes ignored in favour of fixed tempo"
            );
        }
        if dropped_out_of_range > 0 {
            tracing::debug!(dropped_out_of_range, "notes outside the 88-key range dropped");
        }

        Ok(Self {
            events,
            total_duration,
            tempo,
            mode,
            ticks_per_beat,
            ignored_tempo_changes,
            dropped_out_of_range,
        })
    }

    /// Build a timeline from already-timed events (e.g. generated programmatically).
    ///
    /// Events are stably sorted by time. In one-shot mode note-offs are discarded. Out-of-range
    /// notes and negative or non-finite times are rejected.
    pub fn from_events(
        mut events: Vec<NoteEvent>,
        tempo: Tempo,
        mode: TimelineMode,
    ) -> ReelResult<Self> {
        if let Some(bad) = events
            .iter()
            .find(|e| !(LOWEST_NOTE..=HIGHEST_NOTE).contains(&e.note))
        {
            return Err(ReelError::validation(format!(
                "note {} is outside {LOWEST_NOTE}..={HIGHEST_NOTE}",
                bad.note
            )));
        }
        if let Some(bad) = events.iter().find(|e| !e.time.is_finite() || e.time < 0.0) {
            return Err(ReelError::validation(format!(
                "event time must be finite and >= 0 (got {})",
                bad.time
            )));
        }

        if mode == TimelineMode::OneShot {
            events.retain(|e| e.kind == NoteKind::On);
        }
        events.sort_by(|a, b| a.time.total_cmp(&b.time));
        let total_duration = events.last().map_or(0.0, |e| e.time);

        Ok(Self {
            events,
            total_duration,
            tempo,
            mode,
            ticks_per_beat: 0,
            ignored_tempo_changes: 0,
            dropped_out_of_range: 0,
        })
    }

    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Time of the last event in seconds (0 for an empty timeline).
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn mode(&self) -> TimelineMode {
        self.mode
    }

    pub fn ticks_per_beat(&self) -> u16 {
        self.ticks_per_beat
    }

    /// Number of tempo meta events present in the score (never applied).
    pub fn ignored_tempo_changes(&self) -> usize {
        self.ignored_tempo_changes
    }

    /// Note events outside the 88-key range that were left out.
    pub fn dropped_out_of_range(&self) -> usize {
        self.dropped_out_of_range
    }
}

/// Flatten all tracks into `(absolute_tick, event)` ordered by tick.
///
/// The sort is stable over a track-ordered concatenation, so equal ticks keep track order and
/// then in-track order.
fn merge_tracks<'a, 'b>(tracks: &'a [Vec<TrackEvent<'b>>]) -> Vec<(u64, &'a TrackEventKind<'b>)> {
    let mut merged = Vec::with_capacity(tracks.iter().map(Vec::len).sum());
    for track in tracks {
        let mut tick = 0u64;
        for ev in track {
            tick += u64::from(ev.delta.as_int());
            merged.push((tick, &ev.kind));
        }
    }
    merged.sort_by_key(|(tick, _)| *tick);
    merged
}

#[cfg(test)]
#[path = "../../tests/unit/score/timeline.rs"]
mod tests;
