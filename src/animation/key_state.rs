use crate::layout::keyboard::{HIGHEST_NOTE, KEY_COUNT, LOWEST_NOTE};
use crate::score::timeline::{NoteEvent, NoteKind, Timeline};

/// Per-key playback state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyAnimationState {
    #[default]
    Idle,
    /// Next frame to draw is `frame_index`.
    Playing { frame_index: usize },
}

impl KeyAnimationState {
    pub fn is_playing(self) -> bool {
        matches!(self, Self::Playing { .. })
    }

    pub fn frame_index(self) -> Option<usize> {
        match self {
            Self::Idle => None,
            Self::Playing { frame_index } => Some(frame_index),
        }
    }
}

fn slot(note: u8) -> Option<usize> {
    (LOWEST_NOTE..=HIGHEST_NOTE)
        .contains(&note)
        .then(|| usize::from(note - LOWEST_NOTE))
}

/// Run context of one render: every key's state plus the position in the event list.
///
/// `frame_count` callbacks map a note to the length of the animation bound to it.
#[derive(Clone, Debug)]
pub struct Simulation<'t> {
    events: &'t [NoteEvent],
    cursor: usize,
    states: [KeyAnimationState; KEY_COUNT],
    events_applied: usize,
}

impl<'t> Simulation<'t> {
    /// Start with every key idle and the cursor on the first event.
    pub fn new(timeline: &'t Timeline) -> Self {
        Self {
            events: timeline.events(),
            cursor: 0,
            states: [KeyAnimationState::Idle; KEY_COUNT],
            events_applied: 0,
        }
    }

    /// Apply every pending event with `time <= t`, in timeline order.
    ///
    /// A note-on restarts the key at frame 0, or leaves it idle when its animation has no frames.
    /// Returns how many events were applied.
    pub fn apply_due(&mut self, t: f64, frame_count: impl Fn(u8) -> usize) -> usize {
        let start = self.cursor;
        while let Some(ev) = self.events.get(self.cursor) {
            if ev.time > t {
                break;
            }
            self.cursor += 1;
            let Some(i) = slot(ev.note) else {
                continue;
            };
            self.states[i] = match ev.kind {
                NoteKind::On if frame_count(ev.note) > 0 => {
                    KeyAnimationState::Playing { frame_index: 0 }
                }
                NoteKind::On | NoteKind::Off => KeyAnimationState::Idle,
            };
        }
        let applied = self.cursor - start;
        self.events_applied += applied;
        applied
    }

    /// Step every playing key to its next frame; keys that run past their last frame go idle.
    pub fn advance(&mut self, frame_count: impl Fn(u8) -> usize) {
        for (i, state) in self.states.iter_mut().enumerate() {
            if let KeyAnimationState::Playing { frame_index } = *state {
                let note = LOWEST_NOTE + i as u8;
                let next = frame_index + 1;
                *state = if next >= frame_count(note) {
                    KeyAnimationState::Idle
                } else {
                    KeyAnimationState::Playing { frame_index: next }
                };
            }
        }
    }

    pub fn state(&self, note: u8) -> KeyAnimationState {
        slot(note).map_or(KeyAnimationState::Idle, |i| self.states[i])
    }

    pub fn is_playing(&self, note: u8) -> bool {
        self.state(note).is_playing()
    }

    /// `(note, frame_index)` for every playing key, ascending by note.
    pub fn playing_notes(&self) -> impl Iterator<Item = (u8, usize)> + '_ {
        self.states.iter().enumerate().filter_map(|(i, s)| {
            s.frame_index()
                .map(|frame_index| (LOWEST_NOTE + i as u8, frame_index))
        })
    }

    /// All events consumed and no key still animating.
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.events.len() && !self.states.iter().any(|s| s.is_playing())
    }

    pub fn events_applied(&self) -> usize {
        self.events_applied
    }

    pub fn pending_events(&self) -> usize {
        self.events.len() - self.cursor
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/key_state.rs"]
mod tests;
