use std::collections::BTreeMap;
use std::sync::Arc;

use crate::assets::bank::{AssetSource, FrameBank, LoadOpts};
use crate::foundation::error::{ReelError, ReelResult};
use crate::layout::keyboard::{HIGHEST_NOTE, LOWEST_NOTE, is_black_key};

/// Sources for every key: one per color plus optional per-note overrides.
#[derive(Clone, Debug)]
pub struct KeyAssetSources {
    pub white: AssetSource,
    pub black: AssetSource,
    pub overrides: BTreeMap<u8, AssetSource>,
}

/// Loaded frame banks bound to keys.
#[derive(Clone, Debug)]
pub struct KeyAssets {
    white: Arc<FrameBank>,
    black: Arc<FrameBank>,
    overrides: BTreeMap<u8, Arc<FrameBank>>,
}

impl KeyAssets {
    /// Share one bank across all white keys and one across all black keys, with no overrides.
    pub fn new(white: FrameBank, black: FrameBank) -> Self {
        Self {
            white: Arc::new(white),
            black: Arc::new(black),
            overrides: BTreeMap::new(),
        }
    }

    /// Bind `bank` to a single note instead of its color's default.
    pub fn with_override(mut self, note: u8, bank: FrameBank) -> ReelResult<Self> {
        check_note(note)?;
        self.overrides.insert(note, Arc::new(bank));
        Ok(self)
    }

    /// Decode every source. Identical override sources are decoded once.
    #[tracing::instrument(skip_all)]
    pub fn load(sources: &KeyAssetSources, opts: &LoadOpts) -> ReelResult<Self> {
        for &note in sources.overrides.keys() {
            check_note(note)?;
        }

        let white = Arc::new(FrameBank::load(&sources.white, opts)?);
        let black = if sources.black == sources.white {
            Arc::clone(&white)
        } else {
            Arc::new(FrameBank::load(&sources.black, opts)?)
        };

        let mut loaded: Vec<(&AssetSource, Arc<FrameBank>)> = vec![
            (&sources.white, Arc::clone(&white)),
            (&sources.black, Arc::clone(&black)),
        ];
        let mut overrides = BTreeMap::new();
        for (&note, src) in &sources.overrides {
            let bank = match loaded.iter().find(|(s, _)| *s == src) {
                Some((_, bank)) => Arc::clone(bank),
                None => {
                    let bank = Arc::new(FrameBank::load(src, opts)?);
                    loaded.push((src, Arc::clone(&bank)));
                    bank
                }
            };
            overrides.insert(note, bank);
        }

        tracing::info!(
            white_frames = white.frame_count(),
            black_frames = black.frame_count(),
            overrides = overrides.len(),
            "key assets ready"
        );
        Ok(Self {
            white,
            black,
            overrides,
        })
    }

    /// The override for `note` if any, otherwise the bank for its key color.
    pub fn bank_for(&self, note: u8) -> &FrameBank {
        if let Some(bank) = self.overrides.get(&note) {
            return bank;
        }
        if is_black_key(note) {
            &self.black
        } else {
            &self.white
        }
    }

    pub fn frame_count(&self, note: u8) -> usize {
        self.bank_for(note).frame_count()
    }
}

fn check_note(note: u8) -> ReelResult<()> {
    if !(LOWEST_NOTE..=HIGHEST_NOTE).contains(&note) {
        return Err(ReelError::validation(format!(
            "override note {note} is outside {LOWEST_NOTE}..={HIGHEST_NOTE}"
        )));
    }
    Ok(())
}
