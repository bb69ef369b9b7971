// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
//! Pad selection for grid presets.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use tracing::{info, warn};

use super::error::MappingError;
use crate::config::PadConfig;
use crate::sound::{Pad, SoundRecord, MAX_PADS};

/// Which kind of grid preset is being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKind {
    /// Short one-shot sounds.
    Pads,
    /// Longer sounds meant to loop.
    Loops,
}

impl GridKind {
    /// The longest sound allowed on a pad of this kind.
    pub fn max_duration(&self, config: &PadConfig) -> f64 {
        match self {
            GridKind::Pads => config.max_pad_duration,
            GridKind::Loops => config.max_loop_duration,
        }
    }
}

/// The grid position of the pad with the given index, if its row fits.
pub fn pad_position(index: usize, columns: u8) -> Option<Pad> {
    let columns = usize::from(columns.max(1));
    Some(Pad {
        row: u8::try_from(index / columns).ok()?,
        column: u8::try_from(index % columns).ok()?,
    })
}

/// Picks sounds for the pads at random among the candidates that have an
/// onset estimate and are short enough, and lays them out row by row.
///
/// A configured seed makes the choice reproducible. Asking for more pads
/// than there are notes for them is an error.
pub fn select_pads(
    records: &[SoundRecord],
    config: &PadConfig,
    kind: GridKind,
) -> Result<Vec<SoundRecord>, MappingError> {
    if config.count > MAX_PADS {
        return Err(MappingError::TooManyPads {
            count: config.count,
            max: MAX_PADS,
        });
    }

    let max_duration = kind.max_duration(config);
    let candidates: Vec<&SoundRecord> = records
        .iter()
        .filter(|record| record.has_onset && record.duration_seconds <= max_duration)
        .collect();

    let amount = config.count.min(candidates.len());
    if amount < config.count {
        warn!(
            wanted = config.count,
            found = candidates.len(),
            "Not enough candidate sounds to fill every pad"
        );
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let chosen = index::sample(&mut rng, candidates.len(), amount);

    info!(pads = amount, kind = ?kind, "Selected pad sounds");
    chosen
        .into_iter()
        .enumerate()
        .map(|(pad, candidate)| {
            let position =
                pad_position(pad, config.columns).ok_or(MappingError::PadOutOfRange { index: pad })?;
            Ok(SoundRecord {
                pad: Some(position),
                velocity_layer: 0,
                ..candidates[candidate].clone()
            })
        })
        .collect()
}
