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
//! Velocity layer reduction.
//!
//! Devices can only hold a few velocity layers, so when more distinct
//! velocities were recorded only the loudest ones are kept.

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use crate::sound::SoundRecord;

/// Maps recorded velocities to zero-based layer indices.
/// A missing velocity, or a velocity of 0, is always layer 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VelocityLayerMap {
    layers: BTreeMap<u8, u8>,
}

impl VelocityLayerMap {
    /// Builds the map from the surviving velocities, lowest first.
    fn from_velocities(velocities: impl IntoIterator<Item = u8>) -> VelocityLayerMap {
        let ordered: BTreeSet<u8> = velocities.into_iter().filter(|v| *v != 0).collect();
        VelocityLayerMap {
            layers: ordered
                .into_iter()
                .enumerate()
                .map(|(layer, velocity)| (velocity, layer as u8))
                .collect(),
        }
    }

    /// The layer for a velocity. Unknown velocities fall into layer 0.
    pub fn layer(&self, velocity: Option<u8>) -> u8 {
        velocity
            .and_then(|velocity| self.layers.get(&velocity).copied())
            .unwrap_or(0)
    }

    /// The number of layers in use, never less than one.
    pub fn count(&self) -> usize {
        self.layers.len().max(1)
    }

    /// The velocities that own a layer, in layer order.
    pub fn velocities(&self) -> impl Iterator<Item = u8> + '_ {
        self.layers.keys().copied()
    }
}

/// The outcome of reducing velocity layers.
#[derive(Debug, Clone)]
pub struct LayerReduction {
    pub records: Vec<SoundRecord>,
    pub layers: VelocityLayerMap,
}

/// Keeps at most `max_layers` distinct velocities, the loudest ones, and
/// drops records whose velocity is below the cutoff. Records without a
/// velocity are always kept. Each surviving record gets its layer index.
///
/// A `max_layers` of 0 is treated as 1.
pub fn reduce_layers(records: &[SoundRecord], max_layers: usize) -> LayerReduction {
    let distinct: BTreeSet<u8> = records.iter().map(SoundRecord::velocity_or_zero).collect();

    let (kept, surviving): (Vec<SoundRecord>, Vec<u8>) = if distinct.len() <= 1 {
        (records.to_vec(), distinct.into_iter().collect())
    } else {
        let ranked: Vec<u8> = distinct.into_iter().collect();
        let cutoff = ranked[ranked.len().saturating_sub(max_layers.max(1))];
        let kept = records
            .iter()
            .filter(|record| record.midi_velocity.map_or(true, |v| v >= cutoff))
            .cloned()
            .collect();
        (kept, ranked.into_iter().filter(|v| *v >= cutoff).collect())
    };

    let layers = VelocityLayerMap::from_velocities(surviving);
    info!(
        layers = layers.count(),
        dropped = records.len() - kept.len(),
        "Will use {} velocity layers",
        layers.count()
    );

    let records = kept
        .into_iter()
        .map(|record| SoundRecord {
            velocity_layer: layers.layer(record.midi_velocity),
            ..record
        })
        .collect();

    LayerReduction { records, layers }
}
