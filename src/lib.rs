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
//! Builds sampler presets from catalog sounds.
//!
//! Sounds are annotated with the MIDI note and velocity they were recorded
//! at, reduced to what a device can hold and spread over the keyboard or a
//! pad grid before being written out in a device's preset format.

pub mod catalog;
pub mod config;
pub mod export;
pub mod mapping;
pub mod notes;
pub mod preset;
pub mod sound;
#[cfg(test)]
mod testutil;
