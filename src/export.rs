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
//! Preset serializers for the supported hardware formats.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Writer;
use tracing::{info, warn};

use crate::preset::{ParamValue, Preset, SoundOverrides};

mod blackbox;
mod error;
mod source;

pub use blackbox::BlackboxSerializer;
pub use error::ExportError;
pub use source::SourceSerializer;

/// A target device format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Device {
    /// The Source sampler plugin.
    Source,
    /// The 1010music Blackbox.
    Blackbox,
}

impl Device {
    /// The serializer for this device.
    pub fn serializer(&self) -> Box<dyn PresetSerializer> {
        match self {
            Device::Source => Box::new(SourceSerializer),
            Device::Blackbox => Box::new(BlackboxSerializer),
        }
    }

    /// The directory, under the output root, holding this device's presets.
    pub fn directory_name(&self) -> &'static str {
        match self {
            Device::Source => "Source",
            Device::Blackbox => "Blackbox",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.directory_name())
    }
}

/// Turns a preset into the file contents a device reads.
pub trait PresetSerializer {
    /// The device this serializer writes for.
    fn device(&self) -> Device;

    /// The preset file path relative to the device directory.
    fn file_path(&self, preset: &Preset) -> PathBuf;

    /// Serializes the preset.
    fn serialize(&self, preset: &Preset) -> Result<String, ExportError>;
}

/// Serializes the preset for the device and writes it below `output_dir`.
/// Returns the written path, or `None` when the preset has no sounds.
pub fn write(preset: &Preset, device: Device, output_dir: &Path) -> Result<Option<PathBuf>, ExportError> {
    if preset.sounds().is_empty() {
        warn!(preset = preset.name(), "No sounds to export");
        return Ok(None);
    }

    let serializer = device.serializer();
    info!(
        sounds = preset.sounds().len(),
        device = %serializer.device(),
        "Exporting preset of {} sounds",
        preset.sounds().len()
    );

    let path = output_dir
        .join(device.directory_name())
        .join(serializer.file_path(preset));
    let contents = serializer.serialize(preset)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, contents)?;

    info!(path = ?path, "Preset written");
    Ok(Some(path))
}

/// Named parameters for one sound. Overrides replace parameters of the same
/// name and add the ones that are missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Params(Vec<(String, ParamValue)>);

impl Params {
    pub(crate) fn push(&mut self, name: &str, value: impl Into<ParamValue>) {
        self.0.push((name.to_string(), value.into()));
    }

    pub(crate) fn merge(mut self, overrides: &SoundOverrides) -> Params {
        for (name, value) in overrides {
            match self.0.iter_mut().find(|(existing, _)| existing == name) {
                Some((_, current)) => *current = value.clone(),
                None => self.0.push((name.clone(), value.clone())),
            }
        }
        self
    }

    /// Removes a parameter, returning its value.
    pub(crate) fn take(&mut self, name: &str) -> Option<ParamValue> {
        let index = self.0.iter().position(|(existing, _)| existing == name)?;
        Some(self.0.remove(index).1)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &(String, ParamValue)> {
        self.0.iter()
    }
}

/// An XML writer with two space indentation.
pub(crate) struct XmlDocument {
    writer: Writer<Vec<u8>>,
}

impl XmlDocument {
    pub(crate) fn new() -> Result<XmlDocument, ExportError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(quick_xml::events::BytesDecl::new(
            "1.0",
            Some("UTF-8"),
            None,
        )))?;
        Ok(XmlDocument { writer })
    }

    pub(crate) fn start(&mut self, element: BytesStart<'_>) -> Result<(), ExportError> {
        self.writer.write_event(Event::Start(element))?;
        Ok(())
    }

    pub(crate) fn end(&mut self, name: &str) -> Result<(), ExportError> {
        self.writer
            .write_event(Event::End(quick_xml::events::BytesEnd::new(name)))?;
        Ok(())
    }

    pub(crate) fn empty(&mut self, element: BytesStart<'_>) -> Result<(), ExportError> {
        self.writer.write_event(Event::Empty(element))?;
        Ok(())
    }

    pub(crate) fn finish(self) -> Result<String, ExportError> {
        Ok(String::from_utf8(self.writer.into_inner())?)
    }
}

/// Builds an element with the given attributes.
pub(crate) fn element<'a>(name: &'a str, attributes: &[(&str, String)]) -> BytesStart<'a> {
    let mut element = BytesStart::new(name);
    for (key, value) in attributes {
        element.push_attribute((*key, value.as_str()));
    }
    element
}
