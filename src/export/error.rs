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

/// Error types for preset serialization.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("sound {id} has no key range")]
    MissingRange { id: u64 },

    #[error("sound {id} has no MIDI note")]
    MissingNote { id: u64 },

    #[error("pad {index} has no MIDI note")]
    PadOutOfRange { index: usize },

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("serialized preset is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
