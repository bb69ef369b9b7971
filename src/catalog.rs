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
//! Catalog sounds as fetched by the catalog client.
//!
//! The client itself lives outside this crate. It leaves its results on disk
//! as JSON or YAML, either a bare list of sounds or a page object with a
//! `results` list, and this module reads them back in fetch order.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

/// Errors reading fetched catalog results.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unable to read catalog file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("unable to parse catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unable to parse catalog YAML: {0}")]
    Yaml(#[from] serde_yml::Error),
}

/// Onset analysis for a sound. The catalog reports either a single onset or
/// a list of them.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum OnsetTimes {
    Single(f64),
    Many(Vec<f64>),
}

/// A sound as returned by the catalog.
#[derive(Deserialize, Clone, Debug)]
pub struct CatalogSound {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: String,
    pub duration: f64,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub preview_url: String,
    #[serde(rename = "type", default = "default_file_type")]
    pub file_type: String,
    #[serde(default)]
    pub filesize: u64,
    #[serde(default)]
    pub onset_times: Option<OnsetTimes>,
}

fn default_file_type() -> String {
    "wav".to_string()
}

impl CatalogSound {
    /// The effective start time of the sound, the first detected onset or 0.
    pub fn start_time(&self) -> f64 {
        match &self.onset_times {
            Some(OnsetTimes::Single(onset)) => *onset,
            Some(OnsetTimes::Many(onsets)) => onsets.first().copied().unwrap_or(0.0),
            None => 0.0,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Page { results: Vec<CatalogSound> },
    List(Vec<CatalogSound>),
}

impl From<CatalogFile> for Vec<CatalogSound> {
    fn from(file: CatalogFile) -> Self {
        match file {
            CatalogFile::Page { results } => results,
            CatalogFile::List(sounds) => sounds,
        }
    }
}

/// Parses catalog results from a JSON string.
pub fn from_json(contents: &str) -> Result<Vec<CatalogSound>, CatalogError> {
    Ok(serde_json::from_str::<CatalogFile>(contents)?.into())
}

/// Parses catalog results from a YAML string.
pub fn from_yaml(contents: &str) -> Result<Vec<CatalogSound>, CatalogError> {
    Ok(serde_yml::from_str::<CatalogFile>(contents)?.into())
}

/// Loads catalog results from a file. Files ending in `.yaml` or `.yml` are
/// read as YAML, everything else as JSON.
pub fn load(path: &Path) -> Result<Vec<CatalogSound>, CatalogError> {
    let contents = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let extension = path.extension();
    let sounds = if extension.is_some_and(|ext| ext == "yaml" || ext == "yml") {
        from_yaml(&contents)?
    } else {
        from_json(&contents)?
    };

    info!(path = ?path, count = sounds.len(), "Loaded catalog sounds");
    Ok(sounds)
}

#[cfg(test)]
mod test {
    use std::{error::Error, fs};

    use super::{from_json, from_yaml, load, OnsetTimes};

    #[test]
    fn bare_list() -> Result<(), Box<dyn Error>> {
        let sounds = from_json(
            r#"[
                {"id": 1, "name": "Piano C4", "tags": ["piano"], "duration": 2.0},
                {"id": 2, "name": "Piano D4", "duration": 1.5, "type": "flac"}
            ]"#,
        )?;

        assert_eq!(2, sounds.len());
        assert_eq!(1, sounds[0].id);
        assert_eq!(vec!["piano".to_string()], sounds[0].tags);
        assert_eq!("wav", sounds[0].file_type);
        assert_eq!("flac", sounds[1].file_type);
        assert!(sounds[1].tags.is_empty());
        Ok(())
    }

    #[test]
    fn results_page() -> Result<(), Box<dyn Error>> {
        let sounds = from_json(
            r#"{"count": 1, "next": null, "results": [
                {"id": 7, "name": "kick", "duration": 0.3, "onset_times": [0.01, 0.2]}
            ]}"#,
        )?;

        assert_eq!(1, sounds.len());
        assert_eq!(Some(OnsetTimes::Many(vec![0.01, 0.2])), sounds[0].onset_times);
        assert!((sounds[0].start_time() - 0.01).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn start_time_variants() -> Result<(), Box<dyn Error>> {
        let sounds = from_yaml(
            r#"
            - id: 1
              duration: 1.0
              onset_times: 0.25
            - id: 2
              duration: 1.0
              onset_times: []
            - id: 3
              duration: 1.0
            "#,
        )?;

        assert!((sounds[0].start_time() - 0.25).abs() < f64::EPSILON);
        assert_eq!(0.0, sounds[1].start_time());
        assert_eq!(0.0, sounds[2].start_time());
        assert!(sounds[2].onset_times.is_none());
        Ok(())
    }

    #[test]
    fn load_by_extension() -> Result<(), Box<dyn Error>> {
        let tempdir = tempfile::tempdir()?;
        let json_path = tempdir.path().join("sounds.json");
        let yaml_path = tempdir.path().join("sounds.yaml");
        fs::write(&json_path, r#"[{"id": 5, "duration": 1.0}]"#)?;
        fs::write(&yaml_path, "results:\n  - id: 6\n    duration: 1.0\n")?;

        assert_eq!(5, load(&json_path)?[0].id);
        assert_eq!(6, load(&yaml_path)?[0].id);
        assert!(load(&tempdir.path().join("missing.json")).is_err());
        Ok(())
    }
}
