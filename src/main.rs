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
use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{crate_version, Args, Parser, Subcommand};
use samplepresets::catalog;
use samplepresets::config::PresetConfig;
use samplepresets::export::{self, Device};
use samplepresets::mapping;
use samplepresets::notes::parse_note_name;
use samplepresets::preset::{ParamValue, Preset, PresetType, SoundOverrides};
use samplepresets::sound::SoundRecord;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Builds sampler presets from catalog sounds."
)]
struct Cli {
    /// Logs every pipeline step.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Spreads the sounds over the keyboard by pitch and velocity.
    Instrument(PresetArgs),
    /// Puts short one-shot sounds on a pad grid.
    Pads(PresetArgs),
    /// Puts loops on a pad grid.
    Loops(PresetArgs),
    /// Prints the note and velocity each catalog sound resolves to.
    Notes {
        /// The fetched catalog results, as JSON or YAML.
        catalog: PathBuf,
        /// The path to the preset config.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Prints the MIDI note number of a note name such as C#4.
    Note {
        /// The note name.
        name: String,
    },
}

#[derive(Args)]
struct PresetArgs {
    /// The fetched catalog results, as JSON or YAML.
    catalog: PathBuf,
    /// The name of the preset.
    name: String,
    /// The device to write the preset for.
    #[arg(short, long, value_enum, default_value_t = Device::Source)]
    device: Device,
    /// The path to the preset config.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// The directory presets are written under.
    #[arg(short, long, default_value = ".")]
    out: PathBuf,
    /// Makes sounds loop while their pad or key is held.
    #[arg(long = "loop")]
    looping: bool,
    /// The most sounds the device can hold.
    #[arg(long)]
    max_slots: Option<usize>,
    /// The most velocity layers to keep.
    #[arg(long)]
    max_layers: Option<usize>,
    /// Seeds the pad selection so it can be reproduced.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    match cli.command {
        Commands::Instrument(args) => build(PresetType::Instrument, args),
        Commands::Pads(args) => build(PresetType::Pads, args),
        Commands::Loops(args) => build(PresetType::Loops, args),
        Commands::Notes { catalog, config } => {
            let config = load_config(config.as_deref())?;
            let records = load_records(&catalog, &config)?;

            let extracted = mapping::extract_notes(&records, &config);
            if extracted.is_empty() {
                println!("No sounds with a MIDI note found in {}.", catalog.display());
                return Ok(());
            }

            println!("Sounds (count: {} of {}):", extracted.len(), records.len());
            for record in extracted.iter() {
                println!("- {}", record);
            }
            Ok(())
        }
        Commands::Note { name } => {
            println!("{} = {}", name, parse_note_name(&name)?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<PresetConfig, Box<dyn Error>> {
    match path {
        Some(path) => Ok(PresetConfig::deserialize(path)?),
        None => Ok(PresetConfig::default()),
    }
}

fn load_records(path: &Path, config: &PresetConfig) -> Result<Vec<SoundRecord>, Box<dyn Error>> {
    let sounds = catalog::load(path)?;
    info!(path = ?path, sounds = sounds.len(), "Loaded catalog");
    Ok(sounds
        .iter()
        .map(|sound| SoundRecord::from_catalog(sound, config.audio_source()))
        .collect())
}

/// The device parameters that make sounds loop, or not. Blackbox loop
/// settings only apply to loop presets.
fn loop_overrides(device: Device, preset_type: PresetType, looping: bool) -> Option<SoundOverrides> {
    match device {
        Device::Source => Some(SoundOverrides::from([(
            "launchMode".to_string(),
            ParamValue::Int(i64::from(looping)),
        )])),
        Device::Blackbox if preset_type == PresetType::Loops => Some(SoundOverrides::from([
            ("type".to_string(), ParamValue::from("sample")),
            ("samtrigtype".to_string(), ParamValue::Int(2)),
            ("loopmode".to_string(), ParamValue::Int(1)),
            ("cellmode".to_string(), ParamValue::Int(1)),
        ])),
        Device::Blackbox => None,
    }
}

fn build(preset_type: PresetType, args: PresetArgs) -> Result<(), Box<dyn Error>> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(max_slots) = args.max_slots {
        config = config.with_max_slots(max_slots);
    }
    if let Some(max_layers) = args.max_layers {
        config = config.with_max_velocity_layers(max_layers);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    info!(name = %args.name, preset_type = %preset_type, "Creating preset");
    let records = load_records(&args.catalog, &config)?;
    let mut preset = Preset::build(&args.name, preset_type, &records, &config)?;
    if let Some(overrides) = loop_overrides(args.device, preset_type, args.looping) {
        preset = preset.with_uniform_overrides(overrides);
    }

    println!("{}", preset.report());
    match export::write(&preset, args.device, &args.out)? {
        Some(path) => println!("Wrote {}", path.display()),
        None => println!("No sounds left to put in {}.", preset.name()),
    }
    Ok(())
}
