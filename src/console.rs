//! Handling the interfero CLI
//!
//! This module handles the command line parsing and turns the raw arguments into a validated
//! [`Args`] structure.
use crate::{
    config::SolverConfig,
    error::{OpticsError, OpticsResult},
    get_version,
    presets::Preset,
    scene::SceneDescription,
};
use clap::{builder::Str, Parser};
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};
use strum::IntoEnumIterator;

/// Where the scene to solve comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneSource {
    /// scene description file (`.yaml`, `.yml` or `.json`)
    File(PathBuf),
    /// built-in scene
    Preset(Preset),
}

/// Command line arguments for the interfero application.
#[derive(Debug)]
pub struct Args {
    /// scene to solve
    pub source: SceneSource,
    /// solver configuration (default if no file was given)
    pub config: SolverConfig,
    /// number of consecutive solves of the unchanged scene
    pub ticks: usize,
    /// print the connection network in Graphviz format
    pub dot: bool,
    /// log informational messages
    pub verbose: bool,
}

/// Raw command line arguments as parsed by clap.
#[derive(Parser, Debug)]
#[command(author, version = Str::from(get_version()), about, long_about = None)]
pub struct PartialArgs {
    /// scene description file (.yaml, .yml or .json)
    #[arg(short, long)]
    scene: Option<String>,

    /// name of a built-in scene
    #[arg(short, long)]
    preset: Option<String>,

    /// solver configuration file (.yaml, .yml or .json)
    #[arg(short, long)]
    config: Option<String>,

    /// number of consecutive solves (simulation ticks)
    #[arg(short, long, default_value_t = 1)]
    ticks: usize,

    /// print the connection network in Graphviz dot format
    #[arg(short, long)]
    dot: bool,

    /// log informational messages
    #[arg(short, long)]
    verbose: bool,
}

/// Checks if the passed file path points to an existing scene or config file.
fn file_path_is_valid(path: &Path) -> bool {
    path.is_file()
        && matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml" | "json")
        )
}

fn eval_file_path_input(file_path: &str) -> OpticsResult<PathBuf> {
    let path = PathBuf::from(file_path);
    if file_path_is_valid(&path) {
        Ok(path)
    } else {
        Err(OpticsError::Console(format!(
            "invalid file path: {file_path} (expected an existing .yaml, .yml or .json file)"
        )))
    }
}

fn eval_preset_input(preset: &str) -> OpticsResult<Preset> {
    Preset::from_str(preset).map_err(|_| {
        let names: Vec<String> = Preset::iter().map(|p| p.to_string()).collect();
        OpticsError::Console(format!(
            "unknown preset '{preset}', available: {}",
            names.join(", ")
        ))
    })
}

impl TryFrom<PartialArgs> for Args {
    type Error = OpticsError;

    fn try_from(part_args: PartialArgs) -> OpticsResult<Self> {
        let source = match (part_args.scene.as_deref(), part_args.preset.as_deref()) {
            (Some(scene), None) => SceneSource::File(eval_file_path_input(scene)?),
            (None, Some(preset)) => SceneSource::Preset(eval_preset_input(preset)?),
            (None, None) => {
                return Err(OpticsError::Console(
                    "either --scene or --preset must be given".into(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(OpticsError::Console(
                    "--scene and --preset cannot be combined".into(),
                ))
            }
        };
        let config = match part_args.config.as_deref() {
            Some(path) => SolverConfig::from_file(&eval_file_path_input(path)?)?,
            None => SolverConfig::default(),
        };
        if part_args.ticks == 0 {
            return Err(OpticsError::Console("ticks must be at least 1".into()));
        }
        Ok(Self {
            source,
            config,
            ticks: part_args.ticks,
            dot: part_args.dot,
            verbose: part_args.verbose,
        })
    }
}

impl Args {
    /// Load the scene description named by these arguments.
    ///
    /// # Errors
    ///
    /// This function will return an error if the scene file cannot be read or parsed.
    pub fn scene_description(&self) -> OpticsResult<Option<SceneDescription>> {
        match &self.source {
            SceneSource::File(path) => SceneDescription::from_file(path).map(Some),
            SceneSource::Preset(_) => Ok(None),
        }
    }
}
