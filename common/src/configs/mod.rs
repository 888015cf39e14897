pub mod physics_config;
pub mod scene_config;

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::configs::physics_config::ConfigPhysics;
use crate::configs::scene_config::ConfigScene;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub physics: ConfigPhysics,
    pub scene: ConfigScene,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        from_file(path)
    }

    /// Loads the configuration at `path`, or falls back to the built-in defaults when no path
    /// is given.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(path) => {
                let path = path.as_ref();
                info!("Loading configuration from {}", path.display());
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }
}

pub fn from_file<P: AsRef<Path>, S: serde::de::DeserializeOwned>(path: P) -> Result<S> {
    let path = path.as_ref();
    let mut file =
        File::open(path).with_context(|| format!("Unable to open {}", path.display()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .with_context(|| format!("Unable to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Malformed {}", path.display()))
}

pub fn to_file<P: AsRef<Path>, S: Serialize>(s: &S, path: P) -> Result<()> {
    let path = path.as_ref();
    let serialized = serde_json::to_string_pretty(s)?;
    let mut file =
        File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
    file.write_all(serialized.as_bytes())
        .with_context(|| format!("Unable to write {}", path.display()))?;
    Ok(())
}
