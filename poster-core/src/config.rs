use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::PosterError;
use crate::units::PageOptions;

/// Poster settings. Lengths are millimetres.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PosterConfig {
    /// Title markup shown in the title bar.
    pub title: String,
    /// Author markup shown below the title.
    pub authors: String,
    pub width: f64,
    pub height: f64,
    pub title_height: f64,
    /// Logo image (PNG or JPEG) placed at the right of the title bar.
    pub logo: PathBuf,
    /// File name without extension used by the `export_as_*` methods.
    pub output_stem: String,
    pub page: PageOptions,
}

impl Default for PosterConfig {
    fn default() -> Self {
        PosterConfig {
            title: String::new(),
            authors: String::new(),
            width: 840.0,
            height: 1200.0,
            title_height: 100.0,
            logo: PathBuf::from("images/logo.png"),
            output_stem: "poster".to_string(),
            page: PageOptions::default(),
        }
    }
}

impl PosterConfig {
    pub fn new(title: &str, authors: &str) -> Self {
        PosterConfig {
            title: title.to_string(),
            authors: authors.to_string(),
            ..Default::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, PosterError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PosterError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| PosterError::Asset {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
