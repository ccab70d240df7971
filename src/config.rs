use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    generator::{EcLevel, OutputFormat},
    scanner::FacingMode,
};

pub const DEFAULT_DATA: &str = "https://visernic.com";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub generator: GeneratorConfig,
    pub scanner: ScannerConfig,
    pub clipboard: ClipboardConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    /// Rendered whenever the text input is empty.
    pub default_data: String,
    pub margin: u32,
    pub ec_level: EcLevel,
    pub dots_color: String,
    pub background_color: String,
    pub image_margin: u32,
    /// Fraction of the symbol the logo may cover.
    pub image_size: f32,
    pub hide_background_dots: bool,
    pub debounce_ms: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: 280,
            height: 280,
            format: OutputFormat::Svg,
            default_data: DEFAULT_DATA.to_string(),
            margin: 0,
            ec_level: EcLevel::Q,
            dots_color: "#000000".to_string(),
            background_color: "#ffffff".to_string(),
            image_margin: 10,
            image_size: 0.4,
            hide_background_dots: true,
            debounce_ms: 300,
        }
    }
}

impl GeneratorConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub fps: u32,
    pub qrbox_width: u32,
    pub qrbox_height: u32,
    pub facing_mode: FacingMode,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self { fps: 10, qrbox_width: 250, qrbox_height: 250, facing_mode: FacingMode::Environment }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    pub command: String,
    pub args: Vec<String>,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        let (command, args): (&str, &[&str]) = if cfg!(target_os = "macos") {
            ("pbcopy", &[])
        } else if cfg!(target_os = "windows") {
            ("clip", &[])
        } else {
            ("xclip", &["-selection", "clipboard"])
        };
        Self { command: command.to_string(), args: args.iter().map(|a| a.to_string()).collect() }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Config = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let g = &self.generator;
        if g.width == 0 || g.height == 0 {
            return Err(Error::config("generator width and height must be non-zero"));
        }
        if 2 * g.margin >= g.width.min(g.height) {
            return Err(Error::config("generator margin leaves no room for the symbol"));
        }
        if !(g.image_size > 0.0 && g.image_size <= 1.0) {
            return Err(Error::config("generator image_size must be within (0, 1]"));
        }
        if self.scanner.fps == 0 {
            return Err(Error::config("scanner fps must be non-zero"));
        }
        if self.clipboard.command.trim().is_empty() {
            return Err(Error::config("clipboard command is empty"));
        }
        Ok(())
    }
}
