mod debounce;
mod logo;
mod render;

pub use debounce::Debouncer;
pub use logo::Logo;
pub use render::{parse_hex_color, render, FileTarget, StyledRenderer};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    config::GeneratorConfig,
    error::Result,
    style::{CornerShape, DotShape, StyleSelection},
};

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Svg,
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum EcLevel {
    L,
    M,
    Q,
    H,
}

impl EcLevel {
    // Share of codewords that may be lost, caps how many modules a logo may hide
    pub(crate) fn recovery_fraction(self) -> f32 {
        match self {
            Self::L => 0.07,
            Self::M => 0.15,
            Self::Q => 0.25,
            Self::H => 0.30,
        }
    }
}

impl From<EcLevel> for qrcode::EcLevel {
    fn from(level: EcLevel) -> Self {
        match level {
            EcLevel::L => qrcode::EcLevel::L,
            EcLevel::M => qrcode::EcLevel::M,
            EcLevel::Q => qrcode::EcLevel::Q,
            EcLevel::H => qrcode::EcLevel::H,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Artifact {
    Svg(String),
    Png(Vec<u8>),
}

impl Artifact {
    pub fn format(&self) -> OutputFormat {
        match self {
            Self::Svg(_) => OutputFormat::Svg,
            Self::Png(_) => OutputFormat::Png,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Svg(s) => s.as_bytes(),
            Self::Png(b) => b,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DotsOptions {
    pub color: String,
    pub shape: DotShape,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundOptions {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageOptions {
    pub margin: u32,
    pub image_size: f32,
    pub hide_background_dots: bool,
}

/// Full option set of a renderer. Built once, then mutated through [`OptionsPatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub data: String,
    pub margin: u32,
    pub ec_level: EcLevel,
    pub dots: DotsOptions,
    pub background: BackgroundOptions,
    pub corners: CornerShape,
    pub image_options: ImageOptions,
    pub image: Option<Logo>,
}

impl RenderOptions {
    pub fn from_config(config: &GeneratorConfig, style: StyleSelection) -> Self {
        let (dots, corners) = style.shapes();
        Self {
            width: config.width,
            height: config.height,
            format: config.format,
            data: config.default_data.clone(),
            margin: config.margin,
            ec_level: config.ec_level,
            dots: DotsOptions { color: config.dots_color.clone(), shape: dots },
            background: BackgroundOptions { color: config.background_color.clone() },
            corners,
            image_options: ImageOptions {
                margin: config.image_margin,
                image_size: config.image_size,
                hide_background_dots: config.hide_background_dots,
            },
            image: None,
        }
    }

    pub fn apply(&mut self, patch: OptionsPatch) {
        if let Some(data) = patch.data {
            self.data = data;
        }
        if let Some(shape) = patch.dots_shape {
            self.dots.shape = shape;
        }
        if let Some(shape) = patch.corners_shape {
            self.corners = shape;
        }
        if let Some(image) = patch.image {
            self.image = image;
        }
    }
}

/// Partial update. `None` fields keep their current value; `image: Some(None)` clears the logo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsPatch {
    pub data: Option<String>,
    pub dots_shape: Option<DotShape>,
    pub corners_shape: Option<CornerShape>,
    pub image: Option<Option<Logo>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratorRequest {
    pub text: String,
    pub style: StyleSelection,
    pub logo: Option<Logo>,
}

impl GeneratorRequest {
    pub fn data<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.text.is_empty() {
            fallback
        } else {
            &self.text
        }
    }

    pub fn to_patch(&self, fallback: &str) -> OptionsPatch {
        let (dots, corners) = self.style.shapes();
        OptionsPatch {
            data: Some(self.data(fallback).to_string()),
            dots_shape: Some(dots),
            corners_shape: Some(corners),
            image: Some(self.logo.clone()),
        }
    }
}

/// Where a rendered artifact is mounted. Receives the artifact again after every update.
pub trait RenderTarget: Send {
    fn mount(&mut self, artifact: &Artifact) -> Result<()>;
}

pub trait Renderer: Send {
    fn append(&mut self, target: Box<dyn RenderTarget>) -> Result<()>;

    /// Mutates the live artifact in place. On error the previous artifact stays mounted.
    fn update(&mut self, patch: OptionsPatch) -> Result<()>;

    fn options(&self) -> &RenderOptions;
}
