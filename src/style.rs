use std::fmt;

use serde::{Deserialize, Serialize};

/// Visual preset for generated codes. Each preset maps to a fixed dot/corner shape pair.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleSelection {
    #[default]
    Square,
    Rounded,
    Dots,
    Classy,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DotShape {
    Square,
    Rounded,
    Dots,
    Classy,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CornerShape {
    Square,
    ExtraRounded,
    Dot,
}

impl StyleSelection {
    pub const ALL: [StyleSelection; 4] = [Self::Square, Self::Rounded, Self::Dots, Self::Classy];

    /// Returns `None` for unrecognised names, callers treat that as a no-op.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "square" => Some(Self::Square),
            "rounded" => Some(Self::Rounded),
            "dots" => Some(Self::Dots),
            "classy" => Some(Self::Classy),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Rounded => "rounded",
            Self::Dots => "dots",
            Self::Classy => "classy",
        }
    }

    pub fn shapes(self) -> (DotShape, CornerShape) {
        match self {
            Self::Square => (DotShape::Square, CornerShape::Square),
            Self::Rounded => (DotShape::Rounded, CornerShape::ExtraRounded),
            Self::Dots => (DotShape::Dots, CornerShape::Dot),
            Self::Classy => (DotShape::Classy, CornerShape::Square),
        }
    }
}

impl fmt::Display for StyleSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
