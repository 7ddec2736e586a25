//! Display sizing for the engine surface.
//!
//! Purely presentational: nothing here reaches the engine.

use std::fmt;
use std::str::FromStr;

use retroshelf_shared::{SystemId, system_specs};

/// How the game picture is scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalePreset {
    /// 1× pixel-perfect
    Native,
    /// 2× pixel-perfect
    Pixel2x,
    /// 3× pixel-perfect
    Pixel3x,
    /// Largest size that keeps the aspect ratio
    Fit,
    /// Fill the surface, ignoring aspect ratio
    Stretch,
}

impl ScalePreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalePreset::Native => "native",
            ScalePreset::Pixel2x => "2x",
            ScalePreset::Pixel3x => "3x",
            ScalePreset::Fit => "fit",
            ScalePreset::Stretch => "stretch",
        }
    }

    /// Integer scale factor for pixel-perfect presets.
    pub fn pixel_scale(&self) -> Option<u32> {
        match self {
            ScalePreset::Native => Some(1),
            ScalePreset::Pixel2x => Some(2),
            ScalePreset::Pixel3x => Some(3),
            ScalePreset::Fit | ScalePreset::Stretch => None,
        }
    }

    /// Preset applied whenever a system's display is (re)initialized.
    pub fn default_for(system: SystemId) -> Self {
        match system {
            SystemId::Gba => ScalePreset::Pixel3x,
            _ => ScalePreset::Fit,
        }
    }
}

impl fmt::Display for ScalePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scale preset '{0}' (expected native, 2x, 3x, fit or stretch)")]
pub struct UnknownPreset(pub String);

impl FromStr for ScalePreset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" | "1x" => Ok(ScalePreset::Native),
            "2x" => Ok(ScalePreset::Pixel2x),
            "3x" => Ok(ScalePreset::Pixel3x),
            "fit" => Ok(ScalePreset::Fit),
            "stretch" => Ok(ScalePreset::Stretch),
            _ => Err(UnknownPreset(s.to_string())),
        }
    }
}

/// Current display geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Presentation {
    /// Base width in pixels
    pub width: u32,
    /// Base height in pixels
    pub height: u32,
    /// Height divided by width
    pub aspect: f32,
    pub preset: ScalePreset,
}

impl Presentation {
    /// Base dimensions and default preset for `system`.
    pub fn for_system(system: SystemId) -> Self {
        let specs = system_specs(system);
        Self {
            width: specs.width,
            height: specs.height,
            aspect: specs.aspect(),
            preset: ScalePreset::default_for(system),
        }
    }

    /// Size of the picture inside a `surface_width` × `surface_height` area.
    pub fn scaled_size(&self, surface_width: u32, surface_height: u32) -> (u32, u32) {
        match self.preset.pixel_scale() {
            Some(factor) => (self.width * factor, self.height * factor),
            None if self.preset == ScalePreset::Stretch => (surface_width, surface_height),
            None => {
                let by_width = (surface_width, (surface_width as f32 * self.aspect).round() as u32);
                if by_width.1 <= surface_height {
                    by_width
                } else {
                    ((surface_height as f32 / self.aspect).round() as u32, surface_height)
                }
            }
        }
    }
}
