//! Display specifications for the supported systems.

use crate::system::SystemId;

/// Native output specifications for a cartridge system.
///
/// Used by the launcher for layout before and after a session starts, so the
/// stage has the right shape even when nothing is running.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemSpecs {
    /// Human-readable system name
    pub name: &'static str,
    /// Native framebuffer width in pixels
    pub width: u32,
    /// Native framebuffer height in pixels
    pub height: u32,
}

impl SystemSpecs {
    /// Aspect ratio expressed as height / width.
    pub fn aspect(&self) -> f32 {
        self.height as f32 / self.width as f32
    }
}

const NES_SPECS: SystemSpecs = SystemSpecs {
    name: "Nintendo Entertainment System",
    width: 256,
    height: 240,
};

const SNES_SPECS: SystemSpecs = SystemSpecs {
    name: "Super Nintendo",
    width: 256,
    height: 224,
};

const N64_SPECS: SystemSpecs = SystemSpecs {
    name: "Nintendo 64",
    width: 320,
    height: 240,
};

// 3:2
const GBA_SPECS: SystemSpecs = SystemSpecs {
    name: "Game Boy Advance",
    width: 240,
    height: 160,
};

const GB_SPECS: SystemSpecs = SystemSpecs {
    name: "Game Boy",
    width: 160,
    height: 144,
};

const GBC_SPECS: SystemSpecs = SystemSpecs {
    name: "Game Boy Color",
    width: 160,
    height: 144,
};

// Both screens stacked vertically
const NDS_SPECS: SystemSpecs = SystemSpecs {
    name: "Nintendo DS",
    width: 256,
    height: 384,
};

/// Get the display specifications for a system.
pub const fn system_specs(system: SystemId) -> &'static SystemSpecs {
    match system {
        SystemId::Nes => &NES_SPECS,
        SystemId::Snes => &SNES_SPECS,
        SystemId::N64 => &N64_SPECS,
        SystemId::Gba => &GBA_SPECS,
        SystemId::Gb => &GB_SPECS,
        SystemId::Gbc => &GBC_SPECS,
        SystemId::Nds => &NDS_SPECS,
    }
}
