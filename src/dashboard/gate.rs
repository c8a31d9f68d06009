/// Water level gate for the manual ON control.
///
/// | Level                          | ON control          |
/// |--------------------------------|---------------------|
/// | `level >= emergency`           | disabled            |
/// | `warning <= level < emergency` | enabled, warning    |
/// | `level < warning`              | enabled             |
///
/// OFF is never gated.
use serde::Serialize;

use crate::config::schema::GateConfig;

pub const TOOLTIP_EMERGENCY: &str = "Water level too high! The pump cannot be switched on.";
pub const TOOLTIP_WARNING: &str = "Water level is close to the limit. Use with care.";
pub const TOOLTIP_NORMAL: &str = "Switch the pump on manually.";

/// Warning and emergency water levels (cm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GateThresholds {
    pub warning: f64,
    pub emergency: f64,
}

impl Default for GateThresholds {
    fn default() -> Self {
        Self::from_config(&GateConfig::default())
    }
}

impl GateThresholds {
    pub fn from_config(config: &GateConfig) -> Self {
        Self {
            warning: config.warning_level_cm,
            emergency: config.emergency_level_cm,
        }
    }
}

/// Presentation state of the ON control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ButtonGate {
    pub disabled: bool,
    pub warning: bool,
    pub tooltip: &'static str,
}

impl ButtonGate {
    /// State before the first reading arrives.
    pub const OPEN: Self = Self {
        disabled: false,
        warning: false,
        tooltip: TOOLTIP_NORMAL,
    };
}

impl Default for ButtonGate {
    fn default() -> Self {
        Self::OPEN
    }
}

/// Gate the ON control on the most recently observed water level.
pub fn gate(level: f64, thresholds: GateThresholds) -> ButtonGate {
    if level >= thresholds.emergency {
        ButtonGate {
            disabled: true,
            warning: false,
            tooltip: TOOLTIP_EMERGENCY,
        }
    } else if level >= thresholds.warning {
        ButtonGate {
            disabled: false,
            warning: true,
            tooltip: TOOLTIP_WARNING,
        }
    } else {
        ButtonGate::OPEN
    }
}
