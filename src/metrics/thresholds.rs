//! Severity bands for sensor readings.

use serde::{Deserialize, Serialize};

/// Presentation severity for a CPU temperature reading.
///
/// Drives display emphasis only; classification has no side effects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TempSeverity {
    /// No valid reading. Values at or below 0 °C act as the missing-sensor
    /// sentinel: the sources report 0 when they cannot measure, and a true
    /// 0 °C die temperature does not occur on running hardware.
    #[default]
    Unknown,
    /// At or below 60 °C
    Normal,
    /// Above 60 °C, at or below 80 °C
    Warm,
    /// Above 80 °C
    Critical,
}

impl TempSeverity {
    /// Classify a Celsius reading into a severity band.
    pub fn classify(celsius: f32) -> Self {
        if !celsius.is_finite() || celsius <= 0.0 {
            Self::Unknown
        } else if celsius <= 60.0 {
            Self::Normal
        } else if celsius <= 80.0 {
            Self::Warm
        } else {
            Self::Critical
        }
    }

    /// Short lowercase label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Normal => "normal",
            Self::Warm => "warm",
            Self::Critical => "critical",
        }
    }
}
