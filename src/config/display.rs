use serde::{Deserialize, Serialize};

/// Display configuration for output formatting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Decimal places shown for percentages (default: 1)
    #[serde(default = "default_decimals")]
    pub decimals: u32,

    /// Narrow layout: short labels, no legend
    #[serde(default)]
    pub compact: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            decimals: default_decimals(),
            compact: false,
        }
    }
}

fn default_decimals() -> u32 {
    1
}
