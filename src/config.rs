use crate::error::{PipelineError, Result};
use crate::utils::binarization::{DEFAULT_SENSITIVITY, ThresholdParams, default_window_side};

/// Environment variable overriding the window side
pub const WINDOW_SIDE_ENV: &str = "MAZE_WINDOW_SIDE";
/// Environment variable overriding the sensitivity
pub const SENSITIVITY_ENV: &str = "MAZE_SENSITIVITY";

fn parse_usize(value: Option<String>) -> Option<usize> {
    value.and_then(|v| v.trim().parse::<usize>().ok())
}

fn parse_f64(value: Option<String>) -> Option<f64> {
    value.and_then(|v| v.trim().parse::<f64>().ok())
}

/// Tunable binarization settings
///
/// Nothing is clamped here: out-of-range values surface as
/// `InvalidParameter` when the config is resolved against a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinarizeConfig {
    /// Window side in pixels; `None` uses one eighth of the frame width
    pub window_side: Option<usize>,
    /// Fraction below the local mean a pixel must fall to be foreground
    pub sensitivity: f64,
}

impl Default for BinarizeConfig {
    fn default() -> Self {
        Self {
            window_side: None,
            sensitivity: DEFAULT_SENSITIVITY,
        }
    }
}

impl BinarizeConfig {
    /// Start a builder from the defaults
    pub fn builder() -> BinarizeConfigBuilder {
        BinarizeConfigBuilder::default()
    }

    /// Defaults overridden by `MAZE_WINDOW_SIDE` / `MAZE_SENSITIVITY`.
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the
    /// `MAZE_*` variable names
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        Self {
            window_side: parse_usize(lookup(WINDOW_SIDE_ENV)).or(default.window_side),
            sensitivity: parse_f64(lookup(SENSITIVITY_ENV)).unwrap_or(default.sensitivity),
        }
    }

    /// Check the configured values without a frame
    pub fn validate(&self) -> Result<()> {
        self.resolve(self.window_side.unwrap_or(1)).map(|_| ())
    }

    /// Concrete threshold parameters for a frame of the given width
    pub fn resolve(&self, width: usize) -> Result<ThresholdParams> {
        let window_side = match self.window_side {
            Some(side) => side,
            None if width == 0 => {
                return Err(PipelineError::InvalidFrame(
                    "frame width must be positive".to_string(),
                ));
            }
            None => default_window_side(width),
        };
        ThresholdParams::new(window_side, self.sensitivity)
    }
}

/// Builder for [`BinarizeConfig`]
#[derive(Default)]
pub struct BinarizeConfigBuilder {
    window_side: Option<usize>,
    sensitivity: Option<f64>,
}

impl BinarizeConfigBuilder {
    /// Fixed window side in pixels
    pub fn window_side(mut self, side: usize) -> Self {
        self.window_side = Some(side);
        self
    }

    /// Sensitivity in `[0, 1)`
    pub fn sensitivity(mut self, sensitivity: f64) -> Self {
        self.sensitivity = Some(sensitivity);
        self
    }

    /// Finish, filling unset fields from the defaults
    pub fn build(self) -> BinarizeConfig {
        let default = BinarizeConfig::default();
        BinarizeConfig {
            window_side: self.window_side.or(default.window_side),
            sensitivity: self.sensitivity.unwrap_or(default.sensitivity),
        }
    }
}
