//! Resampler option bag
//!
//! Options are a flat set of named numbers. Missing keys fall back to their
//! defaults and unknown keys are ignored, so option sets written for a newer
//! version still load.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default B parameter of the cubic kernel
pub const DEFAULT_CUBIC_B: f64 = 1.0 / 3.0;
/// Default C parameter of the cubic kernel
pub const DEFAULT_CUBIC_C: f64 = 1.0 / 3.0;
/// Default envelope size for sinc and lanczos
pub const DEFAULT_ENVELOPE: f64 = 2.0;
/// Default sharpness
pub const DEFAULT_SHARPNESS: f64 = 1.0;
/// Default sharpen amount for lanczos
pub const DEFAULT_SHARPEN: f64 = 0.0;
/// Default upper bound on taps per output sample
pub const DEFAULT_MAX_TAPS: usize = 128;

/// Tunables for [`TapTable`](super::TapTable) generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ResamplerOptions {
    /// Cubic B parameter (blur)
    pub cubic_b: f64,
    /// Cubic C parameter (ringing)
    pub cubic_c: f64,
    /// Kernel support radius for sinc and lanczos, in input samples, `[1, 5]`
    pub envelope: f64,
    /// Frequency scale of the kernel, `[0.5, 1.5]`
    pub sharpness: f64,
    /// Amount subtracted from the lanczos sinc term, `[0, 1]`
    pub sharpen: f64,
    /// Upper bound on taps per output sample, `[1, 1024]`
    pub max_taps: usize,
}

impl Default for ResamplerOptions {
    fn default() -> Self {
        ResamplerOptions {
            cubic_b: DEFAULT_CUBIC_B,
            cubic_c: DEFAULT_CUBIC_C,
            envelope: DEFAULT_ENVELOPE,
            sharpness: DEFAULT_SHARPNESS,
            sharpen: DEFAULT_SHARPEN,
            max_taps: DEFAULT_MAX_TAPS,
        }
    }
}

impl ResamplerOptions {
    /// Set the cubic B and C parameters
    pub fn with_cubic(mut self, b: f64, c: f64) -> Self {
        self.cubic_b = b;
        self.cubic_c = c;
        self
    }

    /// Set the envelope size
    pub fn with_envelope(mut self, envelope: f64) -> Self {
        self.envelope = envelope;
        self
    }

    /// Set the sharpness
    pub fn with_sharpness(mut self, sharpness: f64) -> Self {
        self.sharpness = sharpness;
        self
    }

    /// Set the lanczos sharpen amount
    pub fn with_sharpen(mut self, sharpen: f64) -> Self {
        self.sharpen = sharpen;
        self
    }

    /// Set the tap limit
    pub fn with_max_taps(mut self, max_taps: usize) -> Self {
        self.max_taps = max_taps;
        self
    }

    /// Parse options from a JSON object
    ///
    /// ```rust
    /// use zvd_shape::resampler::ResamplerOptions;
    ///
    /// let opts = ResamplerOptions::from_json(r#"{"envelope": 3.0, "max-taps": 16}"#).unwrap();
    /// assert_eq!(opts.envelope, 3.0);
    /// assert_eq!(opts.max_taps, 16);
    /// assert_eq!(opts.sharpness, 1.0);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::config(format!("bad resampler options: {}", e)))
    }

    /// Build options from `key = value` string pairs
    ///
    /// Keys accept `-` or `_` as separator. Unknown keys are skipped; a value
    /// that does not parse as a number is an error.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut opts = ResamplerOptions::default();
        for (key, value) in pairs {
            let key = key.as_ref().trim().replace('_', "-");
            let value = value.as_ref().trim();
            match key.as_str() {
                "cubic-b" => opts.cubic_b = parse_f64(&key, value)?,
                "cubic-c" => opts.cubic_c = parse_f64(&key, value)?,
                "envelope" => opts.envelope = parse_f64(&key, value)?,
                "sharpness" => opts.sharpness = parse_f64(&key, value)?,
                "sharpen" => opts.sharpen = parse_f64(&key, value)?,
                "max-taps" => {
                    opts.max_taps = value
                        .parse()
                        .map_err(|_| Error::config(format!("{}: expected an integer, got {:?}", key, value)))?
                }
                _ => debug!(key = %key, "ignoring unknown resampler option"),
            }
        }
        Ok(opts)
    }

    /// Copy with every value clamped to its valid range
    ///
    /// Non-finite values fall back to the default.
    pub fn clamped(&self) -> Self {
        ResamplerOptions {
            cubic_b: finite_or(self.cubic_b, DEFAULT_CUBIC_B),
            cubic_c: finite_or(self.cubic_c, DEFAULT_CUBIC_C),
            envelope: finite_or(self.envelope, DEFAULT_ENVELOPE).clamp(1.0, 5.0),
            sharpness: finite_or(self.sharpness, DEFAULT_SHARPNESS).clamp(0.5, 1.5),
            sharpen: finite_or(self.sharpen, DEFAULT_SHARPEN).clamp(0.0, 1.0),
            max_taps: self.max_taps.clamp(1, 1024),
        }
    }
}

fn parse_f64(key: &str, value: &str) -> Result<f64> {
    value
        .parse()
        .map_err(|_| Error::config(format!("{}: expected a number, got {:?}", key, value)))
}

fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        default
    }
}
