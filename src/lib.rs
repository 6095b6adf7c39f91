//! zvd-shape - stream reassembly and resampling taps for ZVD
//!
//! The data-shaping layer underneath ZVD's parsers and scalers. Both parts
//! are synchronous, single-owner structures with no I/O.
//!
//! # Architecture
//!
//! - `adapter`: accumulates byte chunks of any size and serves them back as
//!   contiguous windows (`peek`, `take`, `flush`)
//! - `resampler`: computes per-output-sample filter taps for scaling a 1-D
//!   sequence with nearest, linear, cubic, sinc or lanczos kernels
//! - `util`: the chunk and timestamp types shared with the rest of ZVD

pub mod adapter;
pub mod error;
pub mod resampler;
pub mod util;

pub use adapter::ByteAdapter;
pub use error::{Error, Result};
pub use resampler::{
    ResamplerFlags, ResamplerMethod, ResamplerOptions, TapRow, TapTable, VideoResampler,
};
pub use util::{Buffer, Timestamp};

/// zvd-shape version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library-level configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Log at info level
    pub verbose: bool,
    /// Log at debug level, including per-call adapter and resampler events
    pub debug: bool,
}

/// Initialize logging for the library
///
/// Installs a global `tracing` subscriber when `verbose` or `debug` is set.
/// `RUST_LOG` overrides the level when present. Applications that install
/// their own subscriber should not call this.
pub fn init(config: Config) -> Result<()> {
    if config.verbose || config.debug {
        let level = if config.debug { "debug" } else { "info" };
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .map_err(|e| Error::Init(format!("Failed to install tracing subscriber: {}", e)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.verbose);
        assert!(!config.debug);
    }

    #[test]
    fn test_init_quiet() {
        assert!(init(Config::default()).is_ok());
    }
}
