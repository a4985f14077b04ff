//! Error types for effect instances.

use thiserror::Error;
use vibra_config::ConfigError;

/// Errors raised outside the audio path: construction and preparation.
#[derive(Debug, Error)]
pub enum HostError {
    /// No effect with that id is registered.
    #[error("unknown effect: {0}")]
    UnknownEffect(String),

    /// The host asked to prepare with an unusable configuration.
    #[error("invalid process spec: sample rate {sample_rate}, {channels} channels")]
    InvalidSpec {
        /// Requested sample rate in Hz.
        sample_rate: f32,
        /// Requested channel count.
        channels: usize,
    },

    /// Loading or applying a configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            HostError::UnknownEffect("reverb".to_string()).to_string(),
            "unknown effect: reverb"
        );
        let err = HostError::InvalidSpec {
            sample_rate: 0.0,
            channels: 2,
        };
        assert!(err.to_string().contains("sample rate 0"));
    }
}
