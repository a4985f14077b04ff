//! Configuration for vibra effect instances.
//!
//! An [`EffectConfig`] names one registered effect, sets any of its
//! parameters by name and chooses the kernel options (phase reset policy,
//! LFO routing, tremolo polarity, chorus interpolation). It is stored as
//! TOML.
//!
//! # Features
//!
//! - **TOML files**: Load and save effect configurations
//! - **Unit-aware values**: `"120ms"`, `"-6dB"`, `"50%"` convert into the
//!   parameter's own unit
//! - **Validation**: Strict checks of effect ids, names and ranges
//!
//! # Example
//!
//! ```rust,no_run
//! use vibra_config::EffectConfig;
//! use vibra_registry::EffectRegistry;
//!
//! let registry = EffectRegistry::new();
//! let config = EffectConfig::load("tremolo.toml").unwrap();
//! config.validate(&registry).unwrap();
//!
//! let params = registry.create_params(&config.effect).unwrap();
//! config.apply_to(&registry, &params).unwrap();
//! let options = config.kernel_options();
//! ```

mod effect_config;
mod error;

/// Effect and parameter validation.
pub mod validation;

pub use effect_config::{
    EffectConfig, InterpolationConfig, LfoRoutingConfig, OptionsConfig, ParamValue,
    PolarityConfig, parse_param_value,
};
pub use error::ConfigError;
pub use validation::{ValidationError, ValidationResult, resolve_param, validate_effect, validate_range};

/// Re-export commonly used types from vibra-registry
pub use vibra_registry::{EffectCategory, EffectDescriptor, EffectRegistry};
