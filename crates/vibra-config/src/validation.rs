//! Effect and parameter validation.
//!
//! Applying a configuration clamps values silently, the way the parameter
//! store always does. Validation is the strict path: it resolves every name
//! against the [`EffectRegistry`] and reports each problem, including values
//! that applying would have clamped.
//!
//! ```rust
//! use vibra_config::{EffectConfig, ValidationError};
//! use vibra_registry::EffectRegistry;
//!
//! let registry = EffectRegistry::new();
//! let config = EffectConfig::new("delay").with_param("feedback", 1.5);
//!
//! let err = config.validate(&registry).unwrap_err();
//! assert!(matches!(err, ValidationError::OutOfRange { .. }));
//! ```

use thiserror::Error;
use vibra_core::ParamDescriptor;
use vibra_registry::{EffectDescriptor, EffectRegistry};

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Unknown effect type.
    #[error("unknown effect type: {0}")]
    UnknownEffect(String),

    /// Unknown parameter name.
    #[error("unknown parameter '{param}' for effect '{effect}'")]
    UnknownParameter {
        /// Name of the effect.
        effect: String,
        /// Name of the unrecognized parameter.
        param: String,
    },

    /// Parameter value out of range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the parameter.
        param: String,
        /// The value that was out of range.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// Invalid parameter format.
    #[error("invalid format for parameter '{param}': {reason}")]
    InvalidFormat {
        /// Name of the parameter.
        param: String,
        /// Description of the format error.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

impl ValidationError {
    /// Collapses a list of problems: none is `Ok`, one is returned as is.
    pub fn from_list(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple(errors)),
        }
    }
}

/// Looks up an effect descriptor by id.
pub fn validate_effect<'a>(
    registry: &'a EffectRegistry,
    effect: &str,
) -> ValidationResult<&'a EffectDescriptor> {
    registry
        .get(effect)
        .ok_or_else(|| ValidationError::UnknownEffect(effect.to_string()))
}

/// Resolves a parameter name (case-insensitive, name or short name) to its
/// index and descriptor.
pub fn resolve_param<'a>(
    effect: &'a EffectDescriptor,
    param: &str,
) -> ValidationResult<(usize, &'a ParamDescriptor)> {
    effect
        .params
        .iter()
        .enumerate()
        .find(|(_, d)| d.name.eq_ignore_ascii_case(param) || d.short_name.eq_ignore_ascii_case(param))
        .ok_or_else(|| ValidationError::UnknownParameter {
            effect: effect.id.to_string(),
            param: param.to_string(),
        })
}

/// Checks a value against the descriptor's range without clamping.
pub fn validate_range(descriptor: &ParamDescriptor, value: f32) -> ValidationResult<()> {
    if value.is_finite() && descriptor.contains(value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            param: descriptor.name.to_string(),
            value,
            min: descriptor.min,
            max: descriptor.max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_effect() {
        let registry = EffectRegistry::new();
        assert_eq!(validate_effect(&registry, "Tremolo").unwrap().id, "tremolo");
        assert_eq!(
            validate_effect(&registry, "flanger").unwrap_err(),
            ValidationError::UnknownEffect("flanger".to_string())
        );
    }

    #[test]
    fn test_resolve_param_by_short_name() {
        let registry = EffectRegistry::new();
        let compressor = registry.get("compressor").unwrap();
        let (index, desc) = resolve_param(compressor, "thresh").unwrap();
        assert_eq!(index, 2);
        assert_eq!(desc.name, "threshold");
        assert!(matches!(
            resolve_param(compressor, "knee"),
            Err(ValidationError::UnknownParameter { .. })
        ));
    }

    #[test]
    fn test_validate_range() {
        let registry = EffectRegistry::new();
        let delay = registry.get("delay").unwrap();
        let (_, feedback) = resolve_param(delay, "feedback").unwrap();
        assert!(validate_range(feedback, 0.0).is_ok());
        assert!(validate_range(feedback, 1.0).is_ok());
        assert!(validate_range(feedback, 1.01).is_err());
        assert!(validate_range(feedback, f32::NAN).is_err());
    }

    #[test]
    fn test_from_list() {
        assert!(ValidationError::from_list(Vec::new()).is_ok());
        let one = ValidationError::UnknownEffect("a".to_string());
        assert_eq!(
            ValidationError::from_list(vec![one.clone()]).unwrap_err(),
            one
        );
        let many = ValidationError::from_list(vec![one.clone(), one]).unwrap_err();
        assert!(matches!(many, ValidationError::Multiple(ref v) if v.len() == 2));
        assert!(many.to_string().starts_with("multiple validation errors"));
    }
}
