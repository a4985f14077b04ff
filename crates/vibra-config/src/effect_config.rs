//! Effect configuration types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use vibra_core::{
    Interpolation, KernelOptions, LfoRouting, ModulationPolarity, ParamDescriptor, ParamUnit,
    ParameterStore, db_to_linear,
};
use vibra_registry::EffectRegistry;

use crate::error::ConfigError;
use crate::validation::{
    ValidationError, ValidationResult, resolve_param, validate_effect, validate_range,
};

/// A parameter value as written in a configuration file.
///
/// Plain TOML numbers are taken in the parameter's own unit. Strings may
/// carry a unit suffix, see [`parse_param_value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// A bare number.
    Number(f32),
    /// A number with an optional unit suffix (`"50%"`, `"120ms"`).
    Text(String),
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Number(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl ParamValue {
    /// Converts into the descriptor's unit without clamping.
    pub fn resolve(&self, descriptor: &ParamDescriptor) -> ValidationResult<f32> {
        match self {
            ParamValue::Number(v) => Ok(*v),
            ParamValue::Text(text) => parse_param_value(text, descriptor.unit).ok_or_else(|| {
                ValidationError::InvalidFormat {
                    param: descriptor.name.to_string(),
                    reason: format!("cannot parse '{text}'"),
                }
            }),
        }
    }
}

/// Parse a parameter value string into `unit`.
///
/// Supports:
/// - Plain numbers: "0.5", "-0.3"
/// - Percentages: "50%" (divided by 100)
/// - Decibels: "-6dB" (kept for dB parameters, otherwise linear gain)
/// - Time: "100ms", "1.5s" (converted to seconds, or to ms for ms parameters)
/// - Frequency: "440Hz", "1.2kHz" (converted to Hz)
pub fn parse_param_value(value: &str, unit: ParamUnit) -> Option<f32> {
    let value = value.trim();

    if let Some(pct) = value.strip_suffix('%') {
        return pct.trim().parse::<f32>().ok().map(|v| v / 100.0);
    }

    if let Some(db) = value
        .strip_suffix("dB")
        .or_else(|| value.strip_suffix("db"))
    {
        let db = db.trim().parse::<f32>().ok()?;
        return Some(if unit == ParamUnit::Decibels {
            db
        } else {
            db_to_linear(db)
        });
    }

    if let Some(ms) = value.strip_suffix("ms") {
        let ms = ms.trim().parse::<f32>().ok()?;
        return Some(if unit == ParamUnit::Milliseconds {
            ms
        } else {
            ms / 1000.0
        });
    }

    if let Some(s) = value.strip_suffix('s') {
        let s = s.trim().parse::<f32>().ok()?;
        return Some(if unit == ParamUnit::Milliseconds {
            s * 1000.0
        } else {
            s
        });
    }

    if let Some(khz) = value
        .strip_suffix("kHz")
        .or_else(|| value.strip_suffix("khz"))
    {
        return khz.trim().parse::<f32>().ok().map(|v| v * 1000.0);
    }

    if let Some(hz) = value
        .strip_suffix("Hz")
        .or_else(|| value.strip_suffix("hz"))
    {
        return hz.trim().parse::<f32>().ok();
    }

    value.parse::<f32>().ok()
}

/// LFO sharing, as spelled in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LfoRoutingConfig {
    /// One oscillator for all channels.
    Shared,
    /// One oscillator per channel.
    #[default]
    PerChannel,
}

/// Amplitude modulation mapping, as spelled in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolarityConfig {
    /// Swings through zero at high depth.
    #[default]
    Bipolar,
    /// Stays non-negative.
    Unipolar,
}

/// Fractional-delay interpolation, as spelled in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationConfig {
    /// Integer taps only.
    None,
    /// Linear between neighbouring taps.
    Linear,
    /// First-order all-pass.
    #[default]
    Thiran,
}

/// The `[options]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsConfig {
    /// LFO routing for the tremolo and choruses.
    pub lfo_routing: LfoRoutingConfig,
    /// Tremolo modulation polarity.
    pub polarity: PolarityConfig,
    /// Chorus delay-line interpolation.
    pub interpolation: InterpolationConfig,
}

impl From<LfoRoutingConfig> for LfoRouting {
    fn from(value: LfoRoutingConfig) -> Self {
        match value {
            LfoRoutingConfig::Shared => LfoRouting::Shared,
            LfoRoutingConfig::PerChannel => LfoRouting::PerChannel,
        }
    }
}

impl From<LfoRouting> for LfoRoutingConfig {
    fn from(value: LfoRouting) -> Self {
        match value {
            LfoRouting::Shared => LfoRoutingConfig::Shared,
            LfoRouting::PerChannel => LfoRoutingConfig::PerChannel,
        }
    }
}

impl From<PolarityConfig> for ModulationPolarity {
    fn from(value: PolarityConfig) -> Self {
        match value {
            PolarityConfig::Bipolar => ModulationPolarity::Bipolar,
            PolarityConfig::Unipolar => ModulationPolarity::Unipolar,
        }
    }
}

impl From<ModulationPolarity> for PolarityConfig {
    fn from(value: ModulationPolarity) -> Self {
        match value {
            ModulationPolarity::Bipolar => PolarityConfig::Bipolar,
            ModulationPolarity::Unipolar => PolarityConfig::Unipolar,
        }
    }
}

impl From<InterpolationConfig> for Interpolation {
    fn from(value: InterpolationConfig) -> Self {
        match value {
            InterpolationConfig::None => Interpolation::None,
            InterpolationConfig::Linear => Interpolation::Linear,
            InterpolationConfig::Thiran => Interpolation::Thiran,
        }
    }
}

impl From<Interpolation> for InterpolationConfig {
    fn from(value: Interpolation) -> Self {
        match value {
            Interpolation::None => InterpolationConfig::None,
            Interpolation::Linear => InterpolationConfig::Linear,
            Interpolation::Thiran => InterpolationConfig::Thiran,
        }
    }
}

fn default_reset_phase() -> bool {
    true
}

/// Configuration for one effect instance.
///
/// # TOML Format
///
/// ```toml
/// effect = "tremolo"
/// reset_phase_on_prepare = true
///
/// [params]
/// rate = 4.0
/// depth = "80%"
///
/// [options]
/// lfo_routing = "shared"
/// polarity = "unipolar"
/// ```
///
/// # Example
///
/// ```rust
/// use vibra_config::EffectConfig;
///
/// let config = EffectConfig::new("delay")
///     .with_param("delay", "250ms")
///     .with_param("feedback", 0.4);
///
/// assert_eq!(config.effect, "delay");
/// assert!(config.reset_phase_on_prepare);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectConfig {
    /// Registry id of the effect.
    pub effect: String,

    /// Rewind LFO phase whenever the kernel is prepared.
    #[serde(default = "default_reset_phase")]
    pub reset_phase_on_prepare: bool,

    /// Parameter values by name. Missing parameters keep their defaults.
    #[serde(default)]
    pub params: BTreeMap<String, ParamValue>,

    /// Kernel options.
    #[serde(default)]
    pub options: OptionsConfig,
}

impl EffectConfig {
    /// Create a configuration holding only defaults.
    pub fn new(effect: impl Into<String>) -> Self {
        Self {
            effect: effect.into(),
            reset_phase_on_prepare: true,
            params: BTreeMap::new(),
            options: OptionsConfig::default(),
        }
    }

    /// Captures the current values of a store and the given options.
    pub fn capture(effect: impl Into<String>, store: &ParameterStore, options: &KernelOptions) -> Self {
        let params = store
            .params()
            .iter()
            .map(|p| (p.name().to_string(), ParamValue::Number(p.get())))
            .collect();
        Self {
            effect: effect.into(),
            reset_phase_on_prepare: options.reset_phase_on_prepare,
            params,
            options: OptionsConfig {
                lfo_routing: options.lfo_routing.into(),
                polarity: options.polarity.into(),
                interpolation: options.interpolation.into(),
            },
        }
    }

    /// Add a parameter to the configuration.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Replace the options table.
    pub fn with_options(mut self, options: OptionsConfig) -> Self {
        self.options = options;
        self
    }

    /// Set the phase reset policy.
    pub fn with_reset_phase(mut self, reset: bool) -> Self {
        self.reset_phase_on_prepare = reset;
        self
    }

    /// Typed kernel options.
    pub fn kernel_options(&self) -> KernelOptions {
        KernelOptions {
            reset_phase_on_prepare: self.reset_phase_on_prepare,
            lfo_routing: self.options.lfo_routing.into(),
            polarity: self.options.polarity.into(),
            interpolation: self.options.interpolation.into(),
        }
    }

    /// Load a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Resolves every parameter to `(index, unclamped value)`.
    ///
    /// Unknown names and unparsable values are all reported together.
    pub fn resolve(&self, registry: &EffectRegistry) -> ValidationResult<Vec<(usize, f32)>> {
        let effect = validate_effect(registry, &self.effect)?;
        let mut resolved = Vec::with_capacity(self.params.len());
        let mut errors = Vec::new();
        for (name, value) in &self.params {
            match resolve_param(effect, name).and_then(|(i, d)| value.resolve(d).map(|v| (i, v))) {
                Ok(pair) => resolved.push(pair),
                Err(e) => errors.push(e),
            }
        }
        ValidationError::from_list(errors).map(|()| resolved)
    }

    /// Strict check: every name resolves, every value parses and lies in
    /// range.
    pub fn validate(&self, registry: &EffectRegistry) -> ValidationResult<()> {
        let effect = validate_effect(registry, &self.effect)?;
        let mut errors = Vec::new();
        for (name, value) in &self.params {
            let checked = resolve_param(effect, name)
                .and_then(|(_, d)| value.resolve(d).and_then(|v| validate_range(d, v)));
            if let Err(e) = checked {
                errors.push(e);
            }
        }
        ValidationError::from_list(errors)
    }

    /// Writes the configured values into `store`, clamping each to its
    /// range. Returns the number of parameters written.
    ///
    /// Nothing is written if any name or value fails to resolve.
    pub fn apply_to(
        &self,
        registry: &EffectRegistry,
        store: &ParameterStore,
    ) -> Result<usize, ConfigError> {
        let resolved = self.resolve(registry)?;
        for &(index, value) in &resolved {
            store.set_value(index, value);
        }
        Ok(resolved.len())
    }
}
