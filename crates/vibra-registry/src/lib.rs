//! Effect registry and factory for vibra effect kernels.
//!
//! This crate maps stable effect ids (`"tremolo"`, `"delay"`, ...) to kernel
//! constructors and their static parameter tables, so hosts and tools can
//! select an effect by name at runtime.
//!
//! # Features
//!
//! - **Effect Discovery**: List all available effects with metadata
//! - **Factory Pattern**: Create prepared kernels by id
//! - **Category System**: Effects organized by type
//! - **Parameter Tables**: Build a [`ParameterStore`] for any registered effect
//!
//! # Example
//!
//! ```rust
//! use vibra_core::{KernelOptions, ProcessSpec};
//! use vibra_registry::{EffectCategory, EffectRegistry};
//!
//! let registry = EffectRegistry::new();
//!
//! for effect in registry.all_effects() {
//!     println!("{}: {}", effect.name, effect.description);
//! }
//!
//! let params = registry.create_params("delay").unwrap();
//! let spec = ProcessSpec::new(44100.0, 256, 1);
//! let mut kernel = registry
//!     .create("delay", &spec, &KernelOptions::default(), &params)
//!     .unwrap();
//!
//! let mut block = [0.0f32; 256];
//! kernel.process(&mut [&mut block], &params);
//!
//! for effect in registry.effects_in_category(EffectCategory::Modulation) {
//!     println!("Modulation effect: {}", effect.name);
//! }
//! ```
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! vibra-registry = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, vec::Vec};

use vibra_core::{
    EffectKernel, KernelFactory, KernelOptions, ParamDescriptor, ParameterStore, ProcessSpec,
};
use vibra_effects::{Chorus, ChorusAm, Compressor, Delay, Distortion, GainClip, Phaser, Tremolo};

/// Category of audio effect for organization and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectCategory {
    /// Dynamics processing (compressor)
    Dynamics,
    /// Distortion and waveshaping effects
    Distortion,
    /// Modulation effects (tremolo, chorus, phaser)
    Modulation,
    /// Time-based effects (delay)
    TimeBased,
    /// Utility effects (gain, clip)
    Utility,
}

impl EffectCategory {
    /// Returns a human-readable name for the category.
    pub const fn name(&self) -> &'static str {
        match self {
            EffectCategory::Dynamics => "Dynamics",
            EffectCategory::Distortion => "Distortion",
            EffectCategory::Modulation => "Modulation",
            EffectCategory::TimeBased => "Time-Based",
            EffectCategory::Utility => "Utility",
        }
    }

    /// Returns a description of the category.
    pub const fn description(&self) -> &'static str {
        match self {
            EffectCategory::Dynamics => "Compressors and other dynamics processors",
            EffectCategory::Distortion => "Clipping, folding, crushing and other waveshaping",
            EffectCategory::Modulation => "LFO-driven amplitude, delay and phase modulation",
            EffectCategory::TimeBased => "Delay and other time-based effects",
            EffectCategory::Utility => "Gain stages and utility processors",
        }
    }
}

/// Describes an effect in the registry.
#[derive(Debug, Clone)]
pub struct EffectDescriptor {
    /// Unique identifier for the effect (lowercase, no spaces).
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Brief description of the effect.
    pub description: &'static str,
    /// Category for organization.
    pub category: EffectCategory,
    /// Parameter table in declaration (and persisted state) order.
    pub params: &'static [ParamDescriptor],
}

impl EffectDescriptor {
    /// Number of parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

/// Factory function type for creating prepared kernels.
pub type KernelConstructor =
    fn(&ProcessSpec, &KernelOptions, &ParameterStore) -> Box<dyn EffectKernel>;

fn construct<K: KernelFactory + 'static>(
    spec: &ProcessSpec,
    options: &KernelOptions,
    params: &ParameterStore,
) -> Box<dyn EffectKernel> {
    Box::new(K::create(spec, options, params))
}

/// Internal entry in the registry.
struct RegistryEntry {
    descriptor: EffectDescriptor,
    factory: KernelConstructor,
}

/// Registry of all available effect kernels.
///
/// All built-in effects are registered by [`EffectRegistry::new`]. Ids are
/// matched case-insensitively.
pub struct EffectRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectRegistry {
    /// Create a new registry with all built-in effects registered.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(8),
        };
        registry.register_builtin_effects();
        registry
    }

    fn register_builtin_effects(&mut self) {
        self.register::<Tremolo>(
            "tremolo",
            "Tremolo",
            "Sine amplitude modulation",
            EffectCategory::Modulation,
        );
        self.register::<Delay>(
            "delay",
            "Delay",
            "Feedback delay with wet/dry mix",
            EffectCategory::TimeBased,
        );
        self.register::<Chorus>(
            "chorus",
            "Chorus",
            "Three-voice modulated delay chorus",
            EffectCategory::Modulation,
        );
        self.register::<ChorusAm>(
            "chorus-am",
            "Chorus AM",
            "Single-voice modulated delay with amplitude modulation",
            EffectCategory::Modulation,
        );
        self.register::<Distortion>(
            "distortion",
            "Distortion",
            "Gain into one of ten selectable waveshapers",
            EffectCategory::Distortion,
        );
        self.register::<GainClip>(
            "gain",
            "Gain/Clip",
            "Gain stage into a hard clipper",
            EffectCategory::Utility,
        );
        self.register::<Phaser>(
            "phaser",
            "Phaser",
            "Six-stage all-pass phaser with feedback",
            EffectCategory::Modulation,
        );
        self.register::<Compressor>(
            "compressor",
            "Compressor",
            "Hard-knee peak compressor",
            EffectCategory::Dynamics,
        );
    }

    fn register<K: KernelFactory + 'static>(
        &mut self,
        id: &'static str,
        name: &'static str,
        description: &'static str,
        category: EffectCategory,
    ) {
        self.entries.push(RegistryEntry {
            descriptor: EffectDescriptor {
                id,
                name,
                description,
                category,
                params: K::PARAMS,
            },
            factory: construct::<K>,
        });
    }

    fn entry(&self, id: &str) -> Option<&RegistryEntry> {
        self.entries
            .iter()
            .find(|e| e.descriptor.id.eq_ignore_ascii_case(id))
    }

    /// Returns descriptors for all registered effects.
    pub fn all_effects(&self) -> Vec<&EffectDescriptor> {
        self.entries.iter().map(|e| &e.descriptor).collect()
    }

    /// Returns descriptors for effects in a specific category.
    pub fn effects_in_category(&self, category: EffectCategory) -> Vec<&EffectDescriptor> {
        self.entries
            .iter()
            .filter(|e| e.descriptor.category == category)
            .map(|e| &e.descriptor)
            .collect()
    }

    /// Get a descriptor by effect ID.
    pub fn get(&self, id: &str) -> Option<&EffectDescriptor> {
        self.entry(id).map(|e| &e.descriptor)
    }

    /// Builds a parameter store holding the effect's defaults.
    pub fn create_params(&self, id: &str) -> Option<ParameterStore> {
        self.get(id).map(|d| ParameterStore::new(d.params))
    }

    /// Create a prepared kernel by ID.
    ///
    /// `params` must come from [`create_params`](Self::create_params) for
    /// the same id; a store for a different effect reads mismatched values.
    pub fn create(
        &self,
        id: &str,
        spec: &ProcessSpec,
        options: &KernelOptions,
        params: &ParameterStore,
    ) -> Option<Box<dyn EffectKernel>> {
        self.entry(id).map(|e| (e.factory)(spec, options, params))
    }

    /// The constructor for an effect, for callers that rebuild kernels
    /// without going through the registry each time.
    pub fn constructor(&self, id: &str) -> Option<KernelConstructor> {
        self.entry(id).map(|e| e.factory)
    }

    /// Find a parameter index by name for a given effect type.
    pub fn param_index_by_name(&self, effect_id: &str, param_name: &str) -> Option<usize> {
        self.get(effect_id)?.params.iter().position(|d| {
            d.name.eq_ignore_ascii_case(param_name) || d.short_name.eq_ignore_ascii_case(param_name)
        })
    }

    /// Returns the number of registered effects.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no effects are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = EffectRegistry::new();
        assert_eq!(registry.len(), 8);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_get_effect() {
        let registry = EffectRegistry::new();

        let delay = registry.get("delay");
        assert!(delay.is_some());
        assert_eq!(delay.unwrap().name, "Delay");
        assert_eq!(registry.get("DELAY").unwrap().id, "delay");

        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn test_effects_by_category() {
        let registry = EffectRegistry::new();

        let modulation = registry.effects_in_category(EffectCategory::Modulation);
        assert_eq!(modulation.len(), 4); // Tremolo, Chorus, Chorus AM, Phaser

        assert_eq!(registry.effects_in_category(EffectCategory::Dynamics).len(), 1);
        assert_eq!(registry.effects_in_category(EffectCategory::Distortion).len(), 1);
        assert_eq!(registry.effects_in_category(EffectCategory::TimeBased).len(), 1);
        assert_eq!(registry.effects_in_category(EffectCategory::Utility).len(), 1);
    }

    #[test]
    fn test_category_names() {
        assert_eq!(EffectCategory::Dynamics.name(), "Dynamics");
        assert_eq!(EffectCategory::TimeBased.name(), "Time-Based");
    }

    #[test]
    fn test_effect_descriptor() {
        let registry = EffectRegistry::new();

        let delay = registry.get("delay").unwrap();
        assert_eq!(delay.category, EffectCategory::TimeBased);
        assert_eq!(delay.param_count(), 4);
        let names: Vec<_> = delay.params.iter().map(|p| p.name).collect();
        assert_eq!(names, ["gain", "delay", "feedback", "mix"]);
    }

    #[test]
    fn test_param_index_by_name() {
        let registry = EffectRegistry::new();
        assert_eq!(registry.param_index_by_name("tremolo", "depth"), Some(1));
        assert_eq!(registry.param_index_by_name("tremolo", "DEPTH"), Some(1));
        assert_eq!(registry.param_index_by_name("tremolo", "bogus"), None);
        assert_eq!(registry.param_index_by_name("bogus", "depth"), None);
    }

    #[test]
    fn test_create_params_holds_defaults() {
        let registry = EffectRegistry::new();
        let params = registry.create_params("delay").unwrap();
        assert_eq!(params.snapshot(), [0.5, 0.2, 0.2, 0.5]);
    }

    #[test]
    fn test_all_effects_can_be_created() {
        let registry = EffectRegistry::new();
        let spec = ProcessSpec::new(48000.0, 64, 2);

        for descriptor in registry.all_effects() {
            let params = registry.create_params(descriptor.id).unwrap();
            let kernel = registry.create(descriptor.id, &spec, &KernelOptions::default(), &params);
            assert!(kernel.is_some(), "Failed to create effect: {}", descriptor.id);

            let mut kernel = kernel.unwrap();
            let mut left = [0.5f32; 64];
            let mut right = [-0.5f32; 64];
            kernel.process(&mut [&mut left, &mut right], &params);
            assert!(
                left.iter().chain(right.iter()).all(|s| s.is_finite()),
                "Effect {} produced non-finite output",
                descriptor.id
            );
        }
    }
}
