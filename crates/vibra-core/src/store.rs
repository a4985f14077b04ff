//! Lock-free parameter storage shared between control and audio threads.
//!
//! Each [`Parameter`] owns its descriptor, its current value and the list of
//! observers notified when the value changes. Values are stored as `f32`
//! bit patterns in an [`AtomicU32`], so a reader on the audio thread always
//! observes either the old or the new value, never a partial write.
//!
//! ```rust
//! use vibra_core::{ParamDescriptor, ParamUnit, ParameterStore};
//!
//! const PARAMS: &[ParamDescriptor] = &[
//!     ParamDescriptor::unit_interval("gain", "Gain", 0.5),
//!     ParamDescriptor::new("delay", "Delay", ParamUnit::Seconds, 0.0, 1.0, 0.2),
//! ];
//!
//! let store = ParameterStore::new(PARAMS);
//! assert_eq!(store.get("delay"), Some(0.2));
//!
//! // Out-of-range writes are clamped, never rejected.
//! store.set("gain", 4.0);
//! assert_eq!(store.get("gain"), Some(1.0));
//! ```

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use crate::param::ParamDescriptor;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

/// Callback invoked with the clamped value after every successful write.
pub type Observer = Box<dyn Fn(f32) + Send + Sync>;

/// One named, ranged control.
pub struct Parameter {
    descriptor: ParamDescriptor,
    bits: AtomicU32,
    observers: Vec<Observer>,
}

impl Parameter {
    /// Creates a parameter holding its default value.
    pub fn new(descriptor: ParamDescriptor) -> Self {
        let initial = descriptor.clamp(descriptor.default);
        Self {
            descriptor,
            bits: AtomicU32::new(initial.to_bits()),
            observers: Vec::new(),
        }
    }

    /// Static metadata.
    pub fn descriptor(&self) -> &ParamDescriptor {
        &self.descriptor
    }

    /// Stable name.
    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    /// Current value (lock-free).
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Clamps, stores and notifies. Returns the value actually stored.
    pub fn set(&self, value: f32) -> f32 {
        let clamped = self.descriptor.clamp(value);
        self.bits.store(clamped.to_bits(), Ordering::Release);
        for observer in &self.observers {
            observer(clamped);
        }
        clamped
    }

    /// Registers a change observer.
    pub fn observe(&mut self, observer: Observer) {
        self.observers.push(observer);
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.descriptor.name)
            .field("value", &self.get())
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Ordered collection of parameters for one effect instance.
///
/// The order is the declaration order of the descriptor table passed to
/// [`new`](Self::new) and never changes; kernels address parameters by index
/// on the audio thread and hosts address them by name off it.
///
/// Observers are registered through `&mut self` before the store is shared
/// (typically behind an `Arc`); reads and writes afterwards go through `&self`.
#[derive(Debug)]
pub struct ParameterStore {
    params: Vec<Parameter>,
}

impl ParameterStore {
    /// Creates a store with one parameter per descriptor, each at its default.
    pub fn new(descriptors: &[ParamDescriptor]) -> Self {
        let params: Vec<Parameter> = descriptors.iter().copied().map(Parameter::new).collect();
        #[cfg(feature = "tracing")]
        tracing::debug!(count = params.len(), "parameter store created");
        Self { params }
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if the store holds no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Finds a parameter index by name (case-insensitive).
    ///
    /// Matches against both [`ParamDescriptor::name`] and
    /// [`ParamDescriptor::short_name`].
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| {
            p.descriptor.name.eq_ignore_ascii_case(name)
                || p.descriptor.short_name.eq_ignore_ascii_case(name)
        })
    }

    /// Current value of the named parameter.
    pub fn get(&self, name: &str) -> Option<f32> {
        self.index_of(name).map(|i| self.params[i].get())
    }

    /// Writes the named parameter, clamping to its range and notifying its
    /// observers. Returns the stored value, or `None` for an unknown name.
    pub fn set(&self, name: &str, value: f32) -> Option<f32> {
        self.index_of(name).map(|i| self.params[i].set(value))
    }

    /// Current value by index. Out-of-range indices read as `0.0`.
    #[inline]
    pub fn value(&self, index: usize) -> f32 {
        self.params.get(index).map_or(0.0, Parameter::get)
    }

    /// Writes by index. Out-of-range indices are ignored and return `None`.
    pub fn set_value(&self, index: usize, value: f32) -> Option<f32> {
        self.params.get(index).map(|p| p.set(value))
    }

    /// Parameter at the given index.
    pub fn param(&self, index: usize) -> Option<&Parameter> {
        self.params.get(index)
    }

    /// All parameters in declaration order.
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Descriptors in declaration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ParamDescriptor> + '_ {
        self.params.iter().map(Parameter::descriptor)
    }

    /// Registers an observer on the named parameter.
    ///
    /// Returns `false` if no parameter has that name.
    pub fn observe(&mut self, name: &str, observer: Observer) -> bool {
        match self.index_of(name) {
            Some(i) => {
                self.params[i].observe(observer);
                true
            }
            None => false,
        }
    }

    /// Registers an observer on every parameter.
    ///
    /// The factory receives the parameter index and returns that
    /// parameter's observer.
    pub fn observe_all<F>(&mut self, mut factory: F)
    where
        F: FnMut(usize) -> Observer,
    {
        for (i, param) in self.params.iter_mut().enumerate() {
            param.observe(factory(i));
        }
    }

    /// Restores every parameter to its default, notifying observers.
    pub fn reset_to_defaults(&self) {
        for param in &self.params {
            param.set(param.descriptor.default);
        }
    }

    /// Copies every current value, in declaration order.
    pub fn snapshot(&self) -> Vec<f32> {
        self.params.iter().map(Parameter::get).collect()
    }
}
