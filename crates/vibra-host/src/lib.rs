//! Vibra Host - effect instances for hosts and tools
//!
//! Wraps a registered kernel in the lifecycle a plugin host drives:
//!
//! - [`EffectInstance`] - `prepare`/`process`/`release`, f64 buffers,
//!   state save/load and parameter-change notification
//! - [`StateReport`] - Size check returned when state is loaded
//! - [`HostError`] - Construction and preparation failures
//!
//! # Example
//!
//! ```rust
//! use vibra_core::{KernelOptions, ProcessSpec};
//! use vibra_host::EffectInstance;
//!
//! let mut delay = EffectInstance::new("delay", KernelOptions::default()).unwrap();
//! delay.params().set("feedback", 0.5);
//! delay.prepare(ProcessSpec::new(44100.0, 256, 2)).unwrap();
//!
//! let mut left = vec![0.0f32; 256];
//! let mut right = vec![0.0f32; 256];
//! delay.process(&mut [&mut left, &mut right]);
//!
//! let state = delay.save_state();
//! assert_eq!(state.len(), 16);
//! ```

mod error;
mod instance;

pub use error::HostError;
pub use instance::{EffectInstance, HostNotify, MAX_F64_CHANNELS, StateReport};
