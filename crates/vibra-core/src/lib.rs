//! Vibra Core - real-time DSP kernel for modulation, delay and distortion effects
//!
//! This crate holds the pieces every vibra effect is wired from, designed for
//! real-time audio processing with zero allocation in the audio path.
//!
//! # Core Abstractions
//!
//! ## Parameters
//!
//! - [`ParamDescriptor`] - Static name, range, default and unit
//! - [`ParameterStore`] - Lock-free atomic values with change observers
//! - [`StateCodec`] - Fixed-order little-endian float persistence
//!
//! ## Signal Primitives
//!
//! - [`Oscillator`] - Phase-accumulating LFO with a pluggable waveform
//! - [`OscillatorBank`] - One LFO per channel at a shared rate
//! - [`DelayLine`] - Multi-channel ring buffer with linear/Thiran reads and feedback
//! - [`Waveshaper`] - Table-dispatched distortion transfer functions
//! - [`EnvelopeFollower`] - Peak detector for dynamics
//! - [`FirstOrderAllpass`] - Phase-shift section for phasers
//!
//! ## Kernel Contract
//!
//! - [`EffectKernel`] - Object-safe `prepare`/`process`/`release` interface
//! - [`KernelFactory`] - Parameter table plus prepared constructor
//! - [`ProcessSpec`], [`KernelOptions`] - Host and per-instance configuration
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (it needs `alloc`). Disable the default
//! `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! vibra-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use vibra_core::{DelayLine, Interpolation, Oscillator};
//!
//! let sample_rate = 44100.0;
//! let mut lfo = Oscillator::new(sample_rate, 2.0);
//! let mut line = DelayLine::new(Interpolation::Linear);
//! line.prepare(1, vibra_core::delay::capacity_for(sample_rate, 0.03));
//!
//! for n in 0..256 {
//!     let dry = (n as f32 * 0.01).sin();
//!     line.push(0, dry);
//!     let d = (lfo.next_sample() * 0.015 + 0.015) * sample_rate;
//!     let _wet = line.pop(0, d, true);
//! }
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: No allocations or locks in `process`
//! - **Clamp, don't fail**: Out-of-range input is clamped; the kernel has no error surface
//! - **Object-safe kernels**: Effects are selected at runtime through `dyn EffectKernel`

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod allpass;
pub mod delay;
pub mod envelope;
pub mod kernel;
pub mod math;
pub mod oscillator;
pub mod param;
pub mod state;
pub mod store;
pub mod waveshaper;

// Re-export main types at crate root
pub use allpass::FirstOrderAllpass;
pub use delay::{DelayLine, Interpolation, capacity_for};
pub use envelope::EnvelopeFollower;
pub use kernel::{
    EffectKernel, KernelFactory, KernelOptions, LfoRouting, ModulationPolarity, ProcessSpec,
};
pub use math::{db_to_linear, flush_denormal, linear_to_db, wet_dry_mix};
pub use oscillator::{Oscillator, OscillatorBank, Waveform};
pub use param::{ParamDescriptor, ParamFlags, ParamUnit};
pub use state::StateCodec;
pub use store::{Observer, Parameter, ParameterStore};
pub use waveshaper::{DistortionMode, Lcg, ShaperCoefficients, ShaperSettings, Waveshaper};
