//! Vibra Effects - effect kernels built on vibra-core
//!
//! Each effect is a fixed wiring of the core primitives, exposed as an
//! [`EffectKernel`](vibra_core::EffectKernel) with a static parameter table:
//!
//! - [`Tremolo`] - Sine amplitude modulation
//! - [`Delay`] - Feedback delay (comb filter)
//! - [`Chorus`] - Three-voice modulated delay
//! - [`ChorusAm`] - Single-voice modulated delay with amplitude modulation
//! - [`Distortion`] - Gain into a selectable waveshaper
//! - [`GainClip`] - Gain into a hard clipper
//! - [`Phaser`] - All-pass phaser behind a [`PhaserEngine`]
//! - [`Compressor`] - Peak compressor behind a [`DynamicsEngine`]
//!
//! ## Example
//!
//! ```rust
//! use vibra_core::{EffectKernel, KernelFactory, KernelOptions, ParameterStore, ProcessSpec};
//! use vibra_effects::Delay;
//!
//! let params = ParameterStore::new(Delay::PARAMS);
//! params.set("feedback", 0.4);
//!
//! let spec = ProcessSpec::new(44100.0, 512, 2);
//! let mut delay = Delay::create(&spec, &KernelOptions::default(), &params);
//!
//! let mut left = vec![0.0f32; 512];
//! let mut right = vec![0.0f32; 512];
//! delay.process(&mut [&mut left, &mut right], &params);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod chorus;
pub mod compressor;
pub mod delay;
pub mod distortion;
pub mod gain;
pub mod phaser;
pub mod tremolo;

// Re-export main types at crate root
pub use chorus::{Chorus, ChorusAm};
pub use compressor::{Compressor, CompressorSettings, DynamicsEngine, PeakCompressor};
pub use delay::Delay;
pub use distortion::Distortion;
pub use gain::GainClip;
pub use phaser::{AllpassPhaser, Phaser, PhaserEngine, PhaserSettings};
pub use tremolo::Tremolo;
