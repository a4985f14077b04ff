//! Gain stage with a hard clipper.
//!
//! `out = clamp(in · gain, ±0.05 / clip)`.

use vibra_core::waveshaper::{CLIP_BASE, hard_clip};
use vibra_core::{
    EffectKernel, KernelFactory, KernelOptions, ParamDescriptor, ParamUnit, ParameterStore,
    ProcessSpec,
};

/// Gain parameter index.
pub const GAIN: usize = 0;
/// Clip intensity parameter index.
pub const CLIP: usize = 1;

/// Gain/clip kernel.
///
/// ## Parameters
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | 0 | gain | 0–2 | 0.5 |
/// | 1 | clip | 0.01–10 | 5.0 |
#[derive(Debug, Clone, Default)]
pub struct GainClip {
    channels: usize,
}

impl KernelFactory for GainClip {
    const PARAMS: &'static [ParamDescriptor] = &[
        ParamDescriptor::new("gain", "Gain", ParamUnit::None, 0.0, 2.0, 0.5),
        ParamDescriptor::new("clip", "Clip", ParamUnit::None, 0.01, 10.0, 5.0),
    ];

    fn create(spec: &ProcessSpec, _options: &KernelOptions, params: &ParameterStore) -> Self {
        let mut kernel = Self::default();
        kernel.prepare(spec, params);
        kernel
    }
}

impl EffectKernel for GainClip {
    fn prepare(&mut self, spec: &ProcessSpec, _params: &ParameterStore) {
        self.channels = spec.channels;
    }

    fn process(&mut self, buffer: &mut [&mut [f32]], params: &ParameterStore) {
        let gain = params.value(GAIN);
        let threshold = CLIP_BASE / params.value(CLIP);
        for channel in buffer.iter_mut().take(self.channels) {
            for sample in channel.iter_mut() {
                *sample = hard_clip(*sample * gain, threshold);
            }
        }
    }

    fn reset(&mut self) {}

    fn release(&mut self) {
        self.channels = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_from_clip() {
        let params = ParameterStore::new(GainClip::PARAMS);
        let mut kernel = GainClip::create(
            &ProcessSpec::default(),
            &KernelOptions::default(),
            &params,
        );
        params.set("gain", 1.0);
        params.set("clip", 0.1);
        // threshold 0.5
        let mut block = [0.2f32, 0.9, -0.9];
        kernel.process(&mut [&mut block], &params);
        assert!((block[0] - 0.2).abs() < 1e-6);
        assert!((block[1] - 0.5).abs() < 1e-6);
        assert!((block[2] + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_clip_floor_keeps_threshold_finite() {
        let params = ParameterStore::new(GainClip::PARAMS);
        params.set("clip", 0.0);
        assert_eq!(params.get("clip"), Some(0.01));
        let mut kernel = GainClip::create(
            &ProcessSpec::default(),
            &KernelOptions::default(),
            &params,
        );
        let mut block = [100.0f32];
        kernel.process(&mut [&mut block], &params);
        assert!(block[0].is_finite());
    }
}
