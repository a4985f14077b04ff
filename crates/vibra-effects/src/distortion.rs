//! Multi-mode distortion: input gain followed by one waveshaper.
//!
//! The mode and its coefficients are read once per block and turned into a
//! [`Waveshaper`]; the sample loop is a single table-dispatched call.
//!
//! | Mode | Shaper | Knobs used |
//! |------|--------|------------|
//! | 0 | bypass | |
//! | 1 | arctan soft clip | `drive` |
//! | 2 | cubic soft clip | `cubic` |
//! | 3 | triangle fold | |
//! | 4 | threshold gap | `gap_low`, `gap_high` |
//! | 5 | bit crush | `bits` |
//! | 6 | dropout | `drop` |
//! | 7 | wavefold | `fold` |
//! | 8 | hard clip | `clip` |
//! | 9 | saturated fuzz | `saturation`, `mix`, `clip` |
//! | 10 | unspecified (pass-through) | |

use vibra_core::{
    DistortionMode, EffectKernel, KernelFactory, KernelOptions, Lcg, ParamDescriptor, ParamUnit,
    ParameterStore, ProcessSpec, ShaperSettings, Waveshaper,
};

/// Input gain parameter index.
pub const GAIN: usize = 0;
/// Mode selector parameter index.
pub const MODE: usize = 1;
/// Arctan drive parameter index.
pub const DRIVE: usize = 2;
/// Cubic coefficient parameter index.
pub const CUBIC: usize = 3;
/// Fuzz saturation parameter index.
pub const SATURATION: usize = 4;
/// Fuzz blend parameter index.
pub const MIX: usize = 5;
/// Clip intensity parameter index.
pub const CLIP: usize = 6;
/// Fold intensity parameter index.
pub const FOLD: usize = 7;
/// Lower gap intensity parameter index.
pub const GAP_LOW: usize = 8;
/// Upper gap intensity parameter index.
pub const GAP_HIGH: usize = 9;
/// Bit depth parameter index.
pub const BITS: usize = 10;
/// Dropout probability parameter index.
pub const DROP: usize = 11;

/// Distortion kernel.
///
/// ## Parameters
///
/// | Index | Name | Range | Default | Note |
/// |-------|------|-------|---------|------|
/// | 0 | gain | 0–3 | 1.0 | |
/// | 1 | mode | 0–10 | 0 | stepped |
/// | 2 | drive | 0–20 | 1.0 | 0 silences mode 1: `atan(0·x) = 0`, not a clean signal |
/// | 3 | cubic | 0–1 | ⅓ | |
/// | 4 | saturation | 1–10 | 1.0 | |
/// | 5 | mix | 0–1 | 0.5 | fuzz blend |
/// | 6 | clip | 0.01–10 | 5.0 | threshold `0.05/clip` |
/// | 7 | fold | 0.01–10 | 1.0 | |
/// | 8 | gap_low | 0.01–20 | 8.0 | |
/// | 9 | gap_high | 0.01–20 | 4.0 | |
/// | 10 | bits | 1–16 | 8 | stepped |
/// | 11 | drop | 0–1 | 0.1 | |
///
/// Intensity knobs (`clip`, `fold`, `gap_low`, `gap_high`) map inversely to
/// internal thresholds (`base / knob`); their ranges exclude zero.
#[derive(Debug, Clone)]
pub struct Distortion {
    rng: Lcg,
    channels: usize,
}

impl Distortion {
    /// Builds the shaper for the current parameter values.
    pub fn shaper(params: &ParameterStore) -> Waveshaper {
        let settings = ShaperSettings {
            drive: params.value(DRIVE),
            cubic: params.value(CUBIC),
            saturation: params.value(SATURATION),
            mix: params.value(MIX),
            clip: params.value(CLIP),
            fold: params.value(FOLD),
            gap_low: params.value(GAP_LOW),
            gap_high: params.value(GAP_HIGH),
            bits: params.value(BITS),
            drop: params.value(DROP),
        };
        Waveshaper::from_config(DistortionMode::from_param(params.value(MODE)), &settings)
    }
}

impl KernelFactory for Distortion {
    const PARAMS: &'static [ParamDescriptor] = &[
        ParamDescriptor::new("gain", "Gain", ParamUnit::None, 0.0, 3.0, 1.0),
        ParamDescriptor::stepped(
            "mode",
            "Mode",
            ParamUnit::None,
            0.0,
            (DistortionMode::COUNT - 1) as f32,
            0.0,
        ),
        ParamDescriptor::new("drive", "Drive", ParamUnit::None, 0.0, 20.0, 1.0),
        ParamDescriptor::new("cubic", "Cubic", ParamUnit::None, 0.0, 1.0, 1.0 / 3.0),
        ParamDescriptor::new("saturation", "Sat", ParamUnit::None, 1.0, 10.0, 1.0),
        ParamDescriptor::unit_interval("mix", "Mix", 0.5),
        ParamDescriptor::new("clip", "Clip", ParamUnit::None, 0.01, 10.0, 5.0),
        ParamDescriptor::new("fold", "Fold", ParamUnit::None, 0.01, 10.0, 1.0),
        ParamDescriptor::new("gap_low", "Gap Lo", ParamUnit::None, 0.01, 20.0, 8.0),
        ParamDescriptor::new("gap_high", "Gap Hi", ParamUnit::None, 0.01, 20.0, 4.0),
        ParamDescriptor::stepped("bits", "Bits", ParamUnit::Bits, 1.0, 16.0, 8.0),
        ParamDescriptor::unit_interval("drop", "Drop", 0.1),
    ];

    fn create(spec: &ProcessSpec, _options: &KernelOptions, params: &ParameterStore) -> Self {
        let mut distortion = Self {
            rng: Lcg::default(),
            channels: 0,
        };
        distortion.prepare(spec, params);
        distortion
    }
}

impl EffectKernel for Distortion {
    fn prepare(&mut self, spec: &ProcessSpec, _params: &ParameterStore) {
        self.channels = spec.channels;
        self.rng.reset();
    }

    fn process(&mut self, buffer: &mut [&mut [f32]], params: &ParameterStore) {
        let gain = params.value(GAIN);
        let shaper = Self::shaper(params);
        for channel in buffer.iter_mut().take(self.channels) {
            for sample in channel.iter_mut() {
                *sample = shaper.shape(*sample * gain, &mut self.rng);
            }
        }
    }

    fn reset(&mut self) {
        self.rng.reset();
    }

    fn release(&mut self) {
        self.channels = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distortion() -> (Distortion, ParameterStore) {
        let params = ParameterStore::new(Distortion::PARAMS);
        let kernel = Distortion::create(
            &ProcessSpec::new(48000.0, 64, 2),
            &KernelOptions::default(),
            &params,
        );
        (kernel, params)
    }

    fn run(kernel: &mut Distortion, params: &ParameterStore, input: &[f32]) -> Vec<f32> {
        let mut block = input.to_vec();
        kernel.process(&mut [&mut block], params);
        block
    }

    #[test]
    fn test_bypass_applies_gain_only() {
        let (mut kernel, params) = distortion();
        params.set("gain", 2.0);
        assert_eq!(run(&mut kernel, &params, &[0.1, -0.4]), vec![0.2, -0.8]);
    }

    #[test]
    fn test_arctan_zero_drive_is_silent() {
        let (mut kernel, params) = distortion();
        params.set("mode", 1.0);
        params.set("drive", 0.0);
        assert_eq!(run(&mut kernel, &params, &[0.5, -0.9, 1.0]), vec![0.0; 3]);
    }

    #[test]
    fn test_mode_selection() {
        let (mut kernel, params) = distortion();
        params.set("mode", 8.0);
        params.set("clip", 1.0);
        // 0.05 / 1.0
        assert_eq!(run(&mut kernel, &params, &[0.5, -0.5, 0.01]), vec![0.05, -0.05, 0.01]);

        params.set("mode", 3.0);
        let out = run(&mut kernel, &params, &[0.0]);
        assert_eq!(out, vec![1.0], "triangle fold of 0 is |2| − 1");
    }

    #[test]
    fn test_gain_precedes_shaper() {
        let (mut kernel, params) = distortion();
        params.set("mode", 5.0);
        params.set("bits", 2.0);
        params.set("gain", 2.0);
        // 0.2 · 2 = 0.4 → ceil(0.4 · 2) / 2 = 0.5
        assert_eq!(run(&mut kernel, &params, &[0.2]), vec![0.5]);
    }

    #[test]
    fn test_dropout_extremes() {
        let (mut kernel, params) = distortion();
        params.set("mode", 6.0);
        params.set("drop", 1.0);
        let out = run(&mut kernel, &params, &[0.5; 64]);
        assert!(out.iter().all(|&s| s == 0.0));
        params.set("drop", 0.0);
        let out = run(&mut kernel, &params, &[0.5; 64]);
        assert!(out.iter().all(|&s| s == 0.5));
    }

    #[test]
    fn test_unspecified_mode_passes_through() {
        let (mut kernel, params) = distortion();
        params.set("mode", 10.0);
        assert_eq!(run(&mut kernel, &params, &[0.3, -0.7]), vec![0.3, -0.7]);
    }

    #[test]
    fn test_mode_parameter_is_stepped() {
        let (_, params) = distortion();
        assert_eq!(params.set("mode", 2.4), Some(2.0));
        assert_eq!(params.set("mode", 99.0), Some(10.0));
        assert_eq!(
            Distortion::shaper(&params).mode(),
            DistortionMode::Unspecified
        );
    }

    #[test]
    fn test_reset_reseeds_noise() {
        let (mut kernel, params) = distortion();
        params.set("mode", 6.0);
        params.set("drop", 0.5);
        let input = [1.0f32; 128];
        let first = run(&mut kernel, &params, &input);
        kernel.reset();
        let second = run(&mut kernel, &params, &input);
        assert_eq!(first, second);
    }
}
