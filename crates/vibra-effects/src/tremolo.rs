//! Sine tremolo: amplitude modulation by a per-sample LFO.
//!
//! `out = in · polarity(lfo, depth) · gain`, where the default bipolar
//! mapping is `depth·lfo + 1 − depth`.

use vibra_core::{
    EffectKernel, KernelFactory, KernelOptions, OscillatorBank, ParamDescriptor, ParamUnit,
    ParameterStore, ProcessSpec,
};

/// LFO rate parameter index.
pub const RATE: usize = 0;
/// Modulation depth parameter index.
pub const DEPTH: usize = 1;
/// Output gain parameter index.
pub const GAIN: usize = 2;

/// Tremolo kernel.
///
/// ## Parameters
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | 0 | rate | 0–20 Hz | 5.0 |
/// | 1 | depth | 0–1 | 0.5 |
/// | 2 | gain | 0–1 | 1.0 |
///
/// With [`LfoRouting::Shared`](vibra_core::LfoRouting::Shared) every
/// channel sees the same LFO value for a given sample; with
/// [`LfoRouting::PerChannel`](vibra_core::LfoRouting::PerChannel) the
/// channels are offset by `2π·k/channels`, so a stereo pair pulses in
/// antiphase.
#[derive(Debug, Clone)]
pub struct Tremolo {
    lfos: OscillatorBank,
    options: KernelOptions,
}

impl KernelFactory for Tremolo {
    const PARAMS: &'static [ParamDescriptor] = &[
        ParamDescriptor::new("rate", "Rate", ParamUnit::Hertz, 0.0, 20.0, 5.0),
        ParamDescriptor::unit_interval("depth", "Depth", 0.5),
        ParamDescriptor::unit_interval("gain", "Gain", 1.0),
    ];

    fn create(spec: &ProcessSpec, options: &KernelOptions, params: &ParameterStore) -> Self {
        let mut tremolo = Self {
            lfos: OscillatorBank::with_routing(options.lfo_routing),
            options: *options,
        };
        tremolo.prepare(spec, params);
        tremolo
    }
}

impl EffectKernel for Tremolo {
    fn prepare(&mut self, spec: &ProcessSpec, params: &ParameterStore) {
        self.lfos.prepare(
            spec.channels,
            spec.sample_rate,
            params.value(RATE),
            self.options.reset_phase_on_prepare,
        );
    }

    fn process(&mut self, buffer: &mut [&mut [f32]], params: &ParameterStore) {
        let depth = params.value(DEPTH);
        let gain = params.value(GAIN);
        let polarity = self.options.polarity;
        self.lfos.set_frequency(params.value(RATE));

        for (channel, lfo) in buffer.iter_mut().zip(self.lfos.oscillators_mut().iter_mut()) {
            for sample in channel.iter_mut() {
                *sample *= polarity.apply(lfo.next_sample(), depth) * gain;
            }
        }
    }

    fn reset(&mut self) {}

    fn release(&mut self) {
        self.lfos.release();
    }
}
