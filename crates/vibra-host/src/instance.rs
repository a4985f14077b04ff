//! One effect as a host sees it.
//!
//! [`EffectInstance`] ties a registered kernel to its shared
//! [`ParameterStore`] and runs the `prepare`/`process`/`release` lifecycle:
//!
//! ```text
//! new ──► prepare ──► process* ──► release ──► prepare ──► ...
//!           ▲                                     │
//!           └─────────── (spec change) ───────────┘
//! ```
//!
//! Before the first `prepare` and after `release`, `process` leaves audio
//! untouched. Parameters live behind an `Arc` so a control thread can write
//! them while the audio thread processes.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use vibra_config::EffectConfig;
use vibra_core::{EffectKernel, KernelOptions, ParameterStore, ProcessSpec, StateCodec};
use vibra_registry::{EffectRegistry, KernelConstructor};

use crate::error::HostError;

/// Channels [`EffectInstance::process_f64`] converts; further channels pass
/// through.
pub const MAX_F64_CHANNELS: usize = 16;

/// Callback told about every parameter write as `(index, value)`.
pub struct HostNotify(Box<dyn Fn(usize, f32) + Send + Sync>);

type NotifySlot = Arc<ArcSwapOption<HostNotify>>;

/// Outcome of [`EffectInstance::load_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateReport {
    /// Bytes a full state for this effect occupies.
    pub expected: usize,
    /// Bytes supplied.
    pub received: usize,
}

impl StateReport {
    /// `true` when the supplied state had exactly the expected size.
    pub fn is_exact(&self) -> bool {
        self.expected == self.received
    }
}

/// A registered effect, its parameters and its kernel lifecycle.
pub struct EffectInstance {
    effect_id: &'static str,
    constructor: KernelConstructor,
    options: KernelOptions,
    params: Arc<ParameterStore>,
    notify: NotifySlot,
    kernel: Option<Box<dyn EffectKernel>>,
    spec: Option<ProcessSpec>,
    scratch: Vec<f32>,
}

impl EffectInstance {
    /// Creates an unprepared instance of a registered effect with its
    /// parameters at their defaults.
    pub fn new(effect_id: &str, options: KernelOptions) -> Result<Self, HostError> {
        Self::with_registry(&EffectRegistry::new(), effect_id, options)
    }

    /// Like [`new`](Self::new), resolving the id in a caller-held registry.
    pub fn with_registry(
        registry: &EffectRegistry,
        effect_id: &str,
        options: KernelOptions,
    ) -> Result<Self, HostError> {
        let unknown = || HostError::UnknownEffect(effect_id.to_string());
        let descriptor = registry.get(effect_id).ok_or_else(unknown)?;
        let constructor = registry.constructor(effect_id).ok_or_else(unknown)?;

        let notify: NotifySlot = Arc::new(ArcSwapOption::empty());
        let mut params = ParameterStore::new(descriptor.params);
        params.observe_all(|index| {
            let slot = Arc::clone(&notify);
            Box::new(move |value: f32| {
                if let Some(notify) = &*slot.load() {
                    (notify.0)(index, value);
                }
            })
        });

        tracing::debug!(effect = descriptor.id, params = params.len(), "effect instance created");

        Ok(Self {
            effect_id: descriptor.id,
            constructor,
            options,
            params: Arc::new(params),
            notify,
            kernel: None,
            spec: None,
            scratch: Vec::new(),
        })
    }

    /// Builds an instance from a configuration: its effect, its options and
    /// its parameter values (clamped).
    pub fn from_config(config: &EffectConfig) -> Result<Self, HostError> {
        let registry = EffectRegistry::new();
        let instance = Self::with_registry(&registry, &config.effect, config.kernel_options())?;
        config.apply_to(&registry, &instance.params)?;
        Ok(instance)
    }

    /// Registry id of the effect.
    pub fn effect_id(&self) -> &'static str {
        self.effect_id
    }

    /// Options the kernel is built with.
    pub fn options(&self) -> &KernelOptions {
        &self.options
    }

    /// The shared parameter store. Clone the `Arc` to write parameters from
    /// another thread.
    pub fn params(&self) -> &Arc<ParameterStore> {
        &self.params
    }

    /// The spec of the last successful `prepare`, while prepared.
    pub fn spec(&self) -> Option<ProcessSpec> {
        self.spec
    }

    /// `true` between `prepare` and `release`.
    pub fn is_prepared(&self) -> bool {
        self.spec.is_some()
    }

    /// Installs the callback told about every parameter write, replacing
    /// any previous one. Safe to call while another thread writes.
    pub fn set_host_notify<F>(&self, notify: F)
    where
        F: Fn(usize, f32) + Send + Sync + 'static,
    {
        self.notify.store(Some(Arc::new(HostNotify(Box::new(notify)))));
    }

    /// Removes the host callback.
    pub fn clear_host_notify(&self) {
        self.notify.store(None);
    }

    /// Sizes the kernel for `spec`. May allocate; call off the audio thread.
    ///
    /// The first call builds the kernel; later calls re-prepare it, which
    /// keeps LFO phase unless the instance was built with
    /// `reset_phase_on_prepare`.
    pub fn prepare(&mut self, spec: ProcessSpec) -> Result<(), HostError> {
        if !spec.is_valid() {
            return Err(HostError::InvalidSpec {
                sample_rate: spec.sample_rate,
                channels: spec.channels,
            });
        }

        match self.kernel.as_mut() {
            Some(kernel) => kernel.prepare(&spec, &self.params),
            None => self.kernel = Some((self.constructor)(&spec, &self.options, &self.params)),
        }

        let block = spec.max_block_size.max(1);
        self.scratch.clear();
        self.scratch
            .resize(spec.channels.min(MAX_F64_CHANNELS) * block, 0.0);
        self.spec = Some(spec);

        tracing::debug!(
            effect = self.effect_id,
            sample_rate = spec.sample_rate,
            channels = spec.channels,
            max_block_size = spec.max_block_size,
            "prepared"
        );
        Ok(())
    }

    /// Processes one block in place. Each inner slice is one channel.
    ///
    /// Passes audio through while unprepared.
    #[inline]
    pub fn process(&mut self, buffer: &mut [&mut [f32]]) {
        if self.spec.is_none() {
            return;
        }
        if let Some(kernel) = self.kernel.as_mut() {
            kernel.process(buffer, &self.params);
        }
    }

    /// Processes a double-precision block through the f32 kernel.
    ///
    /// Samples are converted in chunks of the prepared block size through a
    /// scratch buffer sized at `prepare`; nothing is allocated here. At most
    /// [`MAX_F64_CHANNELS`] channels are processed, and frames past the end
    /// of the shortest channel are left untouched.
    pub fn process_f64(&mut self, buffer: &mut [&mut [f64]]) {
        let Some(spec) = self.spec else {
            return;
        };
        let Some(kernel) = self.kernel.as_mut() else {
            return;
        };

        let block = spec.max_block_size.max(1);
        let channels = buffer.len().min(self.scratch.len() / block);
        let frames = buffer[..channels].iter().map(|c| c.len()).min().unwrap_or(0);

        let mut start = 0;
        while start < frames {
            let n = (frames - start).min(block);
            let mut refs: [&mut [f32]; MAX_F64_CHANNELS] = Default::default();
            for ((slot, chunk), src) in refs
                .iter_mut()
                .zip(self.scratch.chunks_exact_mut(block))
                .zip(buffer.iter())
            {
                let chunk = &mut chunk[..n];
                for (d, s) in chunk.iter_mut().zip(&src[start..start + n]) {
                    *d = *s as f32;
                }
                *slot = chunk;
            }

            kernel.process(&mut refs[..channels], &self.params);

            for (src, dst) in refs[..channels].iter().zip(buffer.iter_mut()) {
                for (d, s) in dst[start..start + n].iter_mut().zip(src.iter()) {
                    *d = f64::from(*s);
                }
            }
            start += n;
        }
    }

    /// Clears signal state (delay contents, detector memories).
    pub fn reset(&mut self) {
        if let Some(kernel) = self.kernel.as_mut() {
            kernel.reset();
        }
    }

    /// Frees the kernel's buffers. Audio passes through until the next
    /// `prepare`.
    pub fn release(&mut self) {
        if let Some(kernel) = self.kernel.as_mut() {
            kernel.release();
        }
        self.scratch = Vec::new();
        if self.spec.take().is_some() {
            tracing::debug!(effect = self.effect_id, "released");
        }
    }

    /// Reported processing latency in samples.
    pub fn latency_samples(&self) -> usize {
        self.kernel.as_ref().map_or(0, |k| k.latency_samples())
    }

    /// Reported tail length in seconds at the current parameter values.
    pub fn tail_seconds(&self) -> f32 {
        self.kernel
            .as_ref()
            .map_or(0.0, |k| k.tail_seconds(&self.params))
    }

    /// Serializes every parameter value in declaration order.
    pub fn save_state(&self) -> Vec<u8> {
        StateCodec::encode(&self.params)
    }

    /// Restores parameter values from [`save_state`](Self::save_state) bytes.
    ///
    /// Missing trailing values become `0.0` (then clamped) and surplus bytes
    /// are ignored. A size mismatch is logged and reported, not rejected.
    pub fn load_state(&self, bytes: &[u8]) -> StateReport {
        StateCodec::decode(bytes, &self.params);
        let report = StateReport {
            expected: StateCodec::encoded_len(&self.params),
            received: bytes.len(),
        };
        if !report.is_exact() {
            tracing::warn!(
                effect = self.effect_id,
                bytes = report.received,
                expected = report.expected,
                "state size mismatch"
            );
        }
        report
    }
}

impl std::fmt::Debug for EffectInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectInstance")
            .field("effect_id", &self.effect_id)
            .field("options", &self.options)
            .field("spec", &self.spec)
            .field("params", &self.params.snapshot())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn delay() -> EffectInstance {
        EffectInstance::new("delay", KernelOptions::default()).unwrap()
    }

    #[test]
    fn test_unknown_effect() {
        let err = EffectInstance::new("reverb", KernelOptions::default()).unwrap_err();
        assert!(matches!(err, HostError::UnknownEffect(ref id) if id == "reverb"));
    }

    #[test]
    fn test_unprepared_passes_through() {
        let mut instance = delay();
        assert!(!instance.is_prepared());
        let mut block = [0.3f32; 32];
        instance.process(&mut [&mut block]);
        assert!(block.iter().all(|&s| s == 0.3));
    }

    #[test]
    fn test_invalid_spec_rejected() {
        let mut instance = delay();
        let err = instance.prepare(ProcessSpec::new(0.0, 64, 2)).unwrap_err();
        assert!(matches!(err, HostError::InvalidSpec { .. }));
        assert!(!instance.is_prepared());
    }

    #[test]
    fn test_release_then_pass_through() {
        let mut instance = delay();
        instance.prepare(ProcessSpec::new(48000.0, 64, 1)).unwrap();
        assert!(instance.is_prepared());

        let mut block = [1.0f32; 64];
        instance.process(&mut [&mut block]);
        assert!((block[0] - 0.25).abs() < 1e-6);

        instance.release();
        assert!(!instance.is_prepared());
        let mut block = [1.0f32; 64];
        instance.process(&mut [&mut block]);
        assert!(block.iter().all(|&s| s == 1.0));
    }

    #[test]
    fn test_host_notify() {
        let instance = delay();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        instance.set_host_notify(move |i, v| sink.lock().unwrap().push((i, v)));

        instance.params().set("feedback", 2.0);
        instance.params().set_value(0, 0.25);
        assert_eq!(*seen.lock().unwrap(), [(2, 1.0), (0, 0.25)]);

        instance.clear_host_notify();
        instance.params().set("mix", 0.1);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_load_state_reports_mismatch() {
        let instance = delay();
        let report = instance.load_state(&0.9f32.to_le_bytes());
        assert_eq!(
            report,
            StateReport {
                expected: 16,
                received: 4
            }
        );
        assert!(!report.is_exact());
        assert_eq!(instance.params().snapshot(), [0.9, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_from_config() {
        let config = EffectConfig::new("tremolo").with_param("depth", "25%");
        let instance = EffectInstance::from_config(&config).unwrap();
        assert_eq!(instance.effect_id(), "tremolo");
        assert_eq!(instance.params().get("depth"), Some(0.25));

        let bad = EffectConfig::new("tremolo").with_param("speed", 1.0);
        assert!(matches!(
            EffectInstance::from_config(&bad),
            Err(HostError::Config(_))
        ));
    }

    #[test]
    fn test_process_f64_matches_f32() {
        let mut a = EffectInstance::new("chorus", KernelOptions::default()).unwrap();
        let mut b = EffectInstance::new("chorus", KernelOptions::default()).unwrap();
        a.prepare(ProcessSpec::new(48000.0, 64, 2)).unwrap();
        b.prepare(ProcessSpec::new(48000.0, 64, 2)).unwrap();

        // 200 frames forces several chunks of the 64-sample scratch.
        let input: Vec<f32> = (0..200).map(|i| ((i as f32) * 0.05).sin() * 0.5).collect();
        let mut l32 = input.clone();
        let mut r32 = input.clone();
        for (l, r) in l32.chunks_mut(64).zip(r32.chunks_mut(64)) {
            a.process(&mut [l, r]);
        }

        let mut l64: Vec<f64> = input.iter().map(|&s| f64::from(s)).collect();
        let mut r64 = l64.clone();
        b.process_f64(&mut [&mut l64, &mut r64]);

        for (x, y) in l32.iter().zip(&l64) {
            assert!((f64::from(*x) - y).abs() < 1e-6);
        }
        for (x, y) in r32.iter().zip(&r64) {
            assert!((f64::from(*x) - y).abs() < 1e-6);
        }
    }
}
