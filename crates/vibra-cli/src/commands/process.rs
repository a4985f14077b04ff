//! File-based effect processing command.

use super::common::EffectSelection;
use crate::wav::{read_wav, write_wav};
use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use vibra_core::{ProcessSpec, linear_to_db};
use vibra_host::EffectInstance;

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    #[command(flatten)]
    selection: EffectSelection,

    /// Binary parameter state to load after the configuration
    #[arg(long)]
    state: Option<PathBuf>,

    /// Processing block size
    #[arg(long, default_value = "512")]
    block_size: usize,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32", value_parser = parse_bit_depth)]
    bit_depth: u16,

    /// Append the effect's reported tail (capped at --max-tail seconds)
    #[arg(long)]
    tail: bool,

    /// Longest tail to render, in seconds
    #[arg(long, default_value = "10")]
    max_tail: f32,
}

fn parse_bit_depth(s: &str) -> Result<u16, String> {
    match s.parse::<u16>() {
        Ok(bits @ (16 | 24 | 32)) => Ok(bits),
        _ => Err(format!("unsupported bit depth '{s}' (expected 16, 24 or 32)")),
    }
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    let config = args.selection.to_config()?;
    let mut instance = EffectInstance::from_config(&config)?;

    if let Some(path) = &args.state {
        let bytes =
            std::fs::read(path).with_context(|| format!("reading state {}", path.display()))?;
        let report = instance.load_state(&bytes);
        if !report.is_exact() {
            println!(
                "Warning: state has {} bytes, {} expected",
                report.received, report.expected
            );
        }
    }

    println!("Reading {}...", args.input.display());
    let (mut channels, spec) = read_wav(&args.input)?;
    let sample_rate = spec.sample_rate as f32;
    let frames = channels.first().map_or(0, Vec::len);
    println!(
        "  {} frames, {} channel(s), {} Hz, {:.2}s",
        frames,
        channels.len(),
        spec.sample_rate,
        frames as f32 / sample_rate
    );

    let input_stats = Stats::measure(&channels);

    if args.tail {
        let tail_seconds = instance.tail_seconds().min(args.max_tail.max(0.0));
        let extra = (tail_seconds * sample_rate).ceil() as usize;
        for channel in &mut channels {
            channel.resize(frames + extra, 0.0);
        }
        tracing::debug!(tail_seconds, extra, "appending tail");
    }
    let total = channels.first().map_or(0, Vec::len);

    let block_size = args.block_size.max(1);
    instance.prepare(ProcessSpec::new(sample_rate, block_size, channels.len()))?;
    println!("Processing with {}...", instance.effect_id());

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let mut pos = 0;
    while pos < total {
        let n = (total - pos).min(block_size);
        let mut block: Vec<&mut [f32]> = channels
            .iter_mut()
            .map(|c| &mut c[pos..pos + n])
            .collect();
        instance.process(&mut block);
        pos += n;
        pb.set_position(pos as u64);
    }
    pb.finish_with_message("done");
    instance.release();

    let output_stats = Stats::measure(&channels);
    println!("\nStats:");
    println!(
        "  Input:  RMS {:.1} dB, Peak {:.1} dB",
        input_stats.rms_db(),
        input_stats.peak_db()
    );
    println!(
        "  Output: RMS {:.1} dB, Peak {:.1} dB",
        output_stats.rms_db(),
        output_stats.peak_db()
    );

    println!("\nWriting {}...", args.output.display());
    write_wav(&args.output, &channels, spec.sample_rate, args.bit_depth)?;
    println!("Done!");

    Ok(())
}

/// Level summary over all channels.
struct Stats {
    rms: f32,
    peak: f32,
}

impl Stats {
    fn measure(channels: &[Vec<f32>]) -> Self {
        let count: usize = channels.iter().map(Vec::len).sum();
        if count == 0 {
            return Self { rms: 0.0, peak: 0.0 };
        }
        let sum: f32 = channels.iter().flatten().map(|s| s * s).sum();
        let peak = channels.iter().flatten().map(|s| s.abs()).fold(0.0, f32::max);
        Self {
            rms: (sum / count as f32).sqrt(),
            peak,
        }
    }

    fn rms_db(&self) -> f32 {
        linear_to_db(self.rms)
    }

    fn peak_db(&self) -> f32 {
        linear_to_db(self.peak)
    }
}
