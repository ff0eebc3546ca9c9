//! Offline rendering to a WAV file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use nettone_io::WavSink;
use nettone_synth::{BLOCK_SIZE, SilentFm, SynthEngine};

use super::load_config;

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    output: PathBuf,

    /// Command payload to apply before rendering (repeatable, e.g. "v0w0f220a0.5")
    #[arg(short, long = "command", value_name = "PAYLOAD")]
    commands: Vec<String>,

    /// Duration in seconds
    #[arg(short, long, default_value = "2.0")]
    duration: f32,

    /// Sample rate in Hz
    #[arg(long)]
    sample_rate: Option<u32>,
}

pub fn run(args: RenderArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let sample_rate = args.sample_rate.unwrap_or(config.sample_rate);
    if sample_rate == 0 {
        anyhow::bail!("sample rate must be non-zero");
    }
    if !args.duration.is_finite() || args.duration <= 0.0 {
        anyhow::bail!("duration must be a positive number of seconds");
    }

    let engine = SynthEngine::<SilentFm>::new(sample_rate, SilentFm)
        .with_fm_velocity(config.fm.velocity);
    let (controller, mut renderer) = engine.split();

    for payload in &args.commands {
        controller
            .handle_datagram(payload.as_bytes())
            .with_context(|| format!("command '{payload}'"))?;
    }

    let samples = (f64::from(args.duration) * f64::from(sample_rate)).ceil() as usize;
    let blocks = samples.div_ceil(BLOCK_SIZE);

    let mut sink = WavSink::create(&args.output, sample_rate)
        .with_context(|| format!("creating {}", args.output.display()))?;
    renderer.run_blocks(&mut sink, blocks);
    let frames = sink.frames();
    sink.finalize()?;

    let stats = renderer.stats().snapshot();
    if stats.sink_errors > 0 {
        anyhow::bail!("{} block(s) failed to write to {}", stats.sink_errors, args.output.display());
    }

    println!(
        "Rendered {} samples ({} blocks, {:.2}s at {} Hz) to {}",
        frames,
        blocks,
        frames as f64 / f64::from(sample_rate),
        sample_rate,
        args.output.display()
    );
    Ok(())
}
