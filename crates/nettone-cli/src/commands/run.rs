//! Live synth: UDP control in, audio device out.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use anyhow::Context;
use clap::Args;
use nettone_io::{ControlServer, CpalSink, SinkConfig};
use nettone_synth::{SilentFm, SynthEngine};

use super::load_config;

#[derive(Args)]
pub struct RunArgs {
    /// Address to bind the control socket to
    #[arg(long)]
    bind: Option<String>,

    /// Control UDP port
    #[arg(short, long)]
    port: Option<u16>,

    /// Output device name (substring match)
    #[arg(short, long)]
    device: Option<String>,

    /// Sample rate in Hz
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Blocks queued ahead of the audio device
    #[arg(long)]
    buffer_blocks: Option<usize>,

    /// Velocity sent with FM triggers
    #[arg(long)]
    fm_velocity: Option<u8>,
}

pub fn run(args: RunArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(bind) = args.bind {
        config.control.bind_address = bind;
    }
    if let Some(port) = args.port {
        config.control.port = port;
    }
    if let Some(device) = args.device {
        config.output.device = Some(device);
    }
    if let Some(rate) = args.sample_rate {
        config.sample_rate = rate;
    }
    if let Some(blocks) = args.buffer_blocks {
        config.output.buffer_blocks = blocks;
    }
    if let Some(velocity) = args.fm_velocity {
        config.fm.velocity = velocity;
    }
    config.validate()?;

    let engine = SynthEngine::<SilentFm>::new(config.sample_rate, SilentFm)
        .with_fm_velocity(config.fm.velocity);
    let (controller, mut renderer) = engine.split();

    let addr = config.control.socket_addr();
    let server =
        ControlServer::bind(addr.as_str()).with_context(|| format!("binding control socket {addr}"))?;

    let sink_config = SinkConfig {
        device: config.output.device.clone(),
        sample_rate: config.sample_rate,
        buffer_blocks: config.output.buffer_blocks,
        ..SinkConfig::default()
    };
    let mut sink = CpalSink::open(&sink_config).context("opening audio output")?;

    println!("nettone listening on udp://{}", server.local_addr()?);
    println!("  Output:      {} ({} ch)", sink.device_name(), sink.channels());
    println!("  Sample rate: {} Hz", config.sample_rate);
    println!("\nPress Ctrl+C to stop...\n");

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let flag = Arc::clone(&running);
    let control = thread::Builder::new()
        .name("nettone-control".into())
        .spawn(move || server.serve(&controller, &flag))?;

    renderer.run(&mut sink, &running);
    if let Err(e) = sink.pause() {
        tracing::warn!(error = %e, "failed to pause audio output");
    }

    // The render loop only stops on the flag, so make sure the listener
    // sees it too if we got here another way.
    running.store(false, Ordering::SeqCst);
    let received = match control.join() {
        Ok(result) => result.context("control listener failed")?,
        Err(_) => anyhow::bail!("control thread panicked"),
    };

    let stats = renderer.stats().snapshot();
    println!("\nStopped.");
    println!("  Datagrams: {}", received);
    println!("  {}", stats);
    println!("  Underruns: {}", sink.underruns());
    if stats.has_faults() {
        tracing::warn!(%stats, "session ended with output faults");
    }

    Ok(())
}
