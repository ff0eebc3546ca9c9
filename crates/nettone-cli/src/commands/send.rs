//! Send control datagrams to a running synth.

use std::path::Path;

use anyhow::Context;
use clap::Args;
use nettone_io::ControlClient;
use nettone_synth::{Command, VOICE_COUNT, Waveform};

use super::load_config;

#[derive(Args)]
pub struct SendArgs {
    /// Raw command payload, sent verbatim (e.g. "v0w0f220a0.5")
    #[arg(conflicts_with_all = ["voice", "waveform", "note", "patch", "frequency", "amplitude", "reset"])]
    payload: Option<String>,

    /// Synth host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Synth control port (defaults to the configured port)
    #[arg(short, long)]
    port: Option<u16>,

    /// Voice index
    #[arg(short, long)]
    voice: Option<usize>,

    /// Waveform name or code (sine, square, saw, triangle, noise, fm, off)
    #[arg(short, long)]
    waveform: Option<Waveform>,

    /// MIDI note
    #[arg(short, long)]
    note: Option<u8>,

    /// FM patch
    #[arg(long)]
    patch: Option<u16>,

    /// Frequency in Hz
    #[arg(short, long)]
    frequency: Option<f32>,

    /// Amplitude multiplier
    #[arg(short, long)]
    amplitude: Option<f32>,

    /// Silence every voice
    #[arg(long)]
    reset: bool,

    /// Number of voices to silence with --reset
    #[arg(long, default_value_t = VOICE_COUNT, requires = "reset")]
    voices: usize,
}

impl SendArgs {
    fn command(&self) -> Command {
        Command {
            voice: self.voice,
            note: self.note,
            waveform: self.waveform,
            patch: self.patch,
            frequency: self.frequency,
            amplitude: self.amplitude,
        }
    }
}

pub fn run(args: SendArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let port = match args.port {
        Some(p) => p,
        None => load_config(config_path)?.control.port,
    };

    let client = ControlClient::connect((args.host.as_str(), port))
        .with_context(|| format!("resolving {}:{}", args.host, port))?;

    if args.reset {
        client.reset(args.voices)?;
        println!("Silenced {} voice(s) on {}", args.voices, client.target());
        return Ok(());
    }

    let payload = match &args.payload {
        Some(raw) => raw.clone(),
        None => {
            let command = args.command();
            if command.is_empty() {
                anyhow::bail!("nothing to send; give a payload, field flags, or --reset");
            }
            command.to_string()
        }
    };

    client.send_raw(payload.as_bytes())?;
    println!("Sent '{}' to {}", payload, client.target());
    Ok(())
}
