//! Audio output device listing.

use clap::Args;
use nettone_io::{default_output_device, list_output_devices};

#[derive(Args)]
pub struct DevicesArgs {
    /// Only show the default device
    #[arg(long)]
    default: bool,
}

pub fn run(args: DevicesArgs) -> anyhow::Result<()> {
    let default = default_output_device()?;

    if args.default {
        match default {
            Some(d) => println!("{} ({} Hz, {} ch)", d.name, d.default_sample_rate, d.channels),
            None => println!("No default output device."),
        }
        return Ok(());
    }

    let devices = list_output_devices()?;
    if devices.is_empty() {
        println!("No audio output devices found.");
        return Ok(());
    }

    println!("Output Devices");
    println!("==============\n");
    let default_name = default.as_ref().map(|d| d.name.as_str());
    for (idx, device) in devices.iter().enumerate() {
        let marker = if Some(device.name.as_str()) == default_name {
            " (default)"
        } else {
            ""
        };
        println!(
            "  [{}] {} ({} Hz, {} ch){}",
            idx, device.name, device.default_sample_rate, device.channels, marker
        );
    }
    Ok(())
}
