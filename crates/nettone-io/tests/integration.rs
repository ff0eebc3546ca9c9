//! Integration tests for nettone-io: UDP control loopback and WAV output.
//!
//! Audio-device tests are left out; CI machines rarely have one.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use nettone_io::{ControlClient, ControlServer, Error, WavSink, read_wav_mono};
use nettone_synth::{
    BLOCK_SIZE, Command, DEFAULT_SAMPLE_RATE, SilentFm, SynthEngine, VOICE_COUNT, Waveform,
};
use tempfile::tempdir;

fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn datagram_reaches_voice_bank() {
    let (ctl, _r) = SynthEngine::<SilentFm>::new(DEFAULT_SAMPLE_RATE, SilentFm).split();
    let server = ControlServer::bind("127.0.0.1:0").unwrap();
    let addr = server.local_addr().unwrap();

    let client = ControlClient::connect(addr).unwrap();
    client
        .send(
            &Command::for_voice(3)
                .with_waveform(Waveform::Sawtooth)
                .with_note(69)
                .with_amplitude(0.25),
        )
        .unwrap();

    assert!(server.receive_one(&ctl).unwrap().is_some());
    let v = ctl.bank().get(3).unwrap();
    assert_eq!(v.waveform, Waveform::Sawtooth);
    assert_eq!(v.note, Some(69));
    assert_eq!(v.amplitude, 0.25);
}

#[test]
fn serve_applies_until_stopped() {
    let (ctl, _r) = SynthEngine::<SilentFm>::new(DEFAULT_SAMPLE_RATE, SilentFm).split();
    let server = ControlServer::bind("127.0.0.1:0").unwrap();
    let addr = server.local_addr().unwrap();
    let running = Arc::new(AtomicBool::new(true));

    let flag = Arc::clone(&running);
    let served = ctl.clone();
    let handle = thread::spawn(move || server.serve(&served, &flag));

    let client = ControlClient::connect(addr).unwrap();
    client.send_raw(b"v0w0f440a0.5").unwrap();
    client.send_raw(b"v99w0a1").unwrap();

    assert!(wait_until(|| {
        let s = ctl.stats().snapshot();
        s.commands_applied == 1 && s.commands_rejected == 1
    }));

    running.store(false, Ordering::Relaxed);
    let received = handle.join().unwrap().unwrap();
    assert_eq!(received, 2);
    assert_eq!(ctl.bank().get(0).unwrap().frequency, 440.0);
}

#[test]
fn reset_silences_every_voice() {
    let (ctl, mut r) = SynthEngine::<SilentFm>::new(DEFAULT_SAMPLE_RATE, SilentFm).split();
    for v in 0..VOICE_COUNT {
        ctl.apply(&Command::for_voice(v).with_waveform(Waveform::Square).with_amplitude(0.05))
            .unwrap();
    }
    assert_ne!(r.render_block(), [0; BLOCK_SIZE]);

    let server = ControlServer::bind("127.0.0.1:0").unwrap();
    let client = ControlClient::connect(server.local_addr().unwrap()).unwrap();
    client.reset(VOICE_COUNT).unwrap();

    let mut got = 0;
    while got < VOICE_COUNT {
        if server.receive_one(&ctl).unwrap().is_some() {
            got += 1;
        }
    }
    assert_eq!(r.render_block(), [0; BLOCK_SIZE]);
}

#[test]
fn oversized_payload_is_refused() {
    let client = ControlClient::connect("127.0.0.1:9").unwrap();
    let payload = vec![b'a'; 81];
    assert!(matches!(
        client.send_raw(&payload),
        Err(Error::CommandTooLong { len: 81, max: 80 })
    ));
}

#[test]
fn idle_receive_times_out_cleanly() {
    let (ctl, _r) = SynthEngine::<SilentFm>::new(DEFAULT_SAMPLE_RATE, SilentFm).split();
    let server = ControlServer::bind("127.0.0.1:0").unwrap();
    assert!(server.receive_one(&ctl).unwrap().is_none());
}

#[test]
fn wav_sink_writes_rendered_blocks() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tone.wav");

    let (ctl, mut r) = SynthEngine::<SilentFm>::new(DEFAULT_SAMPLE_RATE, SilentFm).split();
    ctl.handle_datagram(b"v0w0f441a0.5").unwrap();

    let mut sink = WavSink::create(&path, DEFAULT_SAMPLE_RATE).unwrap();
    r.run_blocks(&mut sink, 20);
    assert_eq!(sink.frames(), 20 * BLOCK_SIZE as u64);
    sink.finalize().unwrap();

    let (rate, samples) = read_wav_mono(&path).unwrap();
    assert_eq!(rate, DEFAULT_SAMPLE_RATE);
    assert_eq!(samples.len(), 20 * BLOCK_SIZE);
    let peak = samples.iter().map(|s| s.unsigned_abs()).max().unwrap();
    assert!((16000..=16400).contains(&peak), "peak {peak}");
    assert_eq!(r.stats().snapshot().sink_errors, 0);
}

#[test]
fn wav_sink_in_missing_directory_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("out.wav");
    assert!(WavSink::create(&path, DEFAULT_SAMPLE_RATE).is_err());
}
