//! Integration tests for the `nettone` binary.
//!
//! Every test passes an explicit `--config` so results do not depend on the
//! user's own configuration file.

use std::net::UdpSocket;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use tempfile::tempdir;

/// Helper to get the path to the `nettone` binary built by cargo.
fn nettone_bin(config: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_nettone"));
    cmd.arg("--config").arg(config);
    cmd
}

fn write_config(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, body).unwrap();
    path
}

fn listener() -> (UdpSocket, u16) {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let port = socket.local_addr().unwrap().port();
    (socket, port)
}

fn recv_string(socket: &UdpSocket) -> String {
    let mut buf = [0u8; 128];
    let (len, _) = socket.recv_from(&mut buf).expect("no datagram received");
    String::from_utf8_lossy(&buf[..len]).into_owned()
}

// ---------------------------------------------------------------------------
// nettone --help / config
// ---------------------------------------------------------------------------

#[test]
fn help_lists_subcommands() {
    let output = Command::new(env!("CARGO_BIN_EXE_nettone"))
        .arg("--help")
        .output()
        .expect("failed to run nettone --help");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for sub in ["run", "render", "send", "devices", "config"] {
        assert!(stdout.contains(sub), "help should mention '{sub}'");
    }
}

#[test]
fn config_prints_file_values_over_defaults() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), "[control]\nport = 7123\n");

    let output = nettone_bin(&config).arg("config").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("port = 7123"));
    assert!(stdout.contains("sample_rate = 44100"));
    assert!(stdout.contains("velocity = 100"));
}

#[test]
fn invalid_config_fails() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), "[output]\nbuffer_blocks = 0\n");

    let output = nettone_bin(&config).arg("config").output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("buffer_blocks"), "stderr: {stderr}");
}

// ---------------------------------------------------------------------------
// nettone render
// ---------------------------------------------------------------------------

#[test]
fn render_writes_wav_of_requested_length() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), "");
    let wav = dir.path().join("out.wav");

    let output = nettone_bin(&config)
        .arg("render")
        .arg(&wav)
        .args(["-c", "v0w0f220a0.5", "-c", "v1w3n69a0.2", "--duration", "0.5"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let bytes = std::fs::read(&wav).unwrap();
    assert_eq!(&bytes[..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WAVE");
    // 0.5 s at 44100 Hz rounds up to 87 blocks of 256 mono 16-bit samples.
    let data_bytes = 87 * 256 * 2;
    assert_eq!(bytes.len(), 44 + data_bytes);
    assert!(bytes[44..].iter().any(|&b| b != 0), "render should not be silent");
}

#[test]
fn render_rejects_out_of_range_voice() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), "");
    let wav = dir.path().join("out.wav");

    let output = nettone_bin(&config)
        .arg("render")
        .arg(&wav)
        .args(["-c", "v42w0a1"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(!wav.exists());
}

// ---------------------------------------------------------------------------
// nettone send
// ---------------------------------------------------------------------------

#[test]
fn send_raw_payload_verbatim() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), "");
    let (socket, port) = listener();

    let output = nettone_bin(&config)
        .args(["send", "v0w0f220a0.5", "--port", &port.to_string()])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(recv_string(&socket), "v0w0f220a0.5");
}

#[test]
fn send_builds_payload_from_flags() {
    let dir = tempdir().unwrap();
    let (socket, port) = listener();
    let config = write_config(dir.path(), &format!("[control]\nport = {port}\n"));

    let output = nettone_bin(&config)
        .args(["send", "-v", "3", "-w", "saw", "-n", "60", "-a", "0.25"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(recv_string(&socket), "v3w2n60a0.25");
}

#[test]
fn send_reset_silences_each_voice() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), "");
    let (socket, port) = listener();

    let output = nettone_bin(&config)
        .args(["send", "--reset", "--voices", "3", "--port", &port.to_string()])
        .output()
        .unwrap();
    assert!(output.status.success());
    for v in 0..3 {
        assert_eq!(recv_string(&socket), format!("v{v}w6a0"));
    }
}

#[test]
fn send_without_fields_fails() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), "");

    let output = nettone_bin(&config)
        .args(["send", "--port", "9"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
