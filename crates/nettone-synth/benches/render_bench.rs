//! Criterion benchmarks for the nettone render path
//!
//! Run with: cargo bench -p nettone-synth

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use nettone_synth::{Command, DEFAULT_SAMPLE_RATE, SilentFm, SynthEngine, VOICE_COUNT, Waveform};

// ============================================================================
// Single-waveform blocks
// ============================================================================

fn bench_waveforms(c: &mut Criterion) {
    let mut group = c.benchmark_group("RenderBlock");

    let waveforms = [
        ("Sine", Waveform::Sine),
        ("Square", Waveform::Square),
        ("Sawtooth", Waveform::Sawtooth),
        ("Triangle", Waveform::Triangle),
        ("Noise", Waveform::Noise),
        ("Fm", Waveform::Fm),
    ];

    for (name, waveform) in waveforms {
        let (ctl, mut renderer) =
            SynthEngine::<SilentFm>::new(DEFAULT_SAMPLE_RATE, SilentFm).split();
        let cmd = Command::for_voice(0)
            .with_waveform(waveform)
            .with_frequency(440.0)
            .with_amplitude(0.5);
        ctl.apply(&cmd).unwrap();

        group.bench_function(name, |b| b.iter(|| black_box(renderer.render_block())));
    }

    group.finish();
}

// ============================================================================
// Full voice bank
// ============================================================================

fn bench_voice_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("RenderBlock_Voices");

    for active in [1usize, 4, VOICE_COUNT] {
        let (ctl, mut renderer) =
            SynthEngine::<SilentFm>::new(DEFAULT_SAMPLE_RATE, SilentFm).split();
        for v in 0..active {
            let cmd = Command::for_voice(v)
                .with_waveform(Waveform::from_code((v % 4) as u8).unwrap())
                .with_note(48 + v as u8)
                .with_amplitude(0.1);
            ctl.apply(&cmd).unwrap();
        }

        group.bench_with_input(BenchmarkId::new("active", active), &active, |b, _| {
            b.iter(|| black_box(renderer.render_block()))
        });
    }

    group.finish();
}

// ============================================================================
// Decoder
// ============================================================================

fn bench_decode(c: &mut Criterion) {
    let payload = b"v3w0n64p12f440.25a0.5";
    c.bench_function("Command_decode", |b| {
        b.iter(|| black_box(Command::decode(black_box(payload))))
    });
}

criterion_group!(benches, bench_waveforms, bench_voice_count, bench_decode);
criterion_main!(benches);
