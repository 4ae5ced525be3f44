//! Performance benchmarks for the relay gateway
//!
//! Run with: cargo bench
//! Or for specific benchmarks: cargo bench -- <filter>

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::sync::Arc;
use std::time::Duration;

use relay_gateway::client::{CaptureFramer, PlaybackEngine, PlaybackScheduler};
use relay_gateway::core::audio::{decode_transport, encode_transport, float_to_pcm16, pcm16_to_bytes};
use relay_gateway::{
    AudioFrame, FrameDirection, InMemoryBookingStore, KnowledgeBase, ToolDispatcher, UpstreamEvent,
};

/// 100ms, 4096-sample capture frame and 1s of audio at 24kHz
const FRAME_SIZES: [usize; 3] = [2400, 4096, 24000];

fn sine(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (i as f32 * 440.0 * std::f32::consts::TAU / 24000.0).sin() * 0.8)
        .collect()
}

/// Benchmark float to PCM16 conversion
fn bench_float_to_pcm16(c: &mut Criterion) {
    let mut group = c.benchmark_group("float_to_pcm16");

    for &size in &FRAME_SIZES {
        let samples = sine(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &samples, |b, samples| {
            b.iter(|| float_to_pcm16(black_box(samples)));
        });
    }

    group.finish();
}

/// Benchmark base64 transport encoding in both directions
fn bench_transport_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("transport_codec");

    for &size in &FRAME_SIZES {
        let bytes = pcm16_to_bytes(&float_to_pcm16(&sine(size)));
        let encoded = encode_transport(&bytes);

        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", size), &bytes, |b, bytes| {
            b.iter(|| encode_transport(black_box(bytes)));
        });
        group.bench_with_input(BenchmarkId::new("decode", size), &encoded, |b, encoded| {
            b.iter(|| decode_transport(black_box(encoded)));
        });
    }

    group.finish();
}

/// Benchmark parsing an audio delta event and decoding its payload
fn bench_audio_delta(c: &mut Criterion) {
    let mut group = c.benchmark_group("audio_delta");

    let frame = AudioFrame::new(float_to_pcm16(&sine(2400)), FrameDirection::Playback);
    let event = serde_json::json!({
        "type": "response.audio.delta",
        "delta": frame.to_transport(),
    });
    let text = event.to_string();

    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("parse_and_decode", |b| {
        b.iter(|| {
            let value: serde_json::Value = serde_json::from_str(black_box(&text)).ok()?;
            match UpstreamEvent::from_value(&value).ok()? {
                UpstreamEvent::AudioDelta { delta } => UpstreamEvent::decode_audio_delta(&delta).ok(),
                _ => None,
            }
        });
    });

    group.finish();
}

/// Benchmark capture framing of 100ms blocks
fn bench_capture_framing(c: &mut Criterion) {
    let mut group = c.benchmark_group("capture_framing");
    let block = sine(2400);

    group.throughput(Throughput::Elements(block.len() as u64 * 10));
    group.bench_function("one_second", |b| {
        b.iter(|| {
            let mut framer = CaptureFramer::default();
            let mut frames = 0;
            for _ in 0..10 {
                frames += framer.push(black_box(&block)).len();
            }
            frames
        });
    });

    group.finish();
}

/// Clock advanced by hand; stores nothing
struct NullEngine {
    now: f64,
}

impl PlaybackEngine for NullEngine {
    fn current_time(&self) -> f64 {
        self.now
    }

    fn schedule(&mut self, _id: u64, _frame: &AudioFrame, _start: f64) {}

    fn stop(&mut self, _id: u64) {}
}

/// Benchmark scheduling bursts of chunks followed by a barge-in
fn bench_playback_scheduler(c: &mut Criterion) {
    let mut group = c.benchmark_group("playback_scheduler");
    let chunk = AudioFrame::new(vec![0; 2400], FrameDirection::Playback);

    for burst in [10usize, 100] {
        group.throughput(Throughput::Elements(burst as u64));
        group.bench_with_input(BenchmarkId::new("burst", burst), &burst, |b, &burst| {
            b.iter(|| {
                let mut scheduler = PlaybackScheduler::new(NullEngine { now: 0.0 });
                for i in 0..burst {
                    scheduler.engine_mut().now = i as f64 * 0.05;
                    scheduler.schedule(black_box(&chunk));
                }
                scheduler.interrupt()
            });
        });
    }

    group.finish();
}

/// Benchmark tool dispatch against the built-in knowledge base
fn bench_tool_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("tool_dispatch");
    group.measurement_time(Duration::from_secs(5));

    let runtime = tokio::runtime::Runtime::new().expect("Failed to create runtime");
    let knowledge = Arc::new(KnowledgeBase::builtin().expect("built-in knowledge base"));
    let dispatcher = ToolDispatcher::new(knowledge, Arc::new(InMemoryBookingStore::new()));

    let calls = [
        ("getAllEmployees", serde_json::json!({})),
        ("getEmployeeByName", serde_json::json!({"name": "a"})),
        ("searchFaqs", serde_json::json!({"keyword": "support"})),
    ];

    for (name, arguments) in &calls {
        group.bench_with_input(BenchmarkId::from_parameter(name), arguments, |b, arguments| {
            b.to_async(&runtime)
                .iter(|| dispatcher.dispatch(black_box(name), black_box(arguments)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_float_to_pcm16,
    bench_transport_codec,
    bench_audio_delta,
    bench_capture_framing,
    bench_playback_scheduler,
    bench_tool_dispatch,
);

criterion_main!(benches);
