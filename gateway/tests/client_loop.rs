//! Headless client loop against a scripted relay.

mod mock_realtime;

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use mock_realtime::spawn_mock_peer;
use relay_gateway::client::{
    CAPTURE_FRAME_SAMPLES, CaptureSource, ClientError, ClientOptions, PlaybackEngine, run_client,
};
use relay_gateway::{AudioFrame, FrameDirection};

const WAIT: Duration = Duration::from_secs(5);

struct ScriptedSource {
    blocks: VecDeque<Vec<f32>>,
}

impl ScriptedSource {
    fn new(blocks: usize) -> Self {
        Self {
            blocks: (0..blocks)
                .map(|_| vec![0.25; CAPTURE_FRAME_SAMPLES])
                .collect(),
        }
    }
}

#[async_trait]
impl CaptureSource for ScriptedSource {
    async fn next_block(&mut self) -> Option<Vec<f32>> {
        self.blocks.pop_front()
    }
}

/// Engine whose clock never moves
#[derive(Default)]
struct FrozenEngine {
    scheduled: Vec<(u64, f64, usize)>,
    stopped: Vec<u64>,
}

impl PlaybackEngine for FrozenEngine {
    fn current_time(&self) -> f64 {
        0.0
    }

    fn schedule(&mut self, id: u64, frame: &AudioFrame, start: f64) {
        self.scheduled.push((id, start, frame.len()));
    }

    fn stop(&mut self, id: u64) {
        self.stopped.push(id);
    }
}

fn delta(samples: usize) -> serde_json::Value {
    let frame = AudioFrame::new(vec![1000; samples], FrameDirection::Playback);
    json!({"type": "response.audio.delta", "delta": frame.to_transport()})
}

#[tokio::test]
async fn test_client_streams_and_plays_back() {
    let mut relay = spawn_mock_peer("/realtime").await;
    let mut options = ClientOptions::new(relay.url.clone());
    options.linger = Duration::from_secs(30);

    let client = tokio::spawn(async move {
        run_client(&options, ScriptedSource::new(2), FrozenEngine::default()).await
    });

    for _ in 0..2 {
        let append = relay.next_event(WAIT).await.expect("audio append");
        assert_eq!(append["type"], "input_audio_buffer.append");
        let frame = AudioFrame::playback_from_transport(append["audio"].as_str().unwrap())
            .unwrap();
        assert_eq!(frame.len(), CAPTURE_FRAME_SAMPLES);
    }

    for _ in 0..3 {
        relay.send(delta(2400));
    }
    relay.send(json!({"type": "input_audio_buffer.speech_started", "audio_start_ms": 10}));
    relay.send(json!({"type": "response.audio.done"}));
    relay.hang_up();

    let (report, engine) = tokio::time::timeout(WAIT, client)
        .await
        .expect("client did not stop after the relay closed")
        .unwrap()
        .unwrap();

    assert_eq!(report.frames_sent, 2);
    assert_eq!(report.frames_dropped, 0);
    assert_eq!(report.chunks_scheduled, 3);
    assert_eq!(report.interruptions, 1);
    assert_eq!(report.events_received, 5);

    // Back to back from the frozen clock: 0.0, 0.1, 0.2
    let starts: Vec<f64> = engine.scheduled.iter().map(|(_, start, _)| *start).collect();
    assert_eq!(starts.len(), 3);
    for (i, start) in starts.iter().enumerate() {
        assert!((start - 0.1 * i as f64).abs() < 1e-9, "start {i} was {start}");
    }

    // Nothing had finished playing when the user barged in
    let mut stopped = engine.stopped.clone();
    stopped.sort_unstable();
    let mut ids: Vec<u64> = engine.scheduled.iter().map(|(id, _, _)| *id).collect();
    ids.sort_unstable();
    assert_eq!(stopped, ids);
}

#[tokio::test]
async fn test_client_stops_after_linger() {
    let relay = spawn_mock_peer("/realtime").await;
    let mut options = ClientOptions::new(relay.url.clone());
    options.linger = Duration::from_millis(100);

    let (report, engine) = tokio::time::timeout(
        WAIT,
        run_client(&options, ScriptedSource::new(1), FrozenEngine::default()),
    )
    .await
    .expect("linger did not end the session")
    .unwrap();

    assert_eq!(report.frames_sent, 1);
    assert_eq!(report.chunks_scheduled, 0);
    assert!(engine.scheduled.is_empty());
    drop(relay);
}

#[tokio::test]
async fn test_client_connect_failure() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let options = ClientOptions::new(format!("ws://127.0.0.1:{port}/realtime"));

    let result = run_client(&options, ScriptedSource::new(1), FrozenEngine::default()).await;
    assert!(matches!(result, Err(ClientError::Connect(_))));
}
