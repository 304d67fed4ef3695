#![allow(dead_code)]

use std::sync::Arc;

use reel_abr::QualityLevel;
use reel_core::MediaSource;
use reel_events::Event;
use reel_play::{
    PlaybackController, PlaybackEnv, ReadyState, RuntimeCapabilities, SurfaceEvent,
    testing::{FakeEngineFactory, FakeSurface},
};
use tokio::sync::broadcast;

pub const VIDEO_ID: &str = "5d5bc37ffcf54c9b82e996823bffbb81";

pub fn stream_source() -> MediaSource {
    MediaSource::new(format!(
        "https://customer-f33zs165nr7gyfy4.cloudflarestream.com/{VIDEO_ID}/manifest/video.m3u8"
    ))
    .unwrap()
}

pub fn other_stream_source() -> MediaSource {
    MediaSource::new("https://cdn.example.com/reels/intro/master.m3u8").unwrap()
}

pub fn file_source() -> MediaSource {
    MediaSource::new("/box-static.mp4").unwrap()
}

/// 240p, 360p, 480p, 720p, 1080p.
pub fn ladder() -> Vec<QualityLevel> {
    vec![
        QualityLevel::new(0, 240, 400_000),
        QualityLevel::new(1, 360, 800_000),
        QualityLevel::new(2, 480, 1_400_000),
        QualityLevel::new(3, 720, 2_800_000),
        QualityLevel::new(4, 1080, 5_000_000),
    ]
}

pub fn engine_env(factory: &Arc<FakeEngineFactory>) -> PlaybackEnv {
    PlaybackEnv::default()
        .with_capabilities(RuntimeCapabilities::default().with_adaptive_engine(true))
        .with_engines(factory.clone())
}

pub fn tracing_setup() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::default().add_directive("warn".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

/// Let spawned controller tasks run without advancing the clock.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Report decoded data so the next play resolves straight to `Playing`.
pub fn preload(controller: &PlaybackController<FakeSurface>) {
    controller
        .surface()
        .set_ready_state(ReadyState::HaveEnoughData);
    controller.on_surface_event(SurfaceEvent::LoadedData);
}

pub fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
