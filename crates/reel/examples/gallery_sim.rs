//! Simulate a gallery page: an autoplaying hero loop and two click-to-play
//! cards sharing one playback group, driven by scripted fakes.
//!
//! ```
//! cargo run -p reel --example gallery_sim --features testing [MANIFEST_URL]
//! ```

use std::{env::args, error::Error, time::Duration};

use reel::{
    play::testing::{FakeEngineFactory, FakeSurface},
    prelude::*,
};
use tracing::{info, warn};

fn ladder() -> Vec<QualityLevel> {
    [(240, 400_000), (360, 800_000), (480, 1_400_000), (720, 2_800_000), (1080, 5_000_000)]
        .into_iter()
        .enumerate()
        .map(|(index, (height, bitrate))| QualityLevel::new(index, height, bitrate))
        .collect()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    init_tracing();

    let hero_source = MediaSource::new(args().nth(1).unwrap_or_else(|| {
        "https://customer-f33zs165nr7gyfy4.cloudflarestream.com/5d5bc37ffcf54c9b82e996823bffbb81/manifest/video.m3u8"
            .to_string()
    }))?;

    let engines = FakeEngineFactory::new();
    let env = PlaybackEnv::default()
        .with_capabilities(
            RuntimeCapabilities::default()
                .with_adaptive_engine(true)
                .with_frame_callbacks(true),
        )
        .with_engines(engines.clone())
        .with_registry(PlaybackRegistry::new())
        .with_bus(EventBus::new(256));
    let mut events = env.bus.subscribe();

    let hero_surface = FakeSurface::with_measured_height(900);
    hero_surface.set_duration(Some(Duration::from_secs(8)));
    let hero = PlaybackController::new(
        hero_surface.clone(),
        Some(hero_source),
        PlaybackPolicy::default()
            .with_hero_like(true)
            .with_autoplay_allowed(true)
            .with_muted(true)
            .with_loop_playback(true)
            .with_debug_tag("hero".to_string()),
        env.clone(),
    );
    info!(poster = ?hero.poster_url(), "hero mounted");

    let cards: Vec<_> = ["/box-static.mp4", "/reel-2.mp4"]
        .into_iter()
        .enumerate()
        .map(|(i, url)| -> Result<_, CoreError> {
            let source = MediaSource::new(url)?;
            Ok(PlaybackController::new(
                FakeSurface::with_measured_height(360),
                Some(source),
                PlaybackPolicy::default()
                    .with_lazy(true)
                    .with_poster(format!("/posters/card-{i}.jpg"))
                    .with_debug_tag(format!("card-{i}")),
                env.clone(),
            ))
        })
        .collect::<Result<_, CoreError>>()?;

    // Engine finishes parsing the hero manifest; layout settles; autoplay starts.
    hero.on_engine_event(EngineEvent::ManifestParsed { levels: ladder() });
    tokio::time::sleep(Duration::from_millis(50)).await;
    hero.on_frame_presented(Duration::from_millis(40));
    info!(state = %hero.state(), level = ?hero.current_quality_level(), "hero");

    // Buffering catches up and hands quality back to the engine.
    for ahead in [3, 6, 9] {
        hero.on_engine_event(EngineEvent::FragmentBuffered {
            buffered_ahead: Duration::from_secs(ahead),
        });
    }

    // Cards scroll into view; the user clicks the first, then the second.
    for card in &cards {
        card.on_near_viewport();
        card.surface().set_ready_state(ReadyState::HaveEnoughData);
        card.on_surface_event(SurfaceEvent::LoadedData);
    }
    let first = cards[0].request_play(true).await?;
    info!(state = %first, "card-0 clicked");
    match cards[1].toggle().await {
        Ok(state) => info!(%state, card_0 = %cards[0].state(), "card-1 clicked"),
        Err(e) => warn!(error = %e, "card-1 did not start"),
    }

    // The hero loop wraps around once.
    hero_surface.set_current_time(Duration::from_millis(7_900));
    tokio::time::sleep(Duration::from_millis(600)).await;

    hero.dispose();
    for card in &cards {
        card.dispose();
    }

    while let Ok(event) = events.try_recv() {
        info!(?event);
    }
    info!(
        created = engines.created(),
        destroyed = engines.destroyed(),
        "engines"
    );
    Ok(())
}
