#![forbid(unsafe_code)]

//! Attach, teardown and source-change behaviour of a single controller.

use std::sync::Arc;

use reel_core::{MediaSource, PlaybackState};
use reel_events::{ErrorKind, Event, PlaybackEvent};
use reel_play::{
    EngineEvent, PlayError, PlaybackController, PlaybackEnv, PlaybackPath, PlaybackPolicy,
    Preload, RuntimeCapabilities, SurfaceEvent,
    testing::{EngineCall, FakeEngineFactory, FakeSurface},
};
use reel_thumb::ThumbnailResolver;
use rstest::rstest;

mod fixture;
use fixture::{
    drain, engine_env, file_source, ladder, other_stream_source, preload, settle,
    stream_source, tracing_setup,
};

fn states(events: &[Event]) -> Vec<PlaybackState> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Playback(PlaybackEvent::StateChanged { state, .. }) => Some(*state),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn lazy_controller_waits_for_proximity() {
    tracing_setup();
    let surface = FakeSurface::new();
    let env = PlaybackEnv::default();
    let mut events = env.bus.subscribe();
    let controller = PlaybackController::new(
        surface.clone(),
        Some(file_source()),
        PlaybackPolicy::default().with_lazy(true),
        env,
    );

    settle().await;
    assert_eq!(controller.state(), PlaybackState::Idle);
    assert_eq!(surface.source(), None);

    controller.on_near_viewport();

    assert_eq!(controller.state(), PlaybackState::Ready);
    assert_eq!(surface.source().as_deref(), Some("/box-static.mp4"));
    assert_eq!(
        states(&drain(&mut events)),
        vec![PlaybackState::Attaching, PlaybackState::Ready]
    );
}

#[tokio::test(start_paused = true)]
async fn lazy_engine_controller_becomes_ready_after_manifest() {
    let factory = FakeEngineFactory::new();
    let controller = PlaybackController::new(
        FakeSurface::new(),
        Some(stream_source()),
        PlaybackPolicy::default().with_lazy(true),
        engine_env(&factory),
    );
    assert_eq!(factory.created(), 0);

    controller.on_near_viewport();
    assert_eq!(controller.state(), PlaybackState::Attaching);
    assert_eq!(controller.path(), Some(PlaybackPath::Engine));
    assert_eq!(
        factory.calls(),
        vec![
            EngineCall::Attach,
            EngineCall::LoadSource(stream_source().url().to_string())
        ]
    );

    controller.on_engine_event(EngineEvent::ManifestParsed { levels: ladder() });
    assert_eq!(controller.state(), PlaybackState::Ready);
    assert_eq!(controller.levels().len(), 5);
    // No starting-level selection without prefer_hd or hero_like.
    assert!(
        !factory
            .calls()
            .iter()
            .any(|call| matches!(call, EngineCall::SetStartLevel(_)))
    );
}

#[rstest]
#[case::prime(true)]
#[case::activate(false)]
#[tokio::test(start_paused = true)]
async fn priming_attaches_once(#[case] prime: bool) {
    let factory = FakeEngineFactory::new();
    let controller = PlaybackController::new(
        FakeSurface::new(),
        Some(stream_source()),
        PlaybackPolicy::default().with_lazy(true),
        engine_env(&factory),
    );

    for _ in 0..3 {
        if prime {
            controller.prime();
        } else {
            controller.activate();
        }
    }

    assert_eq!(controller.state(), PlaybackState::Attaching);
    assert_eq!(factory.created(), 1);
}

#[tokio::test(start_paused = true)]
async fn hero_ignores_lazy_flag_and_preloads() {
    let factory = FakeEngineFactory::new();
    let surface = FakeSurface::new();
    let controller = PlaybackController::new(
        surface.clone(),
        Some(stream_source()),
        PlaybackPolicy::default().with_lazy(true).with_hero_like(true),
        engine_env(&factory),
    );

    assert_eq!(controller.state(), PlaybackState::Attaching);
    assert_eq!(surface.setup().map(|s| s.preload), Some(Preload::Auto));
    let config = factory.last_config().unwrap();
    assert!(!config.cap_level_to_player_size);
}

#[tokio::test(start_paused = true)]
async fn native_playback_assigns_manifest_to_element() {
    let surface = FakeSurface::new();
    let env = PlaybackEnv::default().with_capabilities(
        RuntimeCapabilities::default()
            .with_native_adaptive_playback(true)
            .with_adaptive_engine(true)
            .with_prefer_native(true),
    );
    let controller =
        PlaybackController::new(surface.clone(), Some(stream_source()), PlaybackPolicy::default(), env);

    assert_eq!(controller.path(), Some(PlaybackPath::Native));
    assert_eq!(controller.state(), PlaybackState::Ready);
    assert_eq!(surface.source().as_deref(), Some(stream_source().url()));
    assert_eq!(surface.load_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn adaptive_source_without_engine_or_native_falls_back_to_direct() {
    let surface = FakeSurface::new();
    let controller = PlaybackController::new(
        surface.clone(),
        Some(stream_source()),
        PlaybackPolicy::default(),
        PlaybackEnv::default(),
    );

    assert_eq!(controller.path(), Some(PlaybackPath::Direct));
    assert_eq!(controller.state(), PlaybackState::Ready);
}

#[tokio::test(start_paused = true)]
async fn source_change_destroys_engine_before_next_attach() {
    let factory = FakeEngineFactory::new();
    let controller = PlaybackController::new(
        FakeSurface::new(),
        Some(stream_source()),
        PlaybackPolicy::default(),
        engine_env(&factory),
    );

    controller.on_source_changed(Some(other_stream_source()));
    controller.on_source_changed(Some(stream_source()));

    assert_eq!(factory.created(), 3);
    assert_eq!(factory.destroyed(), 2);
    assert_eq!(factory.live(), 1);
    assert_eq!(factory.max_live(), 1);

    let calls = factory.calls();
    let destroys: Vec<usize> = calls
        .iter()
        .enumerate()
        .filter(|(_, call)| **call == EngineCall::Destroy)
        .map(|(i, _)| i)
        .collect();
    let attaches: Vec<usize> = calls
        .iter()
        .enumerate()
        .filter(|(_, call)| **call == EngineCall::Attach)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(attaches.len(), 3);
    assert!(destroys[0] < attaches[1]);
    assert!(destroys[1] < attaches[2]);
}

#[tokio::test(start_paused = true)]
async fn same_source_is_not_reattached() {
    let factory = FakeEngineFactory::new();
    let controller = PlaybackController::new(
        FakeSurface::new(),
        Some(stream_source()),
        PlaybackPolicy::default(),
        engine_env(&factory),
    );

    controller.on_source_changed(Some(stream_source()));
    assert_eq!(factory.created(), 1);
}

#[tokio::test(start_paused = true)]
async fn clearing_source_returns_to_idle() {
    let surface = FakeSurface::new();
    let controller = PlaybackController::new(
        surface.clone(),
        Some(file_source()),
        PlaybackPolicy::default(),
        PlaybackEnv::default(),
    );
    assert_eq!(surface.source().as_deref(), Some("/box-static.mp4"));

    controller.on_source_changed(None);

    assert_eq!(controller.state(), PlaybackState::Idle);
    assert_eq!(surface.source(), None);
    assert_eq!(
        controller.request_play(true).await,
        Err(PlayError::NoSource)
    );
}

#[tokio::test(start_paused = true)]
async fn lazy_controller_reattaches_after_source_change_when_near_viewport() {
    let factory = FakeEngineFactory::new();
    let controller = PlaybackController::new(
        FakeSurface::new(),
        Some(stream_source()),
        PlaybackPolicy::default().with_lazy(true),
        engine_env(&factory),
    );
    controller.on_near_viewport();

    controller.on_source_changed(Some(other_stream_source()));

    assert_eq!(controller.state(), PlaybackState::Attaching);
    assert_eq!(factory.created(), 2);
    assert_eq!(factory.live(), 1);
}

#[tokio::test(start_paused = true)]
async fn attach_failure_errors_and_releases_engine() {
    let factory = FakeEngineFactory::new();
    factory.fail_attach(true);
    let env = engine_env(&factory);
    let mut events = env.bus.subscribe();

    let controller = PlaybackController::new(
        FakeSurface::new(),
        Some(stream_source()),
        PlaybackPolicy::default(),
        env,
    );

    assert_eq!(controller.state(), PlaybackState::Errored);
    assert_eq!(factory.live(), 0);
    let errored: Vec<_> = drain(&mut events)
        .into_iter()
        .filter_map(|event| match event {
            Event::Playback(PlaybackEvent::Errored { kind, .. }) => Some(kind),
            _ => None,
        })
        .collect();
    assert_eq!(errored, vec![ErrorKind::AttachmentFailed]);

    assert_eq!(
        controller.request_play(true).await,
        Err(PlayError::InvalidState {
            state: PlaybackState::Errored
        })
    );
}

#[tokio::test(start_paused = true)]
async fn play_from_idle_reports_attach_failure() {
    let factory = FakeEngineFactory::new();
    factory.fail_create(true);
    let controller = PlaybackController::new(
        FakeSurface::new(),
        Some(stream_source()),
        PlaybackPolicy::default().with_lazy(true),
        engine_env(&factory),
    );

    let result = controller.request_play(true).await;

    assert!(matches!(result, Err(PlayError::AttachmentFailed { .. })));
    assert_eq!(controller.state(), PlaybackState::Errored);
}

#[tokio::test(start_paused = true)]
async fn fatal_engine_error_is_reported_once() {
    let factory = FakeEngineFactory::new();
    let env = engine_env(&factory);
    let mut events = env.bus.subscribe();
    let controller = PlaybackController::new(
        FakeSurface::new(),
        Some(stream_source()),
        PlaybackPolicy::default(),
        env,
    );
    controller.on_engine_event(EngineEvent::ManifestParsed { levels: ladder() });

    controller.on_engine_event(EngineEvent::Error {
        fatal: false,
        details: "fragLoadTimeOut".into(),
    });
    assert_eq!(controller.state(), PlaybackState::Ready);

    controller.on_engine_event(EngineEvent::Error {
        fatal: true,
        details: "manifestLoadError".into(),
    });
    controller.on_engine_event(EngineEvent::Error {
        fatal: true,
        details: "bufferAppendError".into(),
    });

    assert_eq!(controller.state(), PlaybackState::Errored);
    assert_eq!(factory.live(), 0);
    let errored = drain(&mut events)
        .into_iter()
        .filter(|event| matches!(event, Event::Playback(PlaybackEvent::Errored { .. })))
        .count();
    assert_eq!(errored, 1);
}

#[tokio::test(start_paused = true)]
async fn errored_binding_recovers_on_new_source() {
    let factory = FakeEngineFactory::new();
    let controller = PlaybackController::new(
        FakeSurface::new(),
        Some(stream_source()),
        PlaybackPolicy::default(),
        engine_env(&factory),
    );
    controller.on_engine_event(EngineEvent::Error {
        fatal: true,
        details: "levelLoadError".into(),
    });
    assert_eq!(controller.state(), PlaybackState::Errored);

    controller.on_source_changed(Some(other_stream_source()));

    assert_eq!(controller.state(), PlaybackState::Attaching);
    assert_eq!(factory.live(), 1);
}

#[tokio::test(start_paused = true)]
async fn errored_binding_retries_same_source() {
    let factory = FakeEngineFactory::new();
    let controller = PlaybackController::new(
        FakeSurface::new(),
        Some(stream_source()),
        PlaybackPolicy::default(),
        engine_env(&factory),
    );
    controller.on_engine_event(EngineEvent::Error {
        fatal: true,
        details: "manifestLoadError".into(),
    });
    assert_eq!(controller.state(), PlaybackState::Errored);
    assert_eq!(factory.live(), 0);

    controller.on_source_changed(Some(stream_source()));

    assert_eq!(controller.state(), PlaybackState::Attaching);
    assert_eq!(factory.created(), 2);
    assert_eq!(factory.live(), 1);

    controller.on_engine_event(EngineEvent::ManifestParsed { levels: ladder() });
    assert_eq!(controller.state(), PlaybackState::Ready);
}

#[tokio::test(start_paused = true)]
async fn ended_clip_replays_after_same_source_reload() {
    let surface = FakeSurface::new();
    let controller = PlaybackController::new(
        surface.clone(),
        Some(file_source()),
        PlaybackPolicy::default(),
        PlaybackEnv::default(),
    );
    preload(&controller);
    controller.request_play(true).await.unwrap();
    controller.on_surface_event(SurfaceEvent::Ended);
    assert_eq!(controller.state(), PlaybackState::Ended);

    controller.on_source_changed(Some(file_source()));
    assert_eq!(controller.state(), PlaybackState::Ready);
    assert!(!controller.has_ever_rendered_frame());

    preload(&controller);
    assert_eq!(controller.request_play(true).await, Ok(PlaybackState::Playing));
    assert_eq!(surface.play_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn fatal_engine_error_after_end_is_ignored() {
    let factory = FakeEngineFactory::new();
    let env = engine_env(&factory);
    let mut events = env.bus.subscribe();
    let controller = PlaybackController::new(
        FakeSurface::new(),
        Some(stream_source()),
        PlaybackPolicy::default(),
        env,
    );
    controller.on_engine_event(EngineEvent::ManifestParsed { levels: ladder() });
    preload(&controller);
    controller.request_play(true).await.unwrap();
    controller.on_surface_event(SurfaceEvent::Ended);
    drain(&mut events);

    controller.on_engine_event(EngineEvent::Error {
        fatal: true,
        details: "bufferStalledError".into(),
    });

    assert_eq!(controller.state(), PlaybackState::Ended);
    assert!(drain(&mut events).is_empty());
    assert_eq!(factory.live(), 1);
}

#[tokio::test(start_paused = true)]
async fn pending_play_fails_when_source_changes() {
    let factory = FakeEngineFactory::new();
    let controller = PlaybackController::new(
        FakeSurface::new(),
        Some(stream_source()),
        PlaybackPolicy::default().with_lazy(true),
        engine_env(&factory),
    );

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.request_play(true).await }
    });
    settle().await;
    assert_eq!(controller.state(), PlaybackState::Attaching);

    controller.on_source_changed(Some(other_stream_source()));

    assert_eq!(pending.await.unwrap(), Err(PlayError::SourceChanged));
    assert_eq!(controller.state(), PlaybackState::Idle);
    assert_eq!(factory.live(), 0);
}

#[tokio::test(start_paused = true)]
async fn dispose_tears_down_and_rejects_requests() {
    let factory = FakeEngineFactory::new();
    let controller = PlaybackController::new(
        FakeSurface::new(),
        Some(stream_source()),
        PlaybackPolicy::default(),
        engine_env(&factory),
    );

    controller.dispose();
    controller.dispose();

    assert!(controller.is_disposed());
    assert_eq!(controller.state(), PlaybackState::Idle);
    assert_eq!(factory.destroyed(), 1);
    assert_eq!(controller.request_play(true).await, Err(PlayError::Disposed));

    controller.on_source_changed(Some(other_stream_source()));
    controller.activate();
    assert_eq!(factory.created(), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_last_handle_destroys_engine() {
    let factory = FakeEngineFactory::new();
    let controller = PlaybackController::new(
        FakeSurface::new(),
        Some(stream_source()),
        PlaybackPolicy::default(),
        engine_env(&factory),
    );
    let clone = controller.clone();

    drop(controller);
    assert_eq!(factory.live(), 1);
    drop(clone);
    assert_eq!(factory.live(), 0);
}

#[rstest]
#[case::explicit_poster(Some("/posters/box.jpg"), stream_source(), Some("/posters/box.jpg".to_string()))]
#[case::stream_thumbnail(
    None,
    stream_source(),
    Some(format!(
        "https://customer-f33zs165nr7gyfy4.cloudflarestream.com/{}/thumbnails/thumbnail.jpg?time=0s&width=1280",
        fixture::VIDEO_ID
    ))
)]
#[case::plain_file(None, file_source(), None)]
#[tokio::test(start_paused = true)]
async fn poster_resolution(
    #[case] poster: Option<&str>,
    #[case] source: MediaSource,
    #[case] expected: Option<String>,
) {
    let mut policy = PlaybackPolicy::default().with_lazy(true);
    policy.poster = poster.map(str::to_string);
    let env = PlaybackEnv::default().with_thumbnails(ThumbnailResolver::new());
    let controller = PlaybackController::new(Arc::new(FakeSurface::default()), Some(source), policy, env);

    assert_eq!(controller.poster_url(), expected);
}
