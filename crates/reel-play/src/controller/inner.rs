use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use parking_lot::Mutex;
use reel_abr::{PinRelease, QualityPin, select_start_level, target_height};
use reel_core::{ControllerId, MediaSource, PlaybackState};
use reel_events::{ErrorKind, PlaybackEvent, QualityEvent};
use reel_thumb::ThumbnailRequest;
use tokio::{sync::watch, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use web_time::Instant;

use super::binding::{Binding, SharedEngine};
use crate::{
    capabilities::PlaybackPath,
    config::EngineConfig,
    env::PlaybackEnv,
    error::{EngineError, PlayError},
    policy::PlaybackPolicy,
    registry::Preemptible,
    traits::{
        engine::EngineEvent,
        surface::{MediaSurface, ReadyState, SurfaceEvent, SurfaceSetup},
    },
};

#[derive(Clone, Copy, Debug)]
enum Timer {
    LayoutSettled,
    PinTimeout,
    FirstFrame,
}

enum Admission {
    Proceed(u64),
    Done(PlaybackState),
}

pub(super) struct Inner<S: MediaSurface> {
    pub(super) id: ControllerId,
    weak: Weak<Inner<S>>,
    pub(super) surface: Arc<S>,
    pub(super) policy: PlaybackPolicy,
    pub(super) env: PlaybackEnv,
    pub(super) state_tx: watch::Sender<PlaybackState>,
    pub(super) binding: Mutex<Binding>,
}

impl<S: MediaSurface> Inner<S> {
    pub(super) fn new(
        surface: Arc<S>,
        source: Option<MediaSource>,
        policy: PlaybackPolicy,
        env: PlaybackEnv,
    ) -> Arc<Self> {
        let binding = Binding::new(source, policy.timing.loop_end_epsilon);
        Arc::new_cyclic(|weak| Self {
            id: ControllerId::next(),
            weak: weak.clone(),
            surface,
            policy,
            env,
            state_tx: watch::Sender::new(PlaybackState::Idle),
            binding: Mutex::new(binding),
        })
    }

    pub(super) fn state(&self) -> PlaybackState {
        *self.state_tx.borrow()
    }

    fn tag(&self) -> &str {
        self.policy.debug_tag.as_deref().unwrap_or_default()
    }

    /// Callers hold the binding lock, so state and binding change together.
    fn set_state(&self, state: PlaybackState) {
        let from = self.state_tx.send_replace(state);
        if from == state {
            return;
        }
        debug!(controller = %self.id, tag = self.tag(), %from, to = %state, "state changed");
        self.env.bus.publish(PlaybackEvent::StateChanged {
            controller: self.id,
            from,
            state,
        });
    }

    // -- activation -------------------------------------------------------

    pub(super) fn activate(&self, reason: &'static str) {
        let mut b = self.binding.lock();
        self.activate_locked(&mut b, reason);
    }

    pub(super) fn on_near_viewport(&self) {
        let mut b = self.binding.lock();
        b.near_viewport = true;
        self.activate_locked(&mut b, "near viewport");
    }

    fn activate_locked(&self, b: &mut Binding, reason: &'static str) {
        if b.disposed || self.state() != PlaybackState::Idle {
            return;
        }
        let Some(source) = b.source.clone() else {
            trace!(controller = %self.id, reason, "activation without source");
            return;
        };
        debug!(controller = %self.id, tag = self.tag(), reason, url = source.url(), "activating");
        self.attach(b, &source);
    }

    fn attach(&self, b: &mut Binding, source: &MediaSource) {
        self.set_state(PlaybackState::Attaching);

        let path = self
            .env
            .capabilities
            .resolve_path(source.kind(), self.env.has_engine());
        b.path = Some(path);
        debug!(controller = %self.id, ?path, "playback path resolved");
        self.surface
            .configure(&SurfaceSetup::for_policy(&self.policy, path));

        match path {
            PlaybackPath::Direct | PlaybackPath::Native => {
                self.surface.set_source(Some(source.url()));
                if path == PlaybackPath::Native {
                    self.surface.load();
                }
                let surface = Arc::clone(&self.surface);
                b.disposer.defer(move || surface.set_source(None));
                self.start_loop_watch(b);
                self.enter_ready(b);
            }
            PlaybackPath::Engine => match self.attach_engine(b, source) {
                Ok(()) => self.start_loop_watch(b),
                Err(e) => self.fail(
                    b,
                    ErrorKind::AttachmentFailed,
                    PlayError::AttachmentFailed {
                        reason: e.to_string(),
                    },
                ),
            },
        }
    }

    fn attach_engine(&self, b: &mut Binding, source: &MediaSource) -> Result<(), EngineError> {
        let factory = self.env.engines.as_ref().ok_or(EngineError::Unsupported)?;
        let config = EngineConfig::for_policy(&self.policy);
        let mut engine = factory.create(&config)?;

        let attached = engine
            .attach()
            .and_then(|()| engine.load_source(source.url()));
        if let Err(e) = attached {
            engine.destroy();
            return Err(e);
        }

        let engine: SharedEngine = Arc::new(Mutex::new(engine));
        let teardown = Arc::clone(&engine);
        b.disposer.defer(move || teardown.lock().destroy());
        b.engine = Some(engine);
        Ok(())
    }

    fn enter_ready(&self, b: &Binding) {
        self.set_state(PlaybackState::Ready);
        if self.policy.autoplay_allowed {
            self.spawn_autoplay(b.disposer.token());
        }
    }

    fn spawn_autoplay(&self, token: CancellationToken) {
        let weak = self.weak.clone();
        tokio::spawn(async move {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            tokio::select! {
                () = token.cancelled() => {}
                result = inner.request_play(false) => {
                    if let Err(e) = result {
                        debug!(controller = %inner.id, error = %e, "autoplay did not start");
                    }
                }
            }
        });
    }

    // -- timers -----------------------------------------------------------

    fn spawn_timer(&self, token: CancellationToken, delay: Duration, generation: u64, timer: Timer) {
        let weak = self.weak.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    if let Some(inner) = weak.upgrade() {
                        inner.on_timer(generation, timer);
                    }
                }
            }
        });
    }

    fn on_timer(&self, generation: u64, timer: Timer) {
        let mut b = self.binding.lock();
        if b.disposed || b.generation != generation {
            trace!(controller = %self.id, ?timer, "stale timer");
            return;
        }

        match timer {
            Timer::LayoutSettled => {
                if self.state() == PlaybackState::Attaching {
                    self.apply_start_level(&mut b);
                }
            }
            Timer::PinTimeout => {
                let released = b.pin.as_mut().and_then(QualityPin::on_timeout);
                if let Some(reason) = released {
                    self.on_pin_released(&mut b, reason);
                }
            }
            Timer::FirstFrame => {
                if b.first_frame_wait.take().is_some() && self.state() == PlaybackState::Starting {
                    debug!(controller = %self.id, "no frame signal, forcing playing");
                    self.enter_playing(&mut b, "timeout");
                }
            }
        }
    }

    fn start_loop_watch(&self, b: &Binding) {
        let period = self.policy.timing.loop_watch_interval;
        if !self.policy.loop_playback || period.is_zero() {
            return;
        }

        let token = b.disposer.token();
        let weak = self.weak.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(inner) = weak.upgrade() else {
                            break;
                        };
                        inner.check_loop_position();
                    }
                }
            }
        });
    }

    // -- engine -----------------------------------------------------------

    pub(super) fn on_engine_event(&self, event: EngineEvent) {
        let mut b = self.binding.lock();
        if b.disposed || b.engine.is_none() {
            trace!(controller = %self.id, ?event, "engine event without engine");
            return;
        }

        match event {
            EngineEvent::ManifestParsed { levels } => {
                debug!(controller = %self.id, count = levels.len(), "manifest parsed");
                b.levels = levels;
                self.env.bus.publish(QualityEvent::LevelsDiscovered {
                    controller: self.id,
                    levels: b.levels.clone(),
                });
                if self.state() != PlaybackState::Attaching {
                    return;
                }
                if !self.policy.selects_start_level() || b.levels.is_empty() {
                    self.enter_ready(&mut b);
                    return;
                }

                let delay = self.policy.timing.layout_settle_delay;
                if delay.is_zero() {
                    self.apply_start_level(&mut b);
                } else {
                    self.spawn_timer(b.disposer.token(), delay, b.generation, Timer::LayoutSettled);
                }
            }
            EngineEvent::FragmentBuffered { buffered_ahead } => {
                let released = b
                    .pin
                    .as_mut()
                    .and_then(|pin| pin.on_fragment_buffered(buffered_ahead));
                if let Some(reason) = released {
                    self.on_pin_released(&mut b, reason);
                }
            }
            EngineEvent::LevelSwitched { level } => {
                trace!(controller = %self.id, level, "level switched");
                b.current_level = Some(level);
            }
            EngineEvent::Error { fatal: false, details } => {
                debug!(controller = %self.id, %details, "recoverable engine error");
            }
            EngineEvent::Error { fatal: true, details } => {
                self.fail(
                    &mut b,
                    ErrorKind::FatalStream,
                    PlayError::FatalStream { reason: details },
                );
            }
        }
    }

    fn apply_start_level(&self, b: &mut Binding) {
        let startup = &self.policy.startup;
        let measured = self.surface.measured_height();
        let target = target_height(
            startup,
            self.policy.hero_like,
            self.policy.startup_target,
            measured,
        );

        if let Some(decision) = select_start_level(b.levels.as_slice(), target, startup) {
            let level = decision.level_index;
            if let Some(engine) = &b.engine {
                let mut engine = engine.lock();
                engine.set_start_level(level);
                engine.set_current_level(level);
                engine.set_auto_level(false);
            }
            b.current_level = Some(level);
            b.pin = Some(QualityPin::new(level, self.policy.pin.clone()));

            info!(
                controller = %self.id,
                tag = self.tag(),
                level,
                height = decision.height,
                target,
                measured,
                "starting level pinned"
            );
            self.env.bus.publish(QualityEvent::LevelPinned {
                controller: self.id,
                level,
                height: decision.height,
                target_height: target,
                reason: decision.reason,
            });
            self.spawn_timer(
                b.disposer.token(),
                self.policy.pin.timeout,
                b.generation,
                Timer::PinTimeout,
            );
        }

        self.enter_ready(b);
    }

    fn on_pin_released(&self, b: &mut Binding, reason: PinRelease) {
        let Some(level) = b.pin.as_ref().map(QualityPin::level_index) else {
            return;
        };
        if let Some(engine) = &b.engine {
            engine.lock().set_auto_level(true);
        }
        self.env.bus.publish(QualityEvent::PinReleased {
            controller: self.id,
            level,
            reason,
        });
    }

    // -- play -------------------------------------------------------------

    pub(super) async fn request_play(
        self: &Arc<Self>,
        user_initiated: bool,
    ) -> Result<PlaybackState, PlayError> {
        let generation = match self.admit(user_initiated).await? {
            Admission::Proceed(generation) => generation,
            Admission::Done(state) => return Ok(state),
        };

        if user_initiated {
            if let Some(registry) = &self.env.registry {
                let member: Arc<dyn Preemptible> = self.clone();
                registry.claim(&member);
            }
        }

        let mut rx = self.state_tx.subscribe();
        {
            let mut b = self.binding.lock();
            if let Err(e) = self.check_current(&b, generation) {
                self.release_claim();
                return Err(e);
            }
            let state = self.state();
            match state {
                PlaybackState::Ready | PlaybackState::Paused => {}
                PlaybackState::Playing => return Ok(state),
                _ => {
                    self.release_claim();
                    return Err(PlayError::InvalidState { state });
                }
            }

            b.resume_state = state;
            if user_initiated {
                b.play_requested_at = Some(Instant::now());
            }
            self.set_state(PlaybackState::Starting);
            if !b.has_ever_rendered_frame {
                self.begin_first_frame_wait(&mut b);
            }
        }

        let result = self.surface.play().await;

        {
            let mut b = self.binding.lock();
            self.check_current(&b, generation)?;
            match result {
                Err(e) => {
                    if self.state() == PlaybackState::Starting {
                        self.cancel_first_frame_wait(&mut b);
                        self.set_state(b.resume_state);
                    }
                    b.play_requested_at = None;
                    self.release_claim();
                    warn!(controller = %self.id, tag = self.tag(), error = %e, "play rejected");
                    return Err(PlayError::PlaybackRejected {
                        reason: e.to_string(),
                    });
                }
                Ok(()) => {
                    if self.state() == PlaybackState::Starting && b.has_ever_rendered_frame {
                        self.enter_playing(&mut b, "resume");
                    }
                }
            }
        }

        loop {
            {
                let b = self.binding.lock();
                self.check_current(&b, generation)?;
                match self.state() {
                    PlaybackState::Starting => {
                        rx.borrow_and_update();
                    }
                    PlaybackState::Errored => {
                        return Err(b.last_error.clone().unwrap_or(PlayError::InvalidState {
                            state: PlaybackState::Errored,
                        }));
                    }
                    state => return Ok(state),
                }
            }
            rx.changed().await.map_err(|_| PlayError::Disposed)?;
        }
    }

    /// Wait until the binding can start playback.
    async fn admit(&self, user_initiated: bool) -> Result<Admission, PlayError> {
        let mut rx = self.state_tx.subscribe();
        let mut waited = false;
        loop {
            let generation = {
                let mut b = self.binding.lock();
                if b.disposed {
                    return Err(PlayError::Disposed);
                }
                if b.source.is_none() {
                    return Err(PlayError::NoSource);
                }
                if !user_initiated && !self.policy.autoplay_allowed {
                    return Err(PlayError::AutoplayNotAllowed);
                }

                match self.state() {
                    PlaybackState::Ready | PlaybackState::Paused => {
                        return Ok(Admission::Proceed(b.generation));
                    }
                    PlaybackState::Playing => return Ok(Admission::Done(PlaybackState::Playing)),
                    PlaybackState::Errored if waited => {
                        return Err(b.last_error.clone().unwrap_or(PlayError::InvalidState {
                            state: PlaybackState::Errored,
                        }));
                    }
                    state @ (PlaybackState::Ended | PlaybackState::Errored) => {
                        return Err(PlayError::InvalidState { state });
                    }
                    PlaybackState::Idle => {
                        self.activate_locked(&mut b, "play request");
                        waited = true;
                        continue;
                    }
                    PlaybackState::Attaching | PlaybackState::Starting => {}
                }
                rx.borrow_and_update();
                b.generation
            };

            waited = true;
            rx.changed().await.map_err(|_| PlayError::Disposed)?;
            self.check_current(&self.binding.lock(), generation)?;
        }
    }

    fn check_current(&self, b: &Binding, generation: u64) -> Result<(), PlayError> {
        if b.disposed {
            Err(PlayError::Disposed)
        } else if b.generation != generation {
            Err(PlayError::SourceChanged)
        } else {
            Ok(())
        }
    }

    fn enter_playing(&self, b: &mut Binding, via: &'static str) {
        self.set_state(PlaybackState::Playing);
        if let Some(requested_at) = b.play_requested_at.take() {
            let click_to_playing_ms =
                u64::try_from(requested_at.elapsed().as_millis()).unwrap_or(u64::MAX);
            info!(controller = %self.id, tag = self.tag(), click_to_playing_ms, via, "playing");
        }
    }

    fn begin_first_frame_wait(&self, b: &mut Binding) {
        self.cancel_first_frame_wait(b);

        b.frame_callback_pending =
            self.env.capabilities.frame_callbacks && self.surface.request_frame_callback();
        let token = b.disposer.token().child_token();
        self.spawn_timer(
            token.clone(),
            self.policy.timing.first_frame_timeout,
            b.generation,
            Timer::FirstFrame,
        );
        b.first_frame_wait = Some(token);
    }

    fn cancel_first_frame_wait(&self, b: &mut Binding) {
        if let Some(token) = b.first_frame_wait.take() {
            token.cancel();
        }
        if std::mem::take(&mut b.frame_callback_pending) {
            self.surface.cancel_frame_callback();
        }
    }

    fn mark_first_frame(&self, b: &mut Binding, method: &'static str) {
        if !b.has_ever_rendered_frame {
            b.has_ever_rendered_frame = true;
            debug!(controller = %self.id, tag = self.tag(), method, "first frame painted");
            self.env
                .bus
                .publish(PlaybackEvent::FirstFramePainted { controller: self.id });
        }
        if self.state() == PlaybackState::Starting {
            self.cancel_first_frame_wait(b);
            self.enter_playing(b, method);
        }
    }

    pub(super) fn on_frame_presented(&self, media_time: Duration) {
        let mut b = self.binding.lock();
        if b.disposed || !b.frame_callback_pending {
            return;
        }
        b.frame_callback_pending = false;

        if !media_time.is_zero() {
            self.mark_first_frame(&mut b, "frame-callback");
        } else if self.state() == PlaybackState::Starting {
            // Nothing decoded yet; wait for the next presented frame.
            b.frame_callback_pending = self.surface.request_frame_callback();
        }
    }

    pub(super) fn on_surface_event(&self, event: SurfaceEvent) {
        let mut b = self.binding.lock();
        let state = self.state();
        if b.disposed || state == PlaybackState::Idle || state.is_terminal() {
            trace!(controller = %self.id, ?event, %state, "surface event ignored");
            return;
        }

        match event {
            SurfaceEvent::Play => trace!(controller = %self.id, "surface play"),
            SurfaceEvent::Playing => self.mark_first_frame(&mut b, "playing-event"),
            SurfaceEvent::LoadedData => {
                if self.surface.ready_state() >= ReadyState::HaveCurrentData {
                    self.mark_first_frame(&mut b, "loaded-data");
                }
            }
            SurfaceEvent::TimeUpdate => {
                if !self.surface.current_time().is_zero() {
                    self.mark_first_frame(&mut b, "time-update");
                }
                self.check_loop_locked(&mut b);
            }
            SurfaceEvent::Pause => {
                if state.is_active() {
                    self.cancel_first_frame_wait(&mut b);
                    b.play_requested_at = None;
                    self.set_state(PlaybackState::Paused);
                    self.release_claim();
                }
            }
            SurfaceEvent::Ended => self.on_ended(&mut b),
            SurfaceEvent::Error { details } => {
                self.fail(&mut b, ErrorKind::Media, PlayError::FatalStream { reason: details });
            }
        }
    }

    fn on_ended(&self, b: &mut Binding) {
        if !self.state().is_active() {
            return;
        }
        if !self.policy.loop_playback {
            self.cancel_first_frame_wait(b);
            self.set_state(PlaybackState::Ended);
            self.release_claim();
            return;
        }

        if b.loop_guard.on_natural_end() {
            self.restart(b, "ended");
        } else {
            trace!(controller = %self.id, "ended during loop restart ignored");
        }
    }

    // -- loop -------------------------------------------------------------

    pub(super) fn check_loop_position(&self) -> bool {
        let mut b = self.binding.lock();
        self.check_loop_locked(&mut b)
    }

    fn check_loop_locked(&self, b: &mut Binding) -> bool {
        if b.disposed || !self.policy.loop_playback || self.state() != PlaybackState::Playing {
            return false;
        }
        let position = self.surface.current_time();
        if b.loop_guard.observe(position, self.surface.duration()) {
            self.restart(b, "watcher");
            true
        } else {
            false
        }
    }

    fn restart(&self, b: &mut Binding, trigger: &'static str) {
        debug!(controller = %self.id, tag = self.tag(), trigger, "loop restart");
        let generation = b.generation;
        b.resume_state = PlaybackState::Paused;
        self.set_state(PlaybackState::Starting);

        self.surface.seek(Duration::ZERO);
        if let Some(engine) = &b.engine {
            engine.lock().restart_load();
        }
        if !b.has_ever_rendered_frame {
            self.begin_first_frame_wait(b);
        }

        let token = b.disposer.token();
        let surface = Arc::clone(&self.surface);
        let weak = self.weak.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                () = token.cancelled() => return,
                result = surface.play() => result,
            };
            if let Some(inner) = weak.upgrade() {
                inner.finish_restart(generation, result.is_ok());
            }
        });
    }

    fn finish_restart(&self, generation: u64, resumed: bool) {
        let mut b = self.binding.lock();
        if self.check_current(&b, generation).is_err() {
            return;
        }
        b.loop_guard.restart_finished();
        if self.state() != PlaybackState::Starting {
            return;
        }
        if !resumed {
            warn!(controller = %self.id, "loop restart rejected");
            self.cancel_first_frame_wait(&mut b);
            self.set_state(PlaybackState::Paused);
            self.release_claim();
        } else if b.has_ever_rendered_frame {
            self.enter_playing(&mut b, "loop");
        }
    }

    // -- pause ------------------------------------------------------------

    pub(super) fn pause_now(&self, reason: &'static str) {
        let mut b = self.binding.lock();
        if b.disposed {
            return;
        }
        if self.state().is_active() {
            debug!(controller = %self.id, tag = self.tag(), reason, "pausing");
            self.cancel_first_frame_wait(&mut b);
            self.surface.pause();
            self.set_state(PlaybackState::Paused);
        }
        b.play_requested_at = None;
        self.release_claim();
    }

    fn release_claim(&self) {
        if let Some(registry) = &self.env.registry {
            registry.release(self.id);
        }
    }

    // -- lifecycle --------------------------------------------------------

    fn fail(&self, b: &mut Binding, kind: ErrorKind, error: PlayError) {
        if self.state().is_terminal() {
            return;
        }
        warn!(controller = %self.id, tag = self.tag(), ?kind, error = %error, "playback failed");
        self.teardown(b);
        b.last_error = Some(error.clone());
        self.set_state(PlaybackState::Errored);
        self.env.bus.publish(PlaybackEvent::Errored {
            controller: self.id,
            kind,
            reason: error.to_string(),
        });
    }

    /// Release everything the current attach cycle acquired.
    fn teardown(&self, b: &mut Binding) {
        self.cancel_first_frame_wait(b);
        if let Some(pin) = b.pin.as_mut() {
            pin.cancel();
        }
        let actions = b.disposer.dispose();
        b.engine = None;
        b.play_requested_at = None;
        self.release_claim();
        if actions > 0 {
            debug!(controller = %self.id, actions, "binding torn down");
        }
    }

    pub(super) fn on_source_changed(&self, source: Option<MediaSource>) {
        let mut b = self.binding.lock();
        if b.disposed || (b.source == source && !self.state().is_terminal()) {
            return;
        }
        info!(
            controller = %self.id,
            tag = self.tag(),
            url = source.as_ref().map(MediaSource::url),
            "source changed"
        );

        self.teardown(&mut b);
        b.rebind(source, self.policy.timing.loop_end_epsilon);
        self.set_state(PlaybackState::Idle);

        if self.policy.is_eager() || b.near_viewport {
            self.activate_locked(&mut b, "source changed");
        }
    }

    pub(super) fn dispose(&self) {
        let mut b = self.binding.lock();
        if b.disposed {
            return;
        }
        self.teardown(&mut b);
        b.disposed = true;
        self.set_state(PlaybackState::Idle);
        debug!(controller = %self.id, tag = self.tag(), "disposed");
    }

    pub(super) fn poster_url(&self) -> Option<String> {
        if let Some(poster) = &self.policy.poster {
            return Some(poster.clone());
        }
        let b = self.binding.lock();
        let request = ThumbnailRequest {
            time: self.policy.thumbnail_time,
            width: self.policy.thumbnail_width,
        };
        self.env
            .thumbnails
            .resolve(b.source.as_ref()?, request)
            .map(String::from)
    }
}

impl<S: MediaSurface> Preemptible for Inner<S> {
    fn controller_id(&self) -> ControllerId {
        self.id
    }

    fn preempt(&self) {
        self.pause_now("preempted");
    }
}

impl<S: MediaSurface> Drop for Inner<S> {
    fn drop(&mut self) {
        let mut b = self.binding.lock();
        if !b.disposed {
            self.teardown(&mut b);
        }
    }
}
