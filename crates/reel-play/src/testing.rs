//! Hand-written fakes for the surface and engine traits.
//!
//! Both fakes record every call and let tests script the outcome of the
//! next play request or engine construction. They never emit events on
//! their own: tests forward [`SurfaceEvent`](crate::SurfaceEvent)s and
//! [`EngineEvent`](crate::EngineEvent)s to the controller explicitly, the
//! same way a host would.

use std::{collections::VecDeque, sync::Arc, time::Duration};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    config::EngineConfig,
    error::{EngineError, SurfaceError},
    traits::{
        engine::{EngineFactory, StreamingEngine},
        surface::{MediaSurface, ReadyState, SurfaceSetup},
    },
};

#[derive(Debug, Default)]
struct SurfaceState {
    setup: Option<SurfaceSetup>,
    source: Option<String>,
    play_results: VecDeque<Result<(), SurfaceError>>,
    play_calls: usize,
    pause_calls: usize,
    load_calls: usize,
    seeks: Vec<Duration>,
    current_time: Duration,
    duration: Option<Duration>,
    ready_state: ReadyState,
    measured_height: Option<u32>,
    frame_callbacks_requested: usize,
    frame_callbacks_cancelled: usize,
}

/// Scriptable [`MediaSurface`]. Play requests succeed unless a result was
/// queued with [`push_play_result`](Self::push_play_result).
#[derive(Debug, Default)]
pub struct FakeSurface {
    state: Mutex<SurfaceState>,
}

impl FakeSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_measured_height(height: u32) -> Arc<Self> {
        let surface = Self::default();
        surface.state.lock().measured_height = Some(height);
        Arc::new(surface)
    }

    pub fn push_play_result(&self, result: Result<(), SurfaceError>) {
        self.state.lock().play_results.push_back(result);
    }

    /// Queue a rejection for the next play request.
    pub fn reject_next_play(&self) {
        self.push_play_result(Err(SurfaceError::NotAllowed("user gesture required".into())));
    }

    pub fn set_current_time(&self, time: Duration) {
        self.state.lock().current_time = time;
    }

    pub fn set_duration(&self, duration: Option<Duration>) {
        self.state.lock().duration = duration;
    }

    pub fn set_ready_state(&self, ready_state: ReadyState) {
        self.state.lock().ready_state = ready_state;
    }

    pub fn setup(&self) -> Option<SurfaceSetup> {
        self.state.lock().setup.clone()
    }

    pub fn source(&self) -> Option<String> {
        self.state.lock().source.clone()
    }

    pub fn play_calls(&self) -> usize {
        self.state.lock().play_calls
    }

    pub fn pause_calls(&self) -> usize {
        self.state.lock().pause_calls
    }

    pub fn load_calls(&self) -> usize {
        self.state.lock().load_calls
    }

    pub fn seeks(&self) -> Vec<Duration> {
        self.state.lock().seeks.clone()
    }

    pub fn frame_callbacks_requested(&self) -> usize {
        self.state.lock().frame_callbacks_requested
    }

    pub fn frame_callbacks_cancelled(&self) -> usize {
        self.state.lock().frame_callbacks_cancelled
    }
}

#[async_trait]
impl MediaSurface for FakeSurface {
    fn configure(&self, setup: &SurfaceSetup) {
        self.state.lock().setup = Some(setup.clone());
    }

    fn set_source(&self, url: Option<&str>) {
        self.state.lock().source = url.map(str::to_string);
    }

    fn load(&self) {
        self.state.lock().load_calls += 1;
    }

    async fn play(&self) -> Result<(), SurfaceError> {
        let result = {
            let mut state = self.state.lock();
            state.play_calls += 1;
            state.play_results.pop_front().unwrap_or(Ok(()))
        };
        tokio::task::yield_now().await;
        result
    }

    fn pause(&self) {
        self.state.lock().pause_calls += 1;
    }

    fn seek(&self, position: Duration) {
        let mut state = self.state.lock();
        state.seeks.push(position);
        state.current_time = position;
    }

    fn current_time(&self) -> Duration {
        self.state.lock().current_time
    }

    fn duration(&self) -> Option<Duration> {
        self.state.lock().duration
    }

    fn ready_state(&self) -> ReadyState {
        self.state.lock().ready_state
    }

    fn measured_height(&self) -> Option<u32> {
        self.state.lock().measured_height
    }

    fn request_frame_callback(&self) -> bool {
        self.state.lock().frame_callbacks_requested += 1;
        true
    }

    fn cancel_frame_callback(&self) {
        self.state.lock().frame_callbacks_cancelled += 1;
    }
}

/// Calls received by a [`FakeEngine`], in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineCall {
    Attach,
    LoadSource(String),
    RestartLoad,
    SetStartLevel(usize),
    SetCurrentLevel(usize),
    SetAutoLevel(bool),
    Destroy,
}

#[derive(Debug, Default)]
struct EngineLog {
    created: usize,
    destroyed: usize,
    live: usize,
    max_live: usize,
    configs: Vec<EngineConfig>,
    calls: Vec<EngineCall>,
    fail_create: bool,
    fail_attach: bool,
}

/// [`EngineFactory`] producing [`FakeEngine`]s that share one call log.
#[derive(Clone, Debug, Default)]
pub struct FakeEngineFactory {
    log: Arc<Mutex<EngineLog>>,
}

impl FakeEngineFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_create(&self, fail: bool) {
        self.log.lock().fail_create = fail;
    }

    pub fn fail_attach(&self, fail: bool) {
        self.log.lock().fail_attach = fail;
    }

    pub fn created(&self) -> usize {
        self.log.lock().created
    }

    pub fn destroyed(&self) -> usize {
        self.log.lock().destroyed
    }

    /// Engines created and not yet destroyed.
    pub fn live(&self) -> usize {
        self.log.lock().live
    }

    /// Highest number of simultaneously live engines observed.
    pub fn max_live(&self) -> usize {
        self.log.lock().max_live
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.log.lock().calls.clone()
    }

    pub fn last_config(&self) -> Option<EngineConfig> {
        self.log.lock().configs.last().cloned()
    }
}

impl EngineFactory for FakeEngineFactory {
    fn create(&self, config: &EngineConfig) -> Result<Box<dyn StreamingEngine>, EngineError> {
        let mut log = self.log.lock();
        if log.fail_create {
            return Err(EngineError::Unsupported);
        }
        log.created += 1;
        log.live += 1;
        log.max_live = log.max_live.max(log.live);
        log.configs.push(config.clone());
        Ok(Box::new(FakeEngine {
            log: Arc::clone(&self.log),
            destroyed: false,
        }))
    }
}

pub struct FakeEngine {
    log: Arc<Mutex<EngineLog>>,
    destroyed: bool,
}

impl FakeEngine {
    fn record(&self, call: EngineCall) {
        self.log.lock().calls.push(call);
    }
}

impl StreamingEngine for FakeEngine {
    fn attach(&mut self) -> Result<(), EngineError> {
        self.record(EngineCall::Attach);
        if self.log.lock().fail_attach {
            return Err(EngineError::Attach("media source extensions unavailable".into()));
        }
        Ok(())
    }

    fn load_source(&mut self, url: &str) -> Result<(), EngineError> {
        self.record(EngineCall::LoadSource(url.to_string()));
        Ok(())
    }

    fn restart_load(&mut self) {
        self.record(EngineCall::RestartLoad);
    }

    fn set_start_level(&mut self, level: usize) {
        self.record(EngineCall::SetStartLevel(level));
    }

    fn set_current_level(&mut self, level: usize) {
        self.record(EngineCall::SetCurrentLevel(level));
    }

    fn set_auto_level(&mut self, enabled: bool) {
        self.record(EngineCall::SetAutoLevel(enabled));
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.record(EngineCall::Destroy);
        let mut log = self.log.lock();
        log.destroyed += 1;
        log.live -= 1;
    }
}
