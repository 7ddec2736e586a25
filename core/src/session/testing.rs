//! Recording fakes for session tests.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::Path;
use std::rc::Rc;

use super::blob::{BlobError, BlobStore, BlobUrl};
use super::engine::{
    EngineConfig, EngineError, EngineHost, EngineInstance, EngineSignal, SessionToken, SignalKind,
    SignalSink,
};

/// Everything the fakes observe, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    BlobCreated(u64),
    BlobRevoked(u64),
    Started(u64),
    Pause(u64, bool),
    Volume(u64, f32),
    Stop(u64),
    Quit(u64),
    CloseAudio(u64),
    Detached(u64),
}

pub type Log = Rc<RefCell<Vec<Event>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub struct FakeHost {
    log: Log,
    configs: Vec<EngineConfig>,
    last: Option<(SessionToken, SignalSink)>,
    pub fail_start: bool,
    pub fail_pause: bool,
    /// Instances only support `detach`
    pub minimal: bool,
}

impl FakeHost {
    pub fn new(log: Log) -> Self {
        Self {
            log,
            configs: Vec::new(),
            last: None,
            fail_start: false,
            fail_pause: false,
            minimal: false,
        }
    }

    pub fn configs(&self) -> Vec<EngineConfig> {
        self.configs.clone()
    }

    /// Send a signal as the most recently started instance.
    pub fn emit(&self, kind: SignalKind) {
        if let Some((token, sink)) = &self.last {
            sink.send(EngineSignal { token: *token, kind }).unwrap();
        }
    }
}

impl EngineHost for FakeHost {
    fn start(
        &mut self,
        config: EngineConfig,
        token: SessionToken,
        sink: SignalSink,
    ) -> Result<Box<dyn EngineInstance>, EngineError> {
        if self.fail_start {
            return Err(EngineError::Rejected("no engine".to_string()));
        }

        self.log.borrow_mut().push(Event::Started(token.value()));
        self.configs.push(config);
        self.last = Some((token, sink));

        if self.minimal {
            return Ok(Box::new(MinimalInstance {
                token,
                log: self.log.clone(),
            }));
        }
        Ok(Box::new(FakeInstance {
            token,
            log: self.log.clone(),
            fail_pause: self.fail_pause,
        }))
    }
}

struct FakeInstance {
    token: SessionToken,
    log: Log,
    fail_pause: bool,
}

impl FakeInstance {
    fn record(&self, event: Event) -> Result<(), EngineError> {
        self.log.borrow_mut().push(event);
        Ok(())
    }
}

impl EngineInstance for FakeInstance {
    fn token(&self) -> SessionToken {
        self.token
    }

    fn pause(&mut self, paused: bool) -> Result<(), EngineError> {
        if self.fail_pause {
            return Err(EngineError::Rejected("pause".to_string()));
        }
        self.record(Event::Pause(self.token.value(), paused))
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), EngineError> {
        self.record(Event::Volume(self.token.value(), volume))
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        self.record(Event::Stop(self.token.value()))
    }

    fn quit(&mut self) -> Result<(), EngineError> {
        self.record(Event::Quit(self.token.value()))
    }

    fn close_audio(&mut self) -> Result<(), EngineError> {
        self.record(Event::CloseAudio(self.token.value()))
    }

    fn detach(self: Box<Self>) {
        self.log.borrow_mut().push(Event::Detached(self.token.value()));
    }
}

struct MinimalInstance {
    token: SessionToken,
    log: Log,
}

impl EngineInstance for MinimalInstance {
    fn token(&self) -> SessionToken {
        self.token
    }

    fn detach(self: Box<Self>) {
        self.log.borrow_mut().push(Event::Detached(self.token.value()));
    }
}

pub struct FakeBlobs {
    log: Log,
    next_id: u64,
    live: HashSet<u64>,
}

impl FakeBlobs {
    pub fn new(log: Log) -> Self {
        Self {
            log,
            next_id: 0,
            live: HashSet::new(),
        }
    }

    pub fn live(&self) -> &HashSet<u64> {
        &self.live
    }
}

impl BlobStore for FakeBlobs {
    fn create(&mut self, _source: &Path) -> Result<BlobUrl, BlobError> {
        self.next_id += 1;
        self.live.insert(self.next_id);
        self.log.borrow_mut().push(Event::BlobCreated(self.next_id));
        Ok(BlobUrl::new(self.next_id, format!("blob:{}", self.next_id)))
    }

    fn revoke(&mut self, blob: BlobUrl) {
        assert!(self.live.remove(&blob.id()), "blob {} released twice", blob.id());
        self.log.borrow_mut().push(Event::BlobRevoked(blob.id()));
    }
}
