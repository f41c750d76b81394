//! Test helpers for the transport module.

use std::collections::VecDeque;
use std::io::{self, Read};
use std::os::unix::net::UnixStream;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use super::{ConnectionHandler, ConnectionSource};
use crate::process::ShutdownSignal;
use crate::process::test_support::FlagShutdown;

pub(crate) struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Self) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = Self {
            count: Arc::clone(&count),
        };
        (count, handler)
    }
}

impl ConnectionHandler for CountingHandler {
    fn handle(&self, _stream: UnixStream, _shutdown: &dyn ShutdownSignal) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Records every request body it reads, replying with nothing.
#[derive(Default, Clone)]
pub(crate) struct RecordingHandler {
    requests: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl RecordingHandler {
    pub(crate) fn requests(&self) -> Vec<Vec<u8>> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl ConnectionHandler for RecordingHandler {
    fn handle(&self, mut stream: UnixStream, _shutdown: &dyn ShutdownSignal) {
        let mut request = Vec::new();
        if stream.read_to_end(&mut request).is_ok()
            && let Ok(mut guard) = self.requests.lock()
        {
            guard.push(request);
        }
    }
}

/// Replays queued accept outcomes, then raises `shutdown` once drained.
pub(crate) struct ScriptedSource {
    outcomes: Mutex<VecDeque<io::Result<Option<UnixStream>>>>,
    shutdown: FlagShutdown,
}

impl ScriptedSource {
    pub(crate) fn new(
        outcomes: impl IntoIterator<Item = io::Result<Option<UnixStream>>>,
        shutdown: FlagShutdown,
    ) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            shutdown,
        }
    }
}

impl ConnectionSource for ScriptedSource {
    fn accept(&self) -> io::Result<Option<UnixStream>> {
        let next = self
            .outcomes
            .lock()
            .ok()
            .and_then(|mut outcomes| outcomes.pop_front());
        match next {
            Some(outcome) => outcome,
            None => {
                self.shutdown.request();
                Ok(None)
            }
        }
    }
}
