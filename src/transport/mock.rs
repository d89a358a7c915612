use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crate::core::{Error, Result};
use super::Transport;

#[derive(Debug, Clone)]
enum ScriptedRead {
    Byte(u8),
    Idle,
    Error(String),
}

/// Scripted in-memory transport for tests and dry runs.
///
/// Reads replay a script of bytes, idle polls and read errors. When the
/// script runs out the transport reports [`Error::TransportClosed`], unless
/// [`stay_open`](MockTransport::stay_open) was called, in which case it
/// keeps returning idle polls. Every write is recorded.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    script: VecDeque<ScriptedRead>,
    written: Vec<Vec<u8>>,
    failing_writes: usize,
    stay_open: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        MockTransport::default()
    }

    /// Transport that will deliver `bytes` and then close
    pub fn with_bytes(bytes: &[u8]) -> Self {
        let mut mock = MockTransport::new();
        mock.push_bytes(bytes);
        mock
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.script.extend(bytes.iter().map(|&b| ScriptedRead::Byte(b)));
        self
    }

    /// Queues `polls` reads that time out with no data
    pub fn push_idle(&mut self, polls: usize) -> &mut Self {
        self.script.extend(std::iter::repeat(ScriptedRead::Idle).take(polls));
        self
    }

    pub fn push_read_error(&mut self, reason: impl Into<String>) -> &mut Self {
        self.script.push_back(ScriptedRead::Error(reason.into()));
        self
    }

    /// Makes the next `count` writes fail
    pub fn fail_next_writes(&mut self, count: usize) -> &mut Self {
        self.failing_writes = count;
        self
    }

    /// Keep answering idle once the script is exhausted
    pub fn stay_open(&mut self) -> &mut Self {
        self.stay_open = true;
        self
    }

    /// Every successful write, in order
    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }

    /// Successful writes rendered as ASCII
    pub fn written_frames(&self) -> Vec<String> {
        self.written
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }
}

impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    fn read_byte(&mut self, timeout: Duration) -> Result<Option<u8>> {
        match self.script.pop_front() {
            Some(ScriptedRead::Byte(b)) => Ok(Some(b)),
            Some(ScriptedRead::Idle) => Ok(None),
            Some(ScriptedRead::Error(reason)) => Err(Error::read_failed(reason)),
            None if self.stay_open => {
                std::thread::sleep(timeout.min(Duration::from_millis(1)));
                Ok(None)
            }
            None => Err(Error::TransportClosed),
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if self.failing_writes > 0 {
            self.failing_writes -= 1;
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "injected write failure",
            )));
        }
        self.written.push(bytes.to_vec());
        Ok(())
    }
}
