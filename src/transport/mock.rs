//! Scripted transport for exercising the session without hardware.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::Transport;
use crate::error::Result;

/// In-memory stand-in for the serial channel.
///
/// Responses are played back in the order they were queued; once the script
/// runs out, reads return empty lines, which is exactly what a silent device
/// looks like through the one-second read timeout. Every line the session
/// sends is recorded for later assertion.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: VecDeque<String>,
    sent: Arc<Mutex<Vec<String>>>,
}

impl MockTransport {
    /// Queue up the response lines the fake device will produce.
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle on the wire log, usable after the session takes ownership of
    /// the transport.
    pub fn sent_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.sent)
    }
}

impl Transport for MockTransport {
    fn send_line(&mut self, line: &str) -> Result<()> {
        self.sent.lock().unwrap().push(line.to_string());
        Ok(())
    }

    fn read_line(&mut self) -> Result<String> {
        Ok(self.responses.pop_front().unwrap_or_default())
    }
}
