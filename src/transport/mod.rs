//! Line-oriented transport seam between the session and the wire.

use crate::error::Result;

pub mod mock;
pub mod serial;

pub use mock::MockTransport;
pub use serial::SerialTransport;

/// A synchronous, line-oriented request/response channel.
///
/// The CS-2000A protocol is strictly sequential ASCII: one CRLF-terminated
/// command line out, one acknowledgement line back, no pipelining. These two
/// primitives are all a channel has to provide; the session owns the
/// sequencing.
pub trait Transport {
    /// Write one command line, appending the CRLF terminator.
    fn send_line(&mut self, line: &str) -> Result<()>;

    /// Read one response line, stripped of its terminator.
    ///
    /// A quiet channel is not an error: when nothing arrives within the
    /// channel's read timeout, whatever input accumulated (possibly an empty
    /// line) is returned as-is. The completion poll relies on this.
    fn read_line(&mut self) -> Result<String>;
}
