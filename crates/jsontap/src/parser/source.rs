//! The byte stream a [`Parser`](crate::Parser) reads from.
//!
//! A source is owned by the parser for the whole parse. The parser closes it
//! at most once, when parsing is stopped.

use std::{fmt, io, io::BufRead};

use bstr::ByteSlice;

/// Outcome of one [`ByteSource::read_chunk`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// Number of bytes appended to the output buffer.
    pub len: usize,
    /// Whether the chunk ends with the requested terminator.
    pub terminated: bool,
}

impl Chunk {
    /// A read that made no progress signals end of stream.
    #[must_use]
    pub fn is_eof(self) -> bool {
        self.len == 0 && !self.terminated
    }
}

/// A sequential byte stream that is read in bounded chunks.
pub trait ByteSource {
    /// Appends at most `max` bytes to `out`, stopping right after
    /// `terminator` if it occurs first. The terminator stays in the output.
    ///
    /// Blocks until at least one byte is available or the stream ends. A
    /// closed source behaves as if it were at end of stream.
    fn read_chunk(&mut self, out: &mut Vec<u8>, max: usize, terminator: &[u8])
    -> io::Result<Chunk>;

    /// Releases the underlying stream.
    fn close(&mut self) -> io::Result<()>;

    /// False once [`close`](Self::close) has been called.
    fn is_open(&self) -> bool;
}

type CloseHook<R> = Box<dyn FnOnce(R) -> io::Result<()>>;

/// Adapts any [`BufRead`] into a [`ByteSource`].
///
/// Closing drops the reader, or hands it to the hook given to
/// [`ReaderSource::with_close`] so that wrappers needing an explicit finish
/// step (compressed streams, sockets) can perform it.
pub struct ReaderSource<R> {
    reader: Option<R>,
    on_close: Option<CloseHook<R>>,
}

impl<R: fmt::Debug> fmt::Debug for ReaderSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderSource")
            .field("reader", &self.reader)
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}

impl<R: BufRead> ReaderSource<R> {
    /// A source that closes by dropping `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            on_close: None,
        }
    }

    /// A source that passes `reader` to `on_close` when closed.
    pub fn with_close(reader: R, on_close: impl FnOnce(R) -> io::Result<()> + 'static) -> Self {
        Self {
            reader: Some(reader),
            on_close: Some(Box::new(on_close)),
        }
    }
}

impl<R: BufRead> ByteSource for ReaderSource<R> {
    fn read_chunk(
        &mut self,
        out: &mut Vec<u8>,
        max: usize,
        terminator: &[u8],
    ) -> io::Result<Chunk> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(Chunk {
                len: 0,
                terminated: false,
            });
        };

        let start = out.len();
        let mut terminated = false;
        while !terminated && out.len() - start < max {
            let available = match reader.fill_buf() {
                Ok(available) => available,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            };
            if available.is_empty() {
                break;
            }

            let take = available.len().min(max - (out.len() - start));
            // A terminator may straddle two fills.
            let search_from = out.len() - terminator.len().saturating_sub(1).min(out.len() - start);
            out.extend_from_slice(&available[..take]);

            let mut consumed = take;
            if !terminator.is_empty() {
                if let Some(i) = out[search_from..].find(terminator) {
                    let end = search_from + i + terminator.len();
                    consumed -= out.len() - end;
                    out.truncate(end);
                    terminated = true;
                }
            }
            reader.consume(consumed);
        }

        Ok(Chunk {
            len: out.len() - start,
            terminated,
        })
    }

    fn close(&mut self) -> io::Result<()> {
        match (self.reader.take(), self.on_close.take()) {
            (Some(reader), Some(on_close)) => on_close(reader),
            _ => Ok(()),
        }
    }

    fn is_open(&self) -> bool {
        self.reader.is_some()
    }
}
