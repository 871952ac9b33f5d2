//! The byte-driven JSON state machine and the loop that feeds it.
//!
//! Overview
//! - [`PushParser`] owns the state machine. It is fed raw bytes with
//!   [`PushParser::feed`] and reports each structural milestone to a
//!   [`Listener`] as soon as the byte that completes it has been consumed.
//!   State survives across calls, so input may be split anywhere, including
//!   inside strings, escapes and multi-byte characters.
//! - [`Parser`] pairs a `PushParser` with a [`ByteSource`] and drives it
//!   chunk by chunk until the stream ends or the parser is stopped.
//!
//! Documents
//! - A document is one top-level object or array. When its outermost
//!   container closes the machine waits in `EndDocument`; whitespace is
//!   tolerated there and the next `[` or `{` starts a new document. Any number
//!   of documents can follow each other on one stream without an enclosing
//!   array.
//!
//! Errors
//! - Every byte is consumed by a step that returns `Result`. The first error
//!   is final: it carries the line and column of the offending byte, and
//!   every later `feed` returns the same error.
//!
//! Cancellation
//! - A [`StopHandle`] may be cloned into listeners or callbacks. A stop
//!   request takes effect once the byte currently being consumed is done; no
//!   further events are emitted and [`Parser`] closes its source.

mod error;
mod escape_buffer;
mod literal_buffer;
mod numbers;
mod options;
mod position;
mod source;

use std::{
    io::BufRead,
    ops::ControlFlow,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use escape_buffer::{Escape, UnicodeEscapeBuffer, encode_char};
pub use error::{ErrorCategory, ParseError, StreamError, SyntaxError};
pub use literal_buffer::Literal;
use literal_buffer::Step;
use log::{debug, trace, warn};
pub use numbers::Number;
use numbers::NumberStep;
pub use options::ParserOptions;
pub use position::Position;
pub use source::{ByteSource, Chunk, ReaderSource};

use crate::listener::{Listener, Scalar};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    StartDocument,
    EndDocument,
    Done,
    InArray,
    InObject,
    EndKey,
    AfterKey,
    InString,
    StartEscape,
    Unicode,
    UnicodeSurrogate,
    InNumber,
    InTrue,
    InFalse,
    InNull,
    AfterValue,
}

impl State {
    /// States in which whitespace is part of the token being scanned.
    ///
    /// Literals and the gap between two surrogate escapes are not among
    /// them: whitespace there is skipped, so `[t rue]` reads as `[true]`.
    fn is_token_content(self) -> bool {
        matches!(
            self,
            State::InString | State::StartEscape | State::Unicode | State::InNumber
        )
    }

    fn literal(self) -> Option<Literal> {
        match self {
            State::InTrue => Some(Literal::True),
            State::InFalse => Some(Literal::False),
            State::InNull => Some(Literal::Null),
            _ => None,
        }
    }
}

impl From<Literal> for State {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::True => State::InTrue,
            Literal::False => State::InFalse,
            Literal::Null => State::InNull,
        }
    }
}

/// Structural context, one entry per level of nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Object,
    Array,
    Key,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bom {
    None,
    Utf8,
    Utf16,
    Utf32,
}

impl Bom {
    /// Length of the mark in bytes.
    fn len(self) -> usize {
        match self {
            Bom::None => 0,
            Bom::Utf8 => 3,
            Bom::Utf16 => 2,
            Bom::Utf32 => 4,
        }
    }
}

#[inline]
fn whitespace_str(b: u8) -> Option<&'static str> {
    match b {
        b' ' => Some(" "),
        b'\t' => Some("\t"),
        b'\n' => Some("\n"),
        b'\r' => Some("\r"),
        _ => None,
    }
}

/// Requests that a parser stop.
///
/// Cloning yields another handle to the same parser. A handle can be created
/// up front and installed with [`PushParser::with_stop_handle`], so that a
/// listener built before the parser can still stop it.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// A handle that has not been stopped.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a stop. Every parser sharing this handle halts after the byte
    /// it is consuming.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether [`stop`](Self::stop) has been called on any clone.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The JSON state machine, fed directly with bytes.
///
/// # Examples
///
/// ```rust
/// use jsontap::{Event, EventRecorder, ParserOptions, PushParser, Scalar};
///
/// let mut parser = PushParser::new(EventRecorder::new(), ParserOptions::default());
/// parser.feed(b"[tr").unwrap();
/// parser.feed(b"ue]").unwrap();
/// assert_eq!(
///     parser.into_listener().into_events(),
///     vec![
///         Event::StartDocument,
///         Event::StartArray,
///         Event::Value(Scalar::Boolean(true)),
///         Event::EndArray,
///         Event::EndDocument,
///     ]
/// );
/// ```
#[derive(Debug)]
pub struct PushParser<L> {
    listener: L,
    emit_whitespace: bool,

    state: State,
    stack: Vec<Context>,
    /// Content of the string, number or literal being scanned.
    buffer: Vec<u8>,
    unicode: UnicodeEscapeBuffer,
    bom: Bom,

    position: Position,
    documents: usize,
    stop: StopHandle,
    error: Option<ParseError>,
}

impl<L: Listener> PushParser<L> {
    /// A parser at the start of a stream, reporting to `listener`.
    ///
    /// Only [`ParserOptions::emit_whitespace`] applies here; the other
    /// options concern reading and are used by [`Parser`].
    pub fn new(listener: L, options: ParserOptions) -> Self {
        Self {
            listener,
            emit_whitespace: options.emit_whitespace,
            state: State::StartDocument,
            stack: Vec::with_capacity(16),
            buffer: Vec::new(),
            unicode: UnicodeEscapeBuffer::new(),
            bom: Bom::None,
            position: Position::new(),
            documents: 0,
            stop: StopHandle::default(),
            error: None,
        }
    }

    /// Replaces the parser's stop handle with `stop`.
    #[must_use]
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    /// Consumes `bytes`, emitting events as they become complete.
    ///
    /// Returns `Break` if a stop was requested, either before the call or
    /// while one of the bytes was being consumed; the remaining bytes are
    /// left unread.
    ///
    /// Every byte advances the column, line terminators included. Lines are
    /// only counted through [`new_line`](Self::new_line), which [`Parser`]
    /// calls after each terminated chunk; callers feeding multi-line input
    /// directly should call it themselves to get useful error lines.
    ///
    /// # Errors
    ///
    /// The first grammar violation. Once an error has been returned, every
    /// later call returns it again.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<ControlFlow<()>, ParseError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        for &b in bytes {
            if self.stop.is_stopped() {
                return Ok(self.halt());
            }

            if let Err(kind) = self.consume(b) {
                let err = ParseError::new(self.position.line, self.position.column, kind);
                debug!("{err}");
                self.error = Some(err.clone());
                return Err(err);
            }
            self.position.advance();
        }

        if self.stop.is_stopped() {
            return Ok(self.halt());
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Starts a new line for error reporting: the line advances and the
    /// column returns to 1.
    ///
    /// [`feed`](Self::feed) never does this on its own.
    pub fn new_line(&mut self) {
        self.position.new_line();
    }

    /// A handle that stops this parser.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Whether a stop was requested or has taken effect.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.state == State::Done || self.stop.is_stopped()
    }

    /// Position of the next byte to be consumed.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Number of top-level documents completed so far.
    #[must_use]
    pub fn documents(&self) -> usize {
        self.documents
    }

    /// Whether the parser sits between documents rather than inside one.
    #[must_use]
    pub fn is_between_documents(&self) -> bool {
        matches!(self.state, State::StartDocument | State::EndDocument)
    }

    /// The listener receiving events.
    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// The listener receiving events, mutably.
    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// Consumes the parser and returns its listener.
    pub fn into_listener(self) -> L {
        self.listener
    }

    fn halt(&mut self) -> ControlFlow<()> {
        if self.state != State::Done {
            debug!(
                "stopping at {}:{} after {} documents",
                self.position.line, self.position.column, self.documents
            );
            self.state = State::Done;
        }
        ControlFlow::Break(())
    }

    fn consume(&mut self, b: u8) -> Result<(), SyntaxError> {
        if self.position.in_bom_window() && self.skip_bom(b) {
            return Ok(());
        }
        self.dispatch(b)
    }

    /// Recognizes a byte-order mark from its first byte (and, for UTF-16 vs
    /// UTF-32, its second) and swallows its bytes.
    fn skip_bom(&mut self, b: u8) -> bool {
        let column = self.position.column;
        if column == 1 {
            self.bom = match b {
                0xEF => Bom::Utf8,
                0xFE | 0xFF => Bom::Utf16,
                0x00 => Bom::Utf32,
                _ => Bom::None,
            };
        }
        if self.bom == Bom::Utf16 && column == 2 && b == 0xFE {
            self.bom = Bom::Utf32;
        }
        column <= self.bom.len()
    }

    #[allow(clippy::too_many_lines)]
    fn dispatch(&mut self, b: u8) -> Result<(), SyntaxError> {
        if !self.state.is_token_content() {
            if let Some(ws) = whitespace_str(b) {
                if self.emit_whitespace {
                    self.listener.whitespace(ws);
                }
                return Ok(());
            }
        }

        match self.state {
            State::InString => match b {
                b'"' => self.end_string()?,
                b'\\' => self.state = State::StartEscape,
                c if c < 0x1F => return Err(SyntaxError::ControlCharacter(c)),
                _ => self.buffer.push(b),
            },

            State::InArray => {
                if b == b']' {
                    self.end_array()?;
                } else {
                    self.start_value(b)?;
                }
            }

            State::InObject => match b {
                b'}' => self.end_object()?,
                b'"' => self.start_string(Context::Key),
                _ => return Err(SyntaxError::ExpectedKey(b)),
            },

            State::EndKey => {
                if b != b':' {
                    return Err(SyntaxError::ExpectedColon);
                }
                self.state = State::AfterKey;
            }

            State::AfterKey => self.start_value(b)?,

            State::StartEscape => self.process_escape(b)?,

            State::Unicode => match self.unicode.feed(b)? {
                Escape::Pending => {}
                Escape::HighSurrogate => self.state = State::UnicodeSurrogate,
                Escape::Char(c) => {
                    encode_char(c, &mut self.buffer);
                    self.state = State::InString;
                }
            },

            State::UnicodeSurrogate => {
                if self.unicode.feed_interstitial(b)? {
                    self.state = State::Unicode;
                }
            }

            State::AfterValue => match self.stack.last() {
                Some(Context::Object) => match b {
                    b'}' => self.end_object()?,
                    b',' => self.state = State::InObject,
                    _ => return Err(SyntaxError::ExpectedObjectDelimiter(b)),
                },
                Some(Context::Array) => match b {
                    b']' => self.end_array()?,
                    b',' => self.state = State::InArray,
                    _ => return Err(SyntaxError::ExpectedArrayDelimiter(b)),
                },
                _ => return Err(SyntaxError::ValueOutsideContainer),
            },

            State::InNumber => match numbers::step(&self.buffer, b)? {
                NumberStep::Accept => self.buffer.push(b),
                NumberStep::End => {
                    self.end_number()?;
                    // The terminator belongs to whatever follows the number.
                    self.dispatch(b)?;
                }
            },

            State::InTrue | State::InFalse | State::InNull => {
                self.buffer.push(b);
                let Some(literal) = self.state.literal() else {
                    return Err(SyntaxError::ValueOutsideContainer);
                };
                if let Step::Done(value) = literal.step(&self.buffer)? {
                    self.buffer.clear();
                    self.listener.value(value);
                    self.state = State::AfterValue;
                }
            }

            State::StartDocument => match b {
                b'[' => {
                    self.start_document();
                    self.start_array();
                }
                b'{' => {
                    self.start_document();
                    self.start_object();
                }
                _ => return Err(SyntaxError::DocumentStart),
            },

            State::EndDocument => {
                if b != b'[' && b != b'{' {
                    return Err(SyntaxError::ExpectedEndOfDocument);
                }
                self.state = State::StartDocument;
                self.dispatch(b)?;
            }

            State::Done => return Err(SyntaxError::ExpectedEndOfDocument),
        }

        Ok(())
    }

    fn start_document(&mut self) {
        debug!(
            "document {} starts at {}:{}",
            self.documents + 1,
            self.position.line,
            self.position.column
        );
        self.listener.start_document();
    }

    fn end_document(&mut self) {
        self.listener.end_document();
        self.documents += 1;
        self.state = State::EndDocument;
        debug!(
            "document {} ends at {}:{}",
            self.documents, self.position.line, self.position.column
        );
    }

    fn start_value(&mut self, b: u8) -> Result<(), SyntaxError> {
        match b {
            b'[' => self.start_array(),
            b'{' => self.start_object(),
            b'"' => self.start_string(Context::String),
            _ if numbers::is_number_start(b) => {
                self.state = State::InNumber;
                self.buffer.push(b);
            }
            _ => {
                let literal = Literal::from_first_byte(b).ok_or(SyntaxError::UnexpectedValue(b))?;
                self.state = literal.into();
                self.buffer.push(b);
            }
        }
        Ok(())
    }

    fn start_array(&mut self) {
        self.listener.start_array();
        self.state = State::InArray;
        self.stack.push(Context::Array);
    }

    fn start_object(&mut self) {
        self.listener.start_object();
        self.state = State::InObject;
        self.stack.push(Context::Object);
    }

    fn start_string(&mut self, context: Context) {
        self.stack.push(context);
        self.state = State::InString;
    }

    fn end_array(&mut self) -> Result<(), SyntaxError> {
        if self.stack.pop() != Some(Context::Array) {
            return Err(SyntaxError::UnexpectedEndOfArray);
        }
        self.listener.end_array();
        self.state = State::AfterValue;
        if self.stack.is_empty() {
            self.end_document();
        }
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), SyntaxError> {
        if self.stack.pop() != Some(Context::Object) {
            return Err(SyntaxError::UnexpectedEndOfObject);
        }
        self.listener.end_object();
        self.state = State::AfterValue;
        if self.stack.is_empty() {
            self.end_document();
        }
        Ok(())
    }

    fn end_string(&mut self) -> Result<(), SyntaxError> {
        let context = self.stack.pop();
        let text = std::str::from_utf8(&self.buffer).map_err(SyntaxError::InvalidUtf8)?;
        match context {
            Some(Context::Key) => {
                self.listener.key(text);
                self.state = State::EndKey;
            }
            Some(Context::String) => {
                self.listener.value(Scalar::String(text.to_owned()));
                self.state = State::AfterValue;
            }
            _ => return Err(SyntaxError::UnexpectedEndOfString),
        }
        self.buffer.clear();
        Ok(())
    }

    fn end_number(&mut self) -> Result<(), SyntaxError> {
        let number = numbers::parse(&self.buffer)?;
        self.buffer.clear();
        self.listener.value(number.into());
        self.state = State::AfterValue;
        Ok(())
    }

    fn process_escape(&mut self, b: u8) -> Result<(), SyntaxError> {
        let unescaped = match b {
            b'"' => b'"',
            b'\\' => b'\\',
            b'/' => b'/',
            b'b' => 0x08,
            b'f' => 0x0C,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'u' => {
                self.unicode.reset();
                self.state = State::Unicode;
                return Ok(());
            }
            _ => return Err(SyntaxError::InvalidEscape(b)),
        };
        self.buffer.push(unescaped);
        self.state = State::InString;
        Ok(())
    }
}

/// Drives a [`PushParser`] from a [`ByteSource`].
///
/// # Examples
///
/// ```rust
/// use jsontap::{Parser, ParserOptions, Value, ValueCollector};
///
/// let input = "{\"id\": 1}\n{\"id\": 2}\n";
/// let mut ids = Vec::new();
/// let collector = ValueCollector::new(|v: Value| ids.push(v.get("id").and_then(Value::as_i64)));
/// let mut parser = Parser::from_reader(input.as_bytes(), collector, ParserOptions::default());
/// parser.parse().unwrap();
/// drop(parser);
/// assert_eq!(ids, [Some(1), Some(2)]);
/// ```
#[derive(Debug)]
pub struct Parser<S, L> {
    source: S,
    machine: PushParser<L>,
    chunk: Vec<u8>,
    line_ending: Vec<u8>,
    chunk_size: usize,
}

impl<R: BufRead, L: Listener> Parser<ReaderSource<R>, L> {
    /// Parses from any buffered reader.
    pub fn from_reader(reader: R, listener: L, options: ParserOptions) -> Self {
        Self::new(ReaderSource::new(reader), listener, options)
    }
}

impl<S: ByteSource, L: Listener> Parser<S, L> {
    /// A parser that reads `source` and reports to `listener`.
    pub fn new(source: S, listener: L, options: ParserOptions) -> Self {
        let line_ending = options.line_ending.clone().into_bytes();
        let chunk_size = options.chunk_size.max(1);
        Self {
            source,
            machine: PushParser::new(listener, options),
            chunk: Vec::with_capacity(chunk_size),
            line_ending,
            chunk_size,
        }
    }

    /// Replaces the parser's stop handle with `stop`.
    #[must_use]
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.machine = self.machine.with_stop_handle(stop);
        self
    }

    /// Reads and parses until the stream ends or the parser is stopped.
    ///
    /// Input ending in the middle of a document is not an error; the
    /// partial document simply produces no further events.
    ///
    /// # Errors
    ///
    /// A read failure, or the first grammar violation.
    pub fn parse(&mut self) -> Result<(), StreamError> {
        loop {
            if self.machine.is_stopped() {
                self.stop();
                return Ok(());
            }

            self.chunk.clear();
            let chunk = self
                .source
                .read_chunk(&mut self.chunk, self.chunk_size, &self.line_ending)?;
            trace!(
                "read {} bytes (terminated: {}) at line {}",
                chunk.len,
                chunk.terminated,
                self.machine.position().line
            );
            if chunk.is_eof() {
                debug!(
                    "end of stream after {} documents",
                    self.machine.documents()
                );
                return Ok(());
            }

            if self.machine.feed(&self.chunk)?.is_break() {
                self.stop();
                return Ok(());
            }
            if chunk.terminated {
                self.machine.new_line();
            }
        }
    }

    /// Stops parsing and closes the source if it is still open.
    ///
    /// Returns `Some(true)` if the source closed cleanly, `Some(false)` if
    /// closing failed, and `None` if it was already closed.
    pub fn stop(&mut self) -> Option<bool> {
        self.machine.stop.stop();
        self.machine.halt();

        if !self.source.is_open() {
            return None;
        }
        match self.source.close() {
            Ok(()) => Some(true),
            Err(err) => {
                warn!("failed to close stream: {err}");
                Some(false)
            }
        }
    }

    /// See [`PushParser::stop_handle`].
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.machine.stop_handle()
    }

    /// See [`PushParser::position`].
    #[must_use]
    pub fn position(&self) -> Position {
        self.machine.position()
    }

    /// See [`PushParser::documents`].
    #[must_use]
    pub fn documents(&self) -> usize {
        self.machine.documents()
    }

    /// The source being read.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The listener receiving events.
    pub fn listener(&self) -> &L {
        self.machine.listener()
    }

    /// The listener receiving events, mutably.
    pub fn listener_mut(&mut self) -> &mut L {
        self.machine.listener_mut()
    }

    /// Splits the parser into its source and listener.
    pub fn into_parts(self) -> (S, L) {
        (self.source, self.machine.into_listener())
    }
}
