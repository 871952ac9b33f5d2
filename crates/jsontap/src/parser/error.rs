use std::io;

use thiserror::Error;

/// A grammar violation, reported at the 1-based line and column of the
/// offending byte.
///
/// Parsing is not resumable after an error: the stream that produced it must
/// be abandoned.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Parsing error in [{line}:{column}]. {kind}")]
pub struct ParseError {
    /// 1-based line.
    pub line: usize,
    /// 1-based column, counted in bytes.
    pub column: usize,
    /// What went wrong.
    pub kind: SyntaxError,
}

impl ParseError {
    pub(crate) fn new(line: usize, column: usize, kind: SyntaxError) -> Self {
        Self { line, column, kind }
    }

    /// Shorthand for `self.kind.category()`.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}

/// Broad classification of a [`SyntaxError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A token that is not legal in the current structural position.
    Structural,
    /// Malformed token content: strings, escapes, numbers, literals.
    Lexical,
    /// The parser lost track of its own invariants. Indicates a bug.
    Internal,
    /// Something other than a new document after a completed one.
    DocumentBoundary,
}

/// The specific grammar violation behind a [`ParseError`].
///
/// Byte payloads hold the offending input byte.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SyntaxError {
    /// The first significant byte was not `[` or `{`.
    #[error("Document must start with object or array.")]
    DocumentStart,
    /// Something other than `"` or `}` where a key was due.
    #[error("Start of string expected for object key. Instead got: {}", .0.escape_ascii())]
    ExpectedKey(u8),
    /// A key not followed by `:`.
    #[error("Expected ':' after key.")]
    ExpectedColon,
    /// Something other than `,` or `}` after an object member.
    #[error("Expected ',' or '}}' while parsing object. Got: {}", .0.escape_ascii())]
    ExpectedObjectDelimiter(u8),
    /// Something other than `,` or `]` after an array element.
    #[error("Expected ',' or ']' while parsing array. Got: {}", .0.escape_ascii())]
    ExpectedArrayDelimiter(u8),
    /// A byte that cannot start any value.
    #[error("Unexpected character for value: {}", .0.escape_ascii())]
    UnexpectedValue(u8),
    /// A closing quote with no string open.
    #[error("Unexpected end of string.")]
    UnexpectedEndOfString,
    /// `]` closing something other than an array.
    #[error("Unexpected end of array encountered.")]
    UnexpectedEndOfArray,
    /// `}` closing something other than an object.
    #[error("Unexpected end of object encountered.")]
    UnexpectedEndOfObject,

    /// A raw control byte inside a string.
    #[error("Unescaped control character encountered: {}", .0.escape_ascii())]
    ControlCharacter(u8),
    /// An unknown character after `\`.
    #[error("Expected escaped character after backslash. Got: {}", .0.escape_ascii())]
    InvalidEscape(u8),
    /// A non-hex byte inside `\uXXXX`.
    #[error(
        "Expected hex character for escaped Unicode character. Unicode parsed: {parsed} and got: {}",
        .got.escape_ascii()
    )]
    InvalidHexDigit {
        /// Digits read before the bad one.
        parsed: String,
        /// The bad byte.
        got: u8,
    },
    /// A low surrogate with no high surrogate before it.
    #[error("Missing high surrogate for Unicode low surrogate.")]
    MissingHighSurrogate,
    /// A high surrogate followed by anything but a low surrogate.
    #[error("Invalid low surrogate following Unicode high surrogate.")]
    InvalidLowSurrogate,
    /// A high surrogate not followed by `\u`. Holds the two bytes found.
    #[error("Expected '\\u' following a Unicode high surrogate. Got: {0}")]
    ExpectedSurrogateEscape(String),
    /// A second `.` in a number.
    #[error("Cannot have multiple decimal points in a number.")]
    MultipleDecimalPoints,
    /// A `.` after `e` or `E`.
    #[error("Cannot have a decimal point in an exponent.")]
    DecimalPointInExponent,
    /// A second `e` or `E` in a number.
    #[error("Cannot have multiple exponents in a number.")]
    MultipleExponents,
    /// `+` or `-` anywhere but right after the exponent marker.
    #[error("Can only have '+' or '-' after the 'e' or 'E' in a number.")]
    MisplacedSign,
    /// A number that does not convert, such as `-` or `1e`.
    #[error("Invalid number literal: {0}")]
    InvalidNumber(String),
    /// A `t`, `f` or `n` that did not spell out its literal.
    #[error("Expected '{expected}'. Got: {got}")]
    LiteralMismatch {
        /// The literal being matched.
        expected: &'static str,
        /// What arrived instead.
        got: String,
    },
    /// A string whose bytes are not UTF-8.
    #[error("String is not valid UTF-8: {0}")]
    InvalidUtf8(core::str::Utf8Error),

    /// A value completed with no container to hold it.
    #[error("Finished a value, but unclear what state to move to.")]
    ValueOutsideContainer,

    /// Something other than a new document after a completed one.
    #[error("Expected end of document.")]
    ExpectedEndOfDocument,
}

impl SyntaxError {
    /// The broad class this error belongs to.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        use SyntaxError::*;
        match self {
            DocumentStart
            | ExpectedKey(_)
            | ExpectedColon
            | ExpectedObjectDelimiter(_)
            | ExpectedArrayDelimiter(_)
            | UnexpectedValue(_)
            | UnexpectedEndOfString
            | UnexpectedEndOfArray
            | UnexpectedEndOfObject => ErrorCategory::Structural,
            ControlCharacter(_)
            | InvalidEscape(_)
            | InvalidHexDigit { .. }
            | MissingHighSurrogate
            | InvalidLowSurrogate
            | ExpectedSurrogateEscape(_)
            | MultipleDecimalPoints
            | DecimalPointInExponent
            | MultipleExponents
            | MisplacedSign
            | InvalidNumber(_)
            | LiteralMismatch { .. }
            | InvalidUtf8(_) => ErrorCategory::Lexical,
            ValueOutsideContainer => ErrorCategory::Internal,
            ExpectedEndOfDocument => ErrorCategory::DocumentBoundary,
        }
    }
}

/// Failure of a parser driven from a [`ByteSource`](crate::ByteSource).
#[derive(Debug, Error)]
pub enum StreamError {
    /// The input was malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The source failed to deliver bytes.
    #[error("failed to read from stream: {0}")]
    Io(#[from] io::Error),
}

impl StreamError {
    /// The parse error, if this failure came from malformed input.
    #[must_use]
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position() {
        let err = ParseError::new(3, 14, SyntaxError::ExpectedColon);
        assert_eq!(err.to_string(), "Parsing error in [3:14]. Expected ':' after key.");
    }

    #[test]
    fn non_printable_bytes_are_escaped() {
        let err = SyntaxError::ControlCharacter(b'\t');
        assert_eq!(err.to_string(), "Unescaped control character encountered: \\t");
        let err = SyntaxError::UnexpectedValue(0x80);
        assert_eq!(err.to_string(), "Unexpected character for value: \\x80");
    }

    #[test]
    fn categories() {
        assert_eq!(SyntaxError::ExpectedColon.category(), ErrorCategory::Structural);
        assert_eq!(SyntaxError::MissingHighSurrogate.category(), ErrorCategory::Lexical);
        assert_eq!(SyntaxError::ValueOutsideContainer.category(), ErrorCategory::Internal);
        assert_eq!(
            SyntaxError::ExpectedEndOfDocument.category(),
            ErrorCategory::DocumentBoundary
        );
    }
}
