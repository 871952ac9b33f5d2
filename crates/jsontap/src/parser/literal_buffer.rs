use bstr::ByteSlice;

use super::error::SyntaxError;
use crate::listener::Scalar;

/// The three bare-word literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
}

/// What happened after feeding one more byte into the literal matcher?
#[derive(Debug, PartialEq)]
pub(crate) enum Step {
    /// The literal has not reached its full length yet.
    NeedMore,
    /// The literal is complete and matched.
    Done(Scalar),
}

impl Literal {
    /// The literal that a value starting with `first` must be, if any.
    pub fn from_first_byte(first: u8) -> Option<Self> {
        match first {
            b't' => Some(Self::True),
            b'f' => Some(Self::False),
            b'n' => Some(Self::Null),
            _ => None,
        }
    }

    /// The literal as it appears in JSON.
    pub fn text(self) -> &'static str {
        match self {
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
        }
    }

    fn scalar(self) -> Scalar {
        match self {
            Self::True => Scalar::Boolean(true),
            Self::False => Scalar::Boolean(false),
            Self::Null => Scalar::Null,
        }
    }

    /// Checks the bytes accumulated so far, `buffer` already including the
    /// newest byte.
    ///
    /// Nothing is compared until the buffer reaches the literal's length, so
    /// a mismatch is reported on the literal's last byte.
    pub(crate) fn step(self, buffer: &[u8]) -> Result<Step, SyntaxError> {
        let expected = self.text();
        if buffer.len() < expected.len() {
            return Ok(Step::NeedMore);
        }
        if buffer == expected.as_bytes() {
            Ok(Step::Done(self.scalar()))
        } else {
            Err(SyntaxError::LiteralMismatch {
                expected,
                got: buffer.to_str_lossy().into_owned(),
            })
        }
    }
}
