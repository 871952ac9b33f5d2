use bstr::ByteSlice;

use super::error::SyntaxError;

/// A numeric literal after conversion.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// No fraction or exponent, and within `i64`.
    Integer(i64),
    /// Everything else.
    Float(f64),
}

/// What the number scanner does with the next byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumberStep {
    /// The byte belongs to the number.
    Accept,
    /// The byte terminates the number and must be processed on its own.
    End,
}

/// Bytes that may start a number: a digit or a minus sign.
#[inline]
pub(crate) fn is_number_start(b: u8) -> bool {
    b.is_ascii_digit() || b == b'-'
}

#[inline]
fn has_exponent(literal: &[u8]) -> bool {
    literal.iter().any(|b| matches!(b, b'e' | b'E'))
}

/// Decides whether `b` extends the number accumulated so far in `literal`.
///
/// Leading zeros and a trailing `.` are tolerated; only duplicated or
/// misplaced `.`, `e`/`E` and signs are rejected here.
pub(crate) fn step(literal: &[u8], b: u8) -> Result<NumberStep, SyntaxError> {
    match b {
        b'0'..=b'9' => Ok(NumberStep::Accept),
        b'.' => {
            if literal.contains(&b'.') {
                Err(SyntaxError::MultipleDecimalPoints)
            } else if has_exponent(literal) {
                Err(SyntaxError::DecimalPointInExponent)
            } else {
                Ok(NumberStep::Accept)
            }
        }
        b'e' | b'E' => {
            if has_exponent(literal) {
                Err(SyntaxError::MultipleExponents)
            } else {
                Ok(NumberStep::Accept)
            }
        }
        b'+' | b'-' => match literal.last() {
            Some(b'e' | b'E') => Ok(NumberStep::Accept),
            _ => Err(SyntaxError::MisplacedSign),
        },
        _ => Ok(NumberStep::End),
    }
}

/// Converts a scanned literal into an integer when it has no fraction or
/// exponent and fits in `i64`, and into a float otherwise.
pub(crate) fn parse(literal: &[u8]) -> Result<Number, SyntaxError> {
    let invalid = || SyntaxError::InvalidNumber(literal.to_str_lossy().into_owned());
    let text = literal.to_str().map_err(|_| invalid())?;

    if !text.contains('.') && !has_exponent(literal) {
        if let Ok(i) = text.parse::<i64>() {
            return Ok(Number::Integer(i));
        }
    }

    text.parse::<f64>()
        .map(Number::Float)
        .map_err(|_| invalid())
}
