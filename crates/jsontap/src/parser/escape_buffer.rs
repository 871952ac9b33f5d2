//! Workspace for `\uXXXX` escapes, including UTF-16 surrogate pairs.
//!
//! [`UnicodeEscapeBuffer`] collects exactly four ASCII hex digits per escape.
//! A high surrogate (`D800`–`DBFF`) is held back until the following
//! `\uXXXX` supplies the matching low surrogate (`DC00`–`DFFF`); the pair is
//! then combined into a single scalar value. The two bytes between the
//! escapes (`\` and `u`) are collected separately and must match exactly.
//!
//! A second high surrogate in place of the low one is an error; it does not
//! replace the pending one.

use super::error::SyntaxError;

const HIGH_SURROGATES: core::ops::Range<u32> = 0xD800..0xDC00;
const LOW_SURROGATES: core::ops::RangeInclusive<u32> = 0xDC00..=0xDFFF;

/// Result of feeding one hex digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Escape {
    /// Fewer than four digits so far.
    Pending,
    /// A high surrogate was stashed; a `\u` and a low surrogate must follow.
    HighSurrogate,
    /// A complete character, possibly assembled from a surrogate pair.
    Char(char),
}

#[derive(Debug, Default)]
pub(crate) struct UnicodeEscapeBuffer {
    digits: [u8; 4],
    len: u8,
    high_surrogate: Option<u32>,
    interstitial: [u8; 2],
    interstitial_len: u8,
}

/// `0-9`, `a-f`, `A-F`.
#[inline]
pub(crate) fn is_hex_digit(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

#[inline]
fn hex_val(b: u8) -> u32 {
    match b {
        b'0'..=b'9' => u32::from(b - b'0'),
        b'a'..=b'f' => u32::from(b - b'a' + 10),
        b'A'..=b'F' => u32::from(b - b'A' + 10),
        _ => 0,
    }
}

/// Combines a UTF-16 surrogate pair into the code point it encodes.
#[inline]
pub(crate) fn combine_surrogates(high: u32, low: u32) -> u32 {
    (high - 0xD800) * 0x400 + (low - 0xDC00) + 0x10000
}

/// Appends the UTF-8 encoding of `c` to `out`.
#[inline]
pub(crate) fn encode_char(c: char, out: &mut Vec<u8>) {
    let mut utf8 = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
}

impl UnicodeEscapeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every in-flight digit and any pending high surrogate.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Feeds one hex digit of the current escape.
    pub fn feed(&mut self, b: u8) -> Result<Escape, SyntaxError> {
        if !is_hex_digit(b) {
            return Err(SyntaxError::InvalidHexDigit {
                parsed: String::from_utf8_lossy(&self.digits[..usize::from(self.len)])
                    .into_owned(),
                got: b,
            });
        }

        self.digits[usize::from(self.len)] = b;
        self.len += 1;
        if self.len < 4 {
            return Ok(Escape::Pending);
        }

        let code = self
            .digits
            .iter()
            .fold(0u32, |acc, &d| (acc << 4) | hex_val(d));
        self.len = 0;

        if HIGH_SURROGATES.contains(&code) {
            if self.high_surrogate.is_some() {
                return Err(SyntaxError::InvalidLowSurrogate);
            }
            self.high_surrogate = Some(code);
            return Ok(Escape::HighSurrogate);
        }

        let code = if LOW_SURROGATES.contains(&code) {
            let high = self
                .high_surrogate
                .take()
                .ok_or(SyntaxError::MissingHighSurrogate)?;
            combine_surrogates(high, code)
        } else if self.high_surrogate.is_some() {
            return Err(SyntaxError::InvalidLowSurrogate);
        } else {
            code
        };

        // Neither a lone surrogate nor a combined pair can fall outside the
        // scalar value range.
        char::from_u32(code)
            .map(Escape::Char)
            .ok_or(SyntaxError::InvalidLowSurrogate)
    }

    /// Feeds one byte of the `\u` that separates a high surrogate from its
    /// low surrogate. Returns `true` once both bytes have arrived.
    pub fn feed_interstitial(&mut self, b: u8) -> Result<bool, SyntaxError> {
        self.interstitial[usize::from(self.interstitial_len)] = b;
        self.interstitial_len += 1;
        if self.interstitial_len < 2 {
            return Ok(false);
        }

        self.interstitial_len = 0;
        if &self.interstitial == b"\\u" {
            Ok(true)
        } else {
            Err(SyntaxError::ExpectedSurrogateEscape(
                String::from_utf8_lossy(&self.interstitial).into_owned(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(buf: &mut UnicodeEscapeBuffer, digits: &[u8]) -> Result<Escape, SyntaxError> {
        let mut last = Escape::Pending;
        for &d in digits {
            last = buf.feed(d)?;
        }
        Ok(last)
    }

    #[test]
    fn basic_decoding() {
        let mut buf = UnicodeEscapeBuffer::new();
        assert_eq!(buf.feed(b'0').unwrap(), Escape::Pending);
        assert_eq!(buf.feed(b'0').unwrap(), Escape::Pending);
        assert_eq!(buf.feed(b'4').unwrap(), Escape::Pending);
        assert_eq!(buf.feed(b'1').unwrap(), Escape::Char('A'));
    }

    #[test]
    fn mixed_case_hex() {
        let mut buf = UnicodeEscapeBuffer::new();
        assert_eq!(
            feed_all(&mut buf, b"AbCd").unwrap(),
            Escape::Char(char::from_u32(0xABCD).unwrap())
        );
    }

    #[test]
    fn surrogate_pair_combines() {
        let mut buf = UnicodeEscapeBuffer::new();
        assert_eq!(feed_all(&mut buf, b"D83D").unwrap(), Escape::HighSurrogate);
        assert!(!buf.feed_interstitial(b'\\').unwrap());
        assert!(buf.feed_interstitial(b'u').unwrap());
        assert_eq!(feed_all(&mut buf, b"DE00").unwrap(), Escape::Char('😀'));
    }

    #[test]
    fn lone_low_surrogate_errors() {
        let mut buf = UnicodeEscapeBuffer::new();
        assert_eq!(
            feed_all(&mut buf, b"DE00").unwrap_err(),
            SyntaxError::MissingHighSurrogate
        );
    }

    #[test]
    fn high_surrogate_followed_by_bmp_errors() {
        let mut buf = UnicodeEscapeBuffer::new();
        feed_all(&mut buf, b"D83D").unwrap();
        assert_eq!(
            feed_all(&mut buf, b"0041").unwrap_err(),
            SyntaxError::InvalidLowSurrogate
        );
    }

    #[test]
    fn interstitial_must_be_backslash_u() {
        let mut buf = UnicodeEscapeBuffer::new();
        feed_all(&mut buf, b"D83D").unwrap();
        buf.feed_interstitial(b'x').unwrap();
        assert_eq!(
            buf.feed_interstitial(b'y').unwrap_err(),
            SyntaxError::ExpectedSurrogateEscape("xy".into())
        );
    }

    #[test]
    fn invalid_hex_reports_digits_so_far() {
        let mut buf = UnicodeEscapeBuffer::new();
        buf.feed(b'1').unwrap();
        buf.feed(b'2').unwrap();
        assert_eq!(
            buf.feed(b'G').unwrap_err(),
            SyntaxError::InvalidHexDigit {
                parsed: "12".into(),
                got: b'G'
            }
        );
    }

    #[test]
    fn reset_clears_buffer() {
        let mut buf = UnicodeEscapeBuffer::new();
        feed_all(&mut buf, b"D83D").unwrap();
        buf.reset();
        assert_eq!(feed_all(&mut buf, b"0041").unwrap(), Escape::Char('A'));
    }

    #[test]
    fn combine_surrogates_formula() {
        assert_eq!(combine_surrogates(0xD83D, 0xDE00), 0x1F600);
        assert_eq!(combine_surrogates(0xD800, 0xDC00), 0x10000);
        assert_eq!(combine_surrogates(0xDBFF, 0xDFFF), 0x10FFFF);
    }
}
