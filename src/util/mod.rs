//! Utility module
//!
//! Fixed-width ASCII decimal helpers shared by the encoder and decoder.

/// Writes `value` zero-padded into `out`, using all of `out` as the field.
///
/// Callers guarantee `value < 10^out.len()`; higher digits are dropped.
pub fn write_padded(out: &mut [u8], mut value: u64) {
    for slot in out.iter_mut().rev() {
        *slot = b'0' + (value % 10) as u8;
        value /= 10;
    }
}

/// Parses an all-digit ASCII field.
///
/// On failure returns the index and value of the first non-digit byte.
pub fn parse_digits(field: &[u8]) -> std::result::Result<u64, (usize, u8)> {
    field.iter().enumerate().try_fold(0u64, |acc, (i, &b)| {
        if b.is_ascii_digit() {
            Ok(acc * 10 + u64::from(b - b'0'))
        } else {
            Err((i, b))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_padded() {
        let mut buf = [0u8; 5];
        write_padded(&mut buf, 123);
        assert_eq!(&buf, b"00123");

        let mut buf = [0u8; 3];
        write_padded(&mut buf, 0);
        assert_eq!(&buf, b"000");
    }

    #[test]
    fn test_parse_digits() {
        assert_eq!(parse_digits(b"0000001234"), Ok(1234));
        assert_eq!(parse_digits(b"9999999999"), Ok(9_999_999_999));
        assert_eq!(parse_digits(b"12a4"), Err((2, b'a')));
    }
}
