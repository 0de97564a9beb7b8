//! `<PRI>` prefix

use contracts::Priority;

/// Longest digit run accepted between `<` and `>`
const MAX_PRIORITY_DIGITS: usize = 3;

/// Parse a leading `<PRI>` prefix.
///
/// Returns the priority and the number of bytes it occupies. `None` means
/// the prefix is absent or malformed and nothing should be consumed.
pub(crate) fn parse_priority(buf: &[u8]) -> Option<(Priority, usize)> {
    if buf.first() != Some(&b'<') {
        return None;
    }

    let close = buf
        .iter()
        .take(MAX_PRIORITY_DIGITS + 2)
        .skip(1)
        .position(|&b| b == b'>')?
        + 1;

    let digits = &buf[1..close];
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }

    let value = digits
        .iter()
        .fold(0u32, |acc, d| acc * 10 + u32::from(d - b'0'));

    Priority::new(value).map(|pri| (pri, close + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Facility, Severity};

    #[test]
    fn test_valid_prefixes() {
        let (pri, len) = parse_priority(b"<0>x").unwrap();
        assert_eq!((pri.value(), len), (0, 3));

        let (pri, len) = parse_priority(b"<34>Oct").unwrap();
        assert_eq!((pri.value(), len), (34, 4));

        let (pri, len) = parse_priority(b"<191>").unwrap();
        assert_eq!((pri.value(), len), (191, 5));

        let (pri, len) = parse_priority(b"<999>").unwrap();
        assert_eq!((pri.value(), len), (999, 5));

        let (pri, _) = parse_priority(b"<007>").unwrap();
        assert_eq!(pri.value(), 7);
    }

    #[test]
    fn test_malformed_prefixes() {
        assert!(parse_priority(b"").is_none());
        assert!(parse_priority(b"34>").is_none());
        assert!(parse_priority(b"<>").is_none());
        assert!(parse_priority(b"<1a>").is_none());
        assert!(parse_priority(b"<-1>").is_none());
        assert!(parse_priority(b"<+5>").is_none());
        assert!(parse_priority(b"<1234>").is_none());
        assert!(parse_priority(b"<13").is_none());
    }

    #[test]
    fn test_unnamed_facility_is_consumed() {
        let (pri, len) = parse_priority(b"<200>Oct").unwrap();
        assert_eq!((pri.value(), len), (200, 5));
        assert_eq!(pri.facility(), Facility::Unknown(25));
        assert_eq!(pri.severity(), Severity::Emerg);
    }
}
