//! RFC 3164 timestamp: `Mmm dd hh:mm:ss`
//!
//! Fixed width, month abbreviation, day padded with a space, 24-hour clock.
//! The year is not on the wire; the caller supplies it.

use chrono::{NaiveDate, NaiveDateTime};

/// Width of the timestamp field in bytes
pub(crate) const TIMESTAMP_LEN: usize = 15;

const MONTHS: [&[u8; 3]; 12] = [
    b"Jan", b"Feb", b"Mar", b"Apr", b"May", b"Jun", b"Jul", b"Aug", b"Sep", b"Oct", b"Nov",
    b"Dec",
];

// get a byte as a decimal digit
fn digit(b: u8) -> Option<u32> {
    b.is_ascii_digit().then(|| u32::from(b - b'0'))
}

fn two_digits(hi: u8, lo: u8) -> Option<u32> {
    Some(digit(hi)? * 10 + digit(lo)?)
}

fn expect(b: u8, want: u8) -> Option<()> {
    (b == want).then_some(())
}

/// Parse the first [`TIMESTAMP_LEN`] bytes of `buf` as a timestamp in `year`.
///
/// Returns `None` for anything that is not a real calendar time, including
/// Feb 29 in a non-leap year.
pub(crate) fn parse_timestamp(buf: &[u8], year: i32) -> Option<NaiveDateTime> {
    let buf = buf.get(..TIMESTAMP_LEN)?;

    let month = MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(&buf[..3]))?;
    expect(buf[3], b' ')?;

    let day_tens = match buf[4] {
        b' ' => 0,
        c => digit(c)?,
    };
    let day = day_tens * 10 + digit(buf[5])?;
    expect(buf[6], b' ')?;

    let hour = two_digits(buf[7], buf[8])?;
    expect(buf[9], b':')?;
    let minute = two_digits(buf[10], buf[11])?;
    expect(buf[12], b':')?;
    let second = two_digits(buf[13], buf[14])?;

    NaiveDate::from_ymd_opt(year, month as u32 + 1, day)?.and_hms_opt(hour, minute, second)
}
