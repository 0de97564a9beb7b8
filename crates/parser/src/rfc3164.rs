//! RFC 3164 datagram parser
//!
//! `[<PRI>][Mmm dd hh:mm:ss HOSTNAME ]TAGCONTENT`
//!
//! Every part is optional. Anything that does not match degrades to defaults
//! instead of failing: the priority falls back to [`DEFAULT_PRIORITY`], an
//! unrecognised header is left in the body, and the tag may be empty.

use chrono::{DateTime, Datelike, Local};
use contracts::{Header, Priority, Record, Source, DEFAULT_PRIORITY};
use unicode_general_category::{get_general_category, GeneralCategory};

use crate::priority::parse_priority;
use crate::timestamp::{parse_timestamp, TIMESTAMP_LEN};

/// Parse one datagram into a [`Record`]. Never fails.
pub fn parse(raw: &[u8], source: Source, received_at: DateTime<Local>) -> Record {
    let (priority, rest) = split_priority(raw);

    // The header is only looked for behind an explicit priority
    let (header, rest) = match priority {
        Some(_) => split_header(rest, received_at.year()),
        None => (None, rest),
    };

    let (tag, content) = split_message(rest);
    let priority = priority.unwrap_or(DEFAULT_PRIORITY);

    Record {
        received_at,
        source,
        facility: priority.facility(),
        severity: priority.severity(),
        header,
        tag,
        content,
    }
}

/// True if `raw` starts with a valid `<PRI>` prefix
pub fn has_priority(raw: &[u8]) -> bool {
    parse_priority(raw).is_some()
}

fn split_priority(buf: &[u8]) -> (Option<Priority>, &[u8]) {
    match parse_priority(buf) {
        Some((priority, len)) => (Some(priority), &buf[len..]),
        None => (None, buf),
    }
}

/// Timestamp, space, hostname, space. All or nothing.
fn split_header(buf: &[u8], year: i32) -> (Option<Header>, &[u8]) {
    if buf.len() <= TIMESTAMP_LEN || buf[TIMESTAMP_LEN] != b' ' {
        return (None, buf);
    }
    let Some(timestamp) = parse_timestamp(buf, year) else {
        return (None, buf);
    };

    let after = &buf[TIMESTAMP_LEN + 1..];
    let Some(end) = after.iter().position(|&b| b == b' ') else {
        return (None, buf);
    };

    let header = Header {
        timestamp,
        hostname: String::from_utf8_lossy(&after[..end]).into_owned(),
    };
    (Some(header), &after[end + 1..])
}

fn is_nul_cr_lf(b: u8) -> bool {
    matches!(b, 0 | b'\r' | b'\n')
}

/// Letter (L*) or number (N*) general category
fn is_tag_char(c: char) -> bool {
    use GeneralCategory::*;
    matches!(
        get_general_category(c),
        UppercaseLetter
            | LowercaseLetter
            | TitlecaseLetter
            | ModifierLetter
            | OtherLetter
            | DecimalNumber
            | LetterNumber
            | OtherNumber
    )
}

/// Tag is the leading run of letters and numbers; content is the rest.
fn split_message(buf: &[u8]) -> (String, String) {
    let end = buf
        .iter()
        .rposition(|&b| !is_nul_cr_lf(b))
        .map_or(0, |last| last + 1);
    let text = String::from_utf8_lossy(&buf[..end]);

    match text.char_indices().find(|&(_, c)| !is_tag_char(c)) {
        Some((idx, _)) => (text[..idx].to_owned(), text[idx..].to_owned()),
        None => (String::new(), text.into_owned()),
    }
}
