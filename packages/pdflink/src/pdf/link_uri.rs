//! Navigation URI codec
//!
//! Internal link targets travel as `#page=N[&detail]` fragments:
//!
//! ```text
//! #page=3                       XYZ with no position or zoom
//! #page=3&zoom=150,72,540       XYZ: zoom percent, x, y
//! #page=3&view=FitH,540         FitH/FitBH: y; FitV/FitBV: x; Fit/FitB: nothing
//! #page=3&viewrect=72,90,200,100   FitR: x, y, width, height
//! ```
//!
//! Pages are one-based in the text form and zero-based in [`LinkDest`].
//! Decoding is lenient: keywords are located anywhere in the fragment, so a
//! keyword embedded in some other parameter's value is picked up as well.

use crate::fitz::link::{LinkDest, LinkDestType};
use std::fmt::Write;
use tracing::warn;

/// Format a destination as a navigation URI.
///
/// Numbers use the shortest text that reads back as the same `f32`.
pub fn format_link_uri(dest: &LinkDest) -> String {
    let page = i64::from(dest.location.page) + 1;
    let mut uri = format!("#page={page}");
    // Writing into a String cannot fail.
    let _ = match dest.dest_type {
        LinkDestType::Fit => write!(uri, "&view=Fit"),
        LinkDestType::FitB => write!(uri, "&view=FitB"),
        LinkDestType::FitH => write!(uri, "&view=FitH,{}", dest.y),
        LinkDestType::FitBH => write!(uri, "&view=FitBH,{}", dest.y),
        LinkDestType::FitV => write!(uri, "&view=FitV,{}", dest.x),
        LinkDestType::FitBV => write!(uri, "&view=FitBV,{}", dest.x),
        LinkDestType::XYZ => {
            if dest.zoom == 0.0 && dest.x == 0.0 && dest.y == 0.0 {
                Ok(())
            } else {
                write!(uri, "&zoom={},{},{}", dest.zoom, dest.x, dest.y)
            }
        }
        LinkDestType::FitR => write!(
            uri,
            "&viewrect={},{},{},{}",
            dest.x, dest.y, dest.w, dest.h
        ),
    };
    uri
}

/// View tags in match order; longer tags come before their prefixes.
const VIEW_TAGS: [(&str, LinkDestType); 6] = [
    ("FitBH", LinkDestType::FitBH),
    ("FitBV", LinkDestType::FitBV),
    ("FitH", LinkDestType::FitH),
    ("FitV", LinkDestType::FitV),
    ("FitB", LinkDestType::FitB),
    ("Fit", LinkDestType::Fit),
];

/// Parse a navigation URI back into a destination.
///
/// Anything that is not a `#` fragment yields the default destination (XYZ,
/// page 0, all fields zero) and a warning. Unrecognized parameters are
/// ignored. Of `viewrect=`, `zoom=` and `view=` only the first present, in
/// that order, is applied.
pub fn parse_link_uri(uri: &str) -> LinkDest {
    let mut dest = LinkDest::default();

    if !uri.starts_with('#') {
        warn!(uri, "unknown link uri");
        return dest;
    }

    if let Some(rest) = after(uri, "page=") {
        dest.location.page = parse_int(rest).saturating_sub(1).max(0);
    }

    if let Some(mut s) = after(uri, "viewrect=") {
        dest.dest_type = LinkDestType::FitR;
        dest.x = next_float(&mut s);
        dest.y = next_float(&mut s);
        dest.w = next_float(&mut s);
        dest.h = next_float(&mut s);
    } else if let Some(mut s) = after(uri, "zoom=") {
        dest.dest_type = LinkDestType::XYZ;
        dest.zoom = next_float(&mut s);
        dest.x = next_float(&mut s);
        dest.y = next_float(&mut s);
    } else if let Some(view) = after(uri, "view=") {
        let matched = VIEW_TAGS.iter().find(|(tag, _)| {
            view.get(..tag.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(tag))
        });
        if let Some(&(tag, dest_type)) = matched {
            let mut s = &view[tag.len()..];
            dest.dest_type = dest_type;
            match dest_type {
                LinkDestType::FitH | LinkDestType::FitBH => dest.y = next_float(&mut s),
                LinkDestType::FitV | LinkDestType::FitBV => dest.x = next_float(&mut s),
                _ => {}
            }
        }
    }

    dest
}

/// Text following the first occurrence of `key`.
fn after<'a>(s: &'a str, key: &str) -> Option<&'a str> {
    s.find(key).map(|pos| &s[pos + key.len()..])
}

/// Leading decimal integer, as C `atoi` reads it; 0 when there is none.
fn parse_int(s: &str) -> i32 {
    let bytes = s.trim_start().as_bytes();
    let (negative, digits) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    };
    let mut value: i64 = 0;
    for &b in digits.iter().take_while(|b| b.is_ascii_digit()) {
        value = (value * 10 + i64::from(b - b'0')).min(i64::from(i32::MAX) + 1);
    }
    if negative {
        value = -value;
    }
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Skip one optional comma, then read one float and advance past it.
///
/// Returns 0 and leaves the cursor alone when no number follows.
fn next_float(s: &mut &str) -> f32 {
    let start = s.strip_prefix(',').unwrap_or(s);
    match float_prefix(start) {
        Some(len) => {
            let token = start[..len].trim_start();
            let value = token.parse::<f32>().unwrap_or(0.0);
            *s = &start[len..];
            value
        }
        None => 0.0,
    }
}

/// Byte length of the float token at the start of `s`, including leading
/// whitespace.
///
/// Accepts what `strtof` accepts in decimal form: optional sign, digits with
/// an optional fraction, an exponent only when digits follow it, and
/// `inf`/`infinity`/`nan` in any case.
fn float_prefix(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = bytes.iter().take_while(|b| b.is_ascii_whitespace()).count();
    if matches!(bytes.get(i), Some(b'+' | b'-')) {
        i += 1;
    }

    let tail = &s[i..];
    for word in ["infinity", "inf", "nan"] {
        if tail
            .get(..word.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(word))
        {
            return Some(i + word.len());
        }
    }

    let int_digits = count_digits(&bytes[i..]);
    i += int_digits;
    let mut frac_digits = 0;
    if bytes.get(i) == Some(&b'.') {
        frac_digits = count_digits(&bytes[i + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            i += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_digits = count_digits(&bytes[j..]);
        if exp_digits > 0 {
            i = j + exp_digits;
        }
    }
    Some(i)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
