//! Validator for `format` keyword.
//!
//! Unknown format names are annotations and always pass.
use std::net::{Ipv4Addr, Ipv6Addr};

use email_address::EmailAddress;
use serde_json::{Map, Value};
use url::Url;

use crate::{
    compiler::{BuildSession, Expr},
    context::{ErrorContext, EvaluationContext},
    error::{ValidationError, ValidationErrorKind},
    paths::{LazyLocation, Location},
    regex::Pattern,
    stack::Stack,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    Date,
    DateTime,
    Time,
    Email,
    Ipv4,
    Ipv6,
    Uri,
    Uuid,
    Regex,
    Hostname,
    JsonPointer,
}

impl Format {
    pub(crate) fn from_name(name: &str) -> Option<Format> {
        Some(match name {
            "date" => Format::Date,
            "date-time" => Format::DateTime,
            "time" => Format::Time,
            "email" => Format::Email,
            "ipv4" => Format::Ipv4,
            "ipv6" => Format::Ipv6,
            "uri" => Format::Uri,
            "uuid" => Format::Uuid,
            "regex" => Format::Regex,
            "hostname" => Format::Hostname,
            "json-pointer" => Format::JsonPointer,
            _ => return None,
        })
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Format::Date => "date",
            Format::DateTime => "date-time",
            Format::Time => "time",
            Format::Email => "email",
            Format::Ipv4 => "ipv4",
            Format::Ipv6 => "ipv6",
            Format::Uri => "uri",
            Format::Uuid => "uuid",
            Format::Regex => "regex",
            Format::Hostname => "hostname",
            Format::JsonPointer => "json-pointer",
        }
    }

    pub(crate) fn is_valid(self, item: &str) -> bool {
        match self {
            Format::Date => is_valid_date(item),
            Format::DateTime => is_valid_datetime(item),
            Format::Time => is_valid_time(item),
            Format::Email => EmailAddress::is_valid(item),
            Format::Ipv4 => item.parse::<Ipv4Addr>().is_ok(),
            Format::Ipv6 => item.parse::<Ipv6Addr>().is_ok(),
            Format::Uri => Url::parse(item).is_ok(),
            Format::Uuid => is_valid_uuid(item),
            Format::Regex => Pattern::new(item).is_ok(),
            Format::Hostname => is_valid_hostname(item),
            Format::JsonPointer => is_valid_json_pointer(item),
        }
    }
}

fn digits(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some(
        bytes
            .iter()
            .fold(0, |acc, byte| acc * 10 + u32::from(byte - b'0')),
    )
}

fn is_leap_year(year: u32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// `YYYY-MM-DD` with a day that exists in that month.
fn is_valid_date(item: &str) -> bool {
    let bytes = item.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    let (Some(year), Some(month), Some(day)) = (
        digits(&bytes[..4]),
        digits(&bytes[5..7]),
        digits(&bytes[8..]),
    ) else {
        return false;
    };
    let days = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => return false,
    };
    (1..=days).contains(&day)
}

/// `HH:MM:SS[.fraction](Z|+HH:MM|-HH:MM)`.
fn is_valid_time(item: &str) -> bool {
    let bytes = item.as_bytes();
    if bytes.len() < 9 || bytes[2] != b':' || bytes[5] != b':' {
        return false;
    }
    let (Some(hour), Some(minute), Some(second)) = (
        digits(&bytes[..2]),
        digits(&bytes[3..5]),
        digits(&bytes[6..8]),
    ) else {
        return false;
    };
    if hour > 23 || minute > 59 || second > 60 {
        return false;
    }
    let mut rest = &bytes[8..];
    if let Some(fraction) = rest.strip_prefix(b".") {
        let length = fraction.iter().take_while(|byte| byte.is_ascii_digit()).count();
        if length == 0 {
            return false;
        }
        rest = &fraction[length..];
    }
    match rest {
        [b'Z' | b'z'] => true,
        [b'+' | b'-', offset @ ..] => {
            offset.len() == 5
                && offset[2] == b':'
                && digits(&offset[..2]).is_some_and(|hours| hours <= 23)
                && digits(&offset[3..]).is_some_and(|minutes| minutes <= 59)
        }
        _ => false,
    }
}

fn is_valid_datetime(item: &str) -> bool {
    match item.find(['T', 't']) {
        Some(10) => is_valid_date(&item[..10]) && is_valid_time(&item[11..]),
        _ => false,
    }
}

/// Hyphenated 8-4-4-4-12 hexadecimal form.
fn is_valid_uuid(item: &str) -> bool {
    let bytes = item.as_bytes();
    bytes.len() == 36
        && bytes.iter().enumerate().all(|(idx, byte)| match idx {
            8 | 13 | 18 | 23 => *byte == b'-',
            _ => byte.is_ascii_hexdigit(),
        })
}

fn is_valid_hostname(item: &str) -> bool {
    let item = item.strip_suffix('.').unwrap_or(item);
    !item.is_empty()
        && item.len() <= 253
        && item.split('.').all(|label| {
            let bytes = label.as_bytes();
            !bytes.is_empty()
                && bytes.len() <= 63
                && bytes[0] != b'-'
                && bytes[bytes.len() - 1] != b'-'
                && bytes
                    .iter()
                    .all(|byte| byte.is_ascii_alphanumeric() || *byte == b'-')
        })
}

fn is_valid_json_pointer(item: &str) -> bool {
    if item.is_empty() {
        return true;
    }
    if !item.starts_with('/') {
        return false;
    }
    let mut chars = item.chars();
    while let Some(ch) = chars.next() {
        if ch == '~' && !matches!(chars.next(), Some('0' | '1')) {
            return false;
        }
    }
    true
}

pub(crate) fn check<'s, 'i>(
    _: &mut Stack<'s, '_>,
    _: &mut EvaluationContext<'i>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    match (schema.as_str().and_then(Format::from_name), instance) {
        (Some(format), Value::String(item)) => format.is_valid(item),
        _ => true,
    }
}

pub(crate) fn error<'s, 'i>(
    _: &mut Stack<'s, '_>,
    ctx: &mut ErrorContext<'i>,
    location: &Location,
    path: &LazyLocation<'_, '_>,
    _: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    match (schema.as_str().and_then(Format::from_name), instance) {
        (Some(format), Value::String(item)) if !format.is_valid(item) => {
            ctx.add_error(ValidationError::new(
                ValidationErrorKind::Format {
                    format: format.as_str().to_string(),
                },
                location.join("format"),
                path.into(),
                instance,
            ))
        }
        _ => true,
    }
}

pub(crate) fn build<'s>(_: &mut BuildSession<'s>, _: &'s Map<String, Value>, schema: &'s Value) -> Expr {
    schema
        .as_str()
        .and_then(Format::from_name)
        .map_or(Expr::True, Expr::Format)
}
