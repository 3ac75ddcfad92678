//! URL-encoded parameter strings, parsed into a multi-valued lookup.

use crate::error::AppError;
use std::collections::BTreeMap;
use url::form_urlencoded;

/// Parsed query parameters. Repeated keys keep every value in order of appearance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedParams {
    params: BTreeMap<String, Vec<String>>,
}

impl ParsedParams {
    /// Parse a query string without the leading `?`, e.g. `"offset=2&&count=4"`.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        check_encoding(raw)?;
        let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (k, v) in form_urlencoded::parse(raw.as_bytes()) {
            params.entry(k.into_owned()).or_default().push(v.into_owned());
        }
        Ok(ParsedParams { params })
    }

    /// First value for `key`. Absent keys and empty values are both `NotFound`.
    pub fn get(&self, key: &str) -> Result<&str, AppError> {
        match self.params.get(key).and_then(|v| v.first()) {
            Some(value) if !value.is_empty() => Ok(value.as_str()),
            _ => Err(AppError::NotFound(format!(
                "no url param entry found for key \"{}\"",
                key
            ))),
        }
    }

    pub fn get_int(&self, key: &str) -> Result<i64, AppError> {
        let value = self.get(key)?;
        value
            .parse::<i64>()
            .map_err(|e| AppError::Type(format!("url param \"{}\" = \"{}\" is not an integer: {}", key, value, e)))
    }

    /// Keys in sorted order, each with all of its values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Rejects what a strict query decoder refuses: `;` separators, broken percent-escapes
/// and escapes that decode to invalid UTF-8.
fn check_encoding(raw: &str) -> Result<(), AppError> {
    for segment in raw.split('&') {
        if segment.contains(';') {
            return Err(AppError::Parse("invalid semicolon separator in query".into()));
        }
        for part in segment.splitn(2, '=') {
            let decoded = percent_decode(part)?;
            if std::str::from_utf8(&decoded).is_err() {
                return Err(AppError::Parse(format!("invalid UTF-8 in query component \"{}\"", part)));
            }
        }
    }
    Ok(())
}

fn percent_decode(part: &str) -> Result<Vec<u8>, AppError> {
    let bytes = part.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes
                .get(i + 1..i + 3)
                .filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            let Some(byte) = escape else {
                let end = (i + 3).min(bytes.len());
                return Err(AppError::Parse(format!(
                    "invalid URL escape \"{}\"",
                    String::from_utf8_lossy(&bytes[i..end])
                )));
            };
            out.push(byte);
            i += 3;
        } else {
            out.push(if bytes[i] == b'+' { b' ' } else { bytes[i] });
            i += 1;
        }
    }
    Ok(out)
}
