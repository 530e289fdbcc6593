//! `// key = "***"` lines standing in for sensitive variables.
//!
//! Placeholders are plain comments to HCL, so they live in the whitespace
//! and comment decor around attributes. These helpers find and edit them
//! line by line inside that text.

use std::ops::Range;

use super::format::format_key;

/// Placeholder value written in place of a sensitive value.
pub const MASK: &str = "***";

/// Returns the placeholder line for `key`, newline included.
#[must_use]
pub fn line(key: &str) -> String {
    format!("// {} = \"{MASK}\"\n", format_key(key))
}

/// Recognises `// key = "***"` and returns the key.
#[must_use]
pub fn parse(line: &str) -> Option<String> {
    let rest = line.trim().strip_prefix("//")?;
    let (key, value) = rest.split_once('=')?;
    let key = key.trim();
    let key = key
        .strip_prefix('"')
        .and_then(|k| k.strip_suffix('"'))
        .unwrap_or(key);

    if value.trim() == format!("\"{MASK}\"") && !key.is_empty() {
        Some(key.to_string())
    } else {
        None
    }
}

/// Returns every placeholder in `text` with the byte range of its line.
pub fn scan(text: &str) -> Vec<(Range<usize>, String)> {
    let mut offset = 0;
    text.split_inclusive('\n')
        .filter_map(|line| {
            let start = offset;
            offset += line.len();
            parse(line).map(|key| (start..offset, key))
        })
        .collect()
}

/// Finds the line range of the placeholder for `key`.
#[must_use]
pub fn find(text: &str, key: &str) -> Option<Range<usize>> {
    scan(text)
        .into_iter()
        .find_map(|(range, found)| (found == key).then_some(range))
}

/// Drops placeholder lines whose key is rejected by `keep`.
///
/// Returns `None` when nothing was dropped.
pub fn retain(text: &str, keep: impl Fn(&str) -> bool) -> Option<String> {
    let dropped: Vec<Range<usize>> = scan(text)
        .into_iter()
        .filter(|(_, key)| !keep(key))
        .map(|(range, _)| range)
        .collect();

    if dropped.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for range in dropped {
        out.push_str(&text[last..range.start]);
        last = range.end;
    }
    out.push_str(&text[last..]);
    Some(out)
}
