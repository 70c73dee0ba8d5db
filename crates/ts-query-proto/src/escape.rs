//! ServerQuery escaping utilities.
//!
//! Keys and values on the wire cannot contain spaces, pipes, slashes or
//! control characters; they are replaced by backslash sequences.

use std::fmt::{Result as FmtResult, Write};

/// Escape a value for serialization, writing into `f`.
pub fn escape_to(f: &mut dyn Write, value: &str) -> FmtResult {
    for c in value.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '/' => f.write_str("\\/")?,
            ' ' => f.write_str("\\s")?,
            '|' => f.write_str("\\p")?,
            '\u{07}' => f.write_str("\\a")?,
            '\u{08}' => f.write_str("\\b")?,
            '\u{0C}' => f.write_str("\\f")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\u{0B}' => f.write_str("\\v")?,
            c => f.write_char(c)?,
        }
    }
    Ok(())
}

/// Escape a value for serialization.
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    // Writing to a String cannot fail.
    let _ = escape_to(&mut escaped, value);
    escaped
}

/// Unescape a value from wire format.
///
/// Reverses [`escape`]. Unknown sequences keep the escaped character and a
/// trailing lone backslash is dropped.
pub fn unescape(value: &str) -> String {
    if !value.contains('\\') {
        return value.to_string();
    }

    let mut unescaped = String::with_capacity(value.len());
    let mut iter = value.chars();
    while let Some(c) = iter.next() {
        let r = if c == '\\' {
            match iter.next() {
                Some('\\') => '\\',
                Some('/') => '/',
                Some('s') => ' ',
                Some('p') => '|',
                Some('a') => '\u{07}',
                Some('b') => '\u{08}',
                Some('f') => '\u{0C}',
                Some('n') => '\n',
                Some('r') => '\r',
                Some('t') => '\t',
                Some('v') => '\u{0B}',
                Some(c) => c,
                None => break,
            }
        } else {
            c
        };
        unescaped.push(r);
    }
    unescaped
}
