//! ISO-8859-1 byte handling and `.properties` backslash escapes.
//!
//! Files are stored as ISO-8859-1; any character outside that range is
//! written as a `\uXXXX` escape (UTF-16 code units, so characters beyond the
//! BMP become a surrogate pair of escapes).

use std::borrow::Cow;
use std::fmt::Write;

/// Decodes ISO-8859-1 bytes. Every byte maps to the code point of equal value.
pub fn decode_latin1(bytes: &[u8]) -> Cow<'_, str> {
    encoding_rs::mem::decode_latin1(bytes)
}

/// Encodes text to ISO-8859-1 bytes.
///
/// Callers escape everything above U+00FF first (see [`escape_value`],
/// [`escape_key`], [`escape_comment`]); anything left above that range would
/// not survive the conversion.
pub fn encode_latin1(text: &str) -> Cow<'_, [u8]> {
    debug_assert!(
        encoding_rs::mem::is_str_latin1(text),
        "unescaped non-Latin-1 text reached the encoder"
    );
    encoding_rs::mem::encode_latin1_lossy(text)
}

/// Result of unescaping one logical value or key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Unescaped {
    pub text: String,
    /// Human-readable descriptions of malformed escapes that were kept literally.
    pub problems: Vec<String>,
}

/// Resolves backslash escapes in a key or value.
///
/// Malformed `\u` escapes are kept as written and reported in
/// [`Unescaped::problems`]; lone surrogates become U+FFFD.
pub fn unescape(input: &str) -> Unescaped {
    let chars: Vec<char> = input.chars().collect();
    let mut out = Unescaped {
        text: String::with_capacity(input.len()),
        problems: Vec::new(),
    };
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        if c != '\\' {
            out.text.push(c);
            continue;
        }
        let Some(&next) = chars.get(i) else {
            // A dangling backslash at the very end of the input is dropped.
            break;
        };
        i += 1;
        match next {
            't' => out.text.push('\t'),
            'n' => out.text.push('\n'),
            'r' => out.text.push('\r'),
            'f' => out.text.push('\u{000C}'),
            'u' => match read_code_unit(&chars, i) {
                Some(unit) => {
                    i += 4;
                    if (0xD800..0xDC00).contains(&unit) {
                        let low = (chars.get(i) == Some(&'\\') && chars.get(i + 1) == Some(&'u'))
                            .then(|| read_code_unit(&chars, i + 2))
                            .flatten()
                            .filter(|low| (0xDC00..0xE000).contains(low));
                        match low {
                            Some(low) => {
                                i += 6;
                                let combined =
                                    0x10000 + ((unit as u32 - 0xD800) << 10) + (low as u32 - 0xDC00);
                                out.text
                                    .push(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
                            }
                            None => {
                                out.text.push(char::REPLACEMENT_CHARACTER);
                                out.problems
                                    .push(format!("unpaired surrogate escape \\u{:04X}", unit));
                            }
                        }
                    } else if (0xDC00..0xE000).contains(&unit) {
                        out.text.push(char::REPLACEMENT_CHARACTER);
                        out.problems
                            .push(format!("unpaired surrogate escape \\u{:04X}", unit));
                    } else {
                        out.text
                            .push(char::from_u32(unit as u32).unwrap_or(char::REPLACEMENT_CHARACTER));
                    }
                }
                None => {
                    let end = (i + 4).min(chars.len());
                    let tail: String = chars[i..end]
                        .iter()
                        .take_while(|c| c.is_ascii_hexdigit())
                        .collect();
                    out.problems
                        .push(format!("malformed \\uXXXX escape `\\u{}`", tail));
                    out.text.push_str("\\u");
                }
            },
            other => out.text.push(other),
        }
    }

    out
}

fn read_code_unit(chars: &[char], start: usize) -> Option<u16> {
    let digits = chars.get(start..start + 4)?;
    digits.iter().try_fold(0u16, |acc, c| {
        c.to_digit(16).map(|d| (acc << 4) | d as u16)
    })
}

fn push_unicode_escape(out: &mut String, c: char) {
    let mut units = [0u16; 2];
    for unit in c.encode_utf16(&mut units) {
        // Writing to a String cannot fail.
        let _ = write!(out, "\\u{:04X}", unit);
    }
}

fn push_common_escape(out: &mut String, c: char) -> bool {
    match c {
        '\\' => out.push_str("\\\\"),
        '\t' => out.push_str("\\t"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\u{000C}' => out.push_str("\\f"),
        c if !(' '..='~').contains(&c) => push_unicode_escape(out, c),
        _ => return false,
    }
    true
}

/// Escapes a key so it reads back as the same key.
pub fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        if push_common_escape(&mut out, c) {
            continue;
        }
        if matches!(c, ' ' | '=' | ':' | '#' | '!') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escapes a value so it reads back as the same value.
///
/// Only a leading space needs escaping; `=`, `:`, `#` and `!` are plain
/// characters once the separator has been read.
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        if push_common_escape(&mut out, c) {
            continue;
        }
        if i == 0 && c == ' ' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escapes the characters of a comment line that ISO-8859-1 cannot hold.
///
/// Comments are not unescaped by readers, so Latin-1 text is left alone and
/// round-trips unchanged.
pub fn escape_comment(comment: &str) -> Cow<'_, str> {
    if encoding_rs::mem::is_str_latin1(comment) {
        return Cow::Borrowed(comment);
    }
    let mut out = String::with_capacity(comment.len() + 8);
    for c in comment.chars() {
        if (c as u32) > 0xFF {
            push_unicode_escape(&mut out, c);
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1_bytes() {
        let bytes = b"caf\xe9 \x80";
        let text = decode_latin1(bytes);
        assert_eq!(text, "caf\u{e9} \u{80}");
        assert_eq!(encode_latin1(&text).as_ref(), bytes);
    }

    #[test]
    fn test_unescape_standard_sequences() {
        let out = unescape(r"a\tb\nc\rd\fe\\f\=g\:h\ i");
        assert_eq!(out.text, "a\tb\nc\rd\u{000C}e\\f=g:h i");
        assert!(out.problems.is_empty());
    }

    #[test]
    fn test_unescape_unicode() {
        assert_eq!(unescape(r"caf\u00e9").text, "café");
        assert_eq!(unescape(r"\u00C9t\u00E9").text, "Été");
        assert_eq!(unescape(r"\uD83D\uDE00!").text, "😀!");
        assert!(unescape(r"\uD83D\uDE00!").problems.is_empty());
    }

    #[test]
    fn test_unescape_malformed_unicode_is_kept() {
        let out = unescape(r"bad \u12 here");
        assert_eq!(out.text, r"bad \u12 here");
        assert_eq!(out.problems.len(), 1);
        assert!(out.problems[0].contains("malformed"));

        let out = unescape(r"end\u");
        assert_eq!(out.text, r"end\u");
        assert_eq!(out.problems.len(), 1);
    }

    #[test]
    fn test_unescape_lone_surrogate() {
        let out = unescape(r"x\uD83Dy");
        assert_eq!(out.text, "x\u{FFFD}y");
        assert_eq!(out.problems.len(), 1);
    }

    #[test]
    fn test_escape_value() {
        assert_eq!(escape_value("café"), r"caf\u00E9");
        assert_eq!(escape_value(" lead"), r"\ lead");
        assert_eq!(escape_value("a = b: #c"), "a = b: #c");
        assert_eq!(escape_value("tab\there\\"), r"tab\there\\");
        assert_eq!(escape_value("😀"), r"\uD83D\uDE00");
    }

    #[test]
    fn test_escape_key() {
        assert_eq!(escape_key("a key=x:y"), r"a\ key\=x\:y");
        assert_eq!(escape_key("#not.comment"), r"\#not.comment");
        assert_eq!(escape_key("plain.key"), "plain.key");
    }

    #[test]
    fn test_escape_round_trip() {
        for value in ["café", " spaced", "multi\nline", "日本語", "a\\b", "😀 ok"] {
            assert_eq!(unescape(&escape_value(value)).text, value);
        }
    }

    #[test]
    fn test_escape_comment() {
        assert_eq!(escape_comment("# caf\u{e9}"), "# caf\u{e9}");
        assert_eq!(escape_comment("# 日"), r"# \u65E5");
    }
}
