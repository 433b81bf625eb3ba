//! Support for Java `.properties` files.
//!
//! Parsing keeps every physical line: comments and blank lines are stored
//! verbatim, and key/value lines keep their original text so an unmodified
//! file writes back byte-for-byte.

use std::fmt::Display;
use std::io::{Read, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::{
    error::Error,
    escape::{decode_latin1, encode_latin1, escape_comment, escape_key, escape_value, unescape},
    read_options::ReadOptions,
    traits::Parser,
    types::{CommentLine, Line, LineEnding, PairLine, RawText},
};

/// A problem found while parsing and recovered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub line_number: usize,
    pub message: String,
}

impl Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line_number, self.message)
    }
}

/// A parsed `.properties` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    /// Every logical line, in file order.
    pub lines: Vec<Line>,
    pub line_ending: LineEnding,
    /// Whether the last line is followed by a line terminator.
    pub trailing_newline: bool,
    pub warnings: Vec<ParseWarning>,
}

impl Default for Format {
    fn default() -> Self {
        Format {
            lines: Vec::new(),
            line_ending: LineEnding::Lf,
            trailing_newline: true,
            warnings: Vec::new(),
        }
    }
}

impl Format {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses file content with explicit options.
    pub fn parse_with(bytes: &[u8], options: &ReadOptions) -> Result<Self, Error> {
        let text = decode_latin1(bytes);
        let mut format = Format::new();
        if text.is_empty() {
            return Ok(format);
        }

        format.line_ending = match text.find('\n') {
            Some(i) if i > 0 && text.as_bytes()[i - 1] == b'\r' => LineEnding::CrLf,
            _ => LineEnding::Lf,
        };
        format.trailing_newline = text.ends_with('\n');

        let mut physical: Vec<&str> = text.split('\n').collect();
        if format.trailing_newline {
            physical.pop();
        }
        if format.line_ending == LineEnding::CrLf {
            physical = physical
                .into_iter()
                .map(|line| line.strip_suffix('\r').unwrap_or(line))
                .collect();
        }

        let mut i = 0;
        while i < physical.len() {
            let line_number = i + 1;
            let content = physical[i].strip_suffix('\r').unwrap_or(physical[i]);
            let body = trim_leading_whitespace(content);

            if body.is_empty() || body.starts_with('#') || body.starts_with('!') {
                format.lines.push(Line::Comment(CommentLine {
                    line_number: Some(line_number),
                    text: physical[i].to_string(),
                }));
                i += 1;
                continue;
            }

            let mut raw = vec![physical[i].to_string()];
            let mut logical = body.to_string();
            i += 1;
            while ends_with_continuation(&logical) {
                logical.pop();
                let Some(&next) = physical.get(i) else {
                    break;
                };
                raw.push(next.to_string());
                logical.push_str(trim_leading_whitespace(
                    next.strip_suffix('\r').unwrap_or(next),
                ));
                i += 1;
            }

            let pair = parse_pair(&logical, line_number, RawText(raw), options, &mut format.warnings)?;
            format.lines.push(Line::Pair(pair));
        }

        debug!(
            lines = format.lines.len(),
            warnings = format.warnings.len(),
            "parsed properties content"
        );
        Ok(format)
    }

    /// Reads and parses a file with explicit options.
    pub fn read_with<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| Error::file_access(path, e))?;
        let format = Self::parse_with(&bytes, options)?;
        debug!(path = %path.display(), lines = format.lines.len(), "read properties file");
        Ok(format)
    }

    /// Iterates over all key/value lines.
    pub fn pairs(&self) -> impl Iterator<Item = &PairLine> {
        self.lines.iter().filter_map(|line| match line {
            Line::Pair(pair) => Some(pair),
            Line::Comment(_) => None,
        })
    }

    /// Finds the first line with the given key.
    pub fn get(&self, key: &str) -> Option<&PairLine> {
        self.pairs().find(|pair| pair.key == key)
    }

    /// Serializes to text; every character is within ISO-8859-1.
    pub fn render(&self) -> String {
        let mut physical: Vec<String> = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            match line {
                Line::Comment(comment) => physical.push(escape_comment(&comment.text).into_owned()),
                Line::Pair(pair) => match &pair.raw {
                    Some(raw) => physical.extend(raw.lines().iter().cloned()),
                    None if pair.value.is_some() => physical.push(pair.to_string()),
                    None => {}
                },
            }
        }

        let ending = self.line_ending.as_str();
        let mut out = physical.join(ending);
        if self.trailing_newline && !physical.is_empty() {
            out.push_str(ending);
        }
        out
    }
}

impl Parser for Format {
    fn from_reader<R: Read>(mut reader: R) -> Result<Self, Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Format::parse_with(&bytes, &ReadOptions::default())
    }

    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        let text = self.render();
        writer.write_all(&encode_latin1(&text))?;
        writer.flush().map_err(Error::Io)
    }
}

impl Display for PairLine {
    /// Writes the line in composed form, ignoring any original text.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let separator = if self.spaced_equals { " = " } else { "=" };
        write!(
            f,
            "{}{}{}",
            escape_key(&self.key),
            separator,
            escape_value(self.value.as_deref().unwrap_or(""))
        )
    }
}

fn is_line_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{000C}')
}

fn trim_leading_whitespace(s: &str) -> &str {
    s.trim_start_matches(is_line_whitespace)
}

fn ends_with_continuation(s: &str) -> bool {
    s.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn parse_pair(
    logical: &str,
    line_number: usize,
    raw: RawText,
    options: &ReadOptions,
    warnings: &mut Vec<ParseWarning>,
) -> Result<PairLine, Error> {
    let chars: Vec<(usize, char)> = logical.char_indices().collect();

    let mut key_end = logical.len();
    let mut separator_found = false;
    let mut escaped = false;
    let mut idx = 0;
    while idx < chars.len() {
        let (pos, c) = chars[idx];
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || is_line_whitespace(c) {
            key_end = pos;
            break;
        }
        idx += 1;
    }

    let mut spaced_equals = false;
    while idx < chars.len() {
        let (_, c) = chars[idx];
        if is_line_whitespace(c) {
            spaced_equals = true;
        } else if !separator_found && (c == '=' || c == ':') {
            separator_found = true;
        } else {
            break;
        }
        idx += 1;
    }
    let value_start = chars.get(idx).map_or(logical.len(), |&(pos, _)| pos);

    let key = unescape(&logical[..key_end]);
    let value = unescape(&logical[value_start..]);

    for problem in key.problems.into_iter().chain(value.problems) {
        if options.strict_escapes {
            return Err(Error::format_error(line_number, problem));
        }
        warn!(line = line_number, "{}", problem);
        warnings.push(ParseWarning {
            line_number,
            message: problem,
        });
    }

    Ok(PairLine {
        line_number: Some(line_number),
        key: key.text,
        value: Some(value.text).filter(|v| !v.is_empty()),
        spaced_equals,
        raw: Some(raw),
    })
}
