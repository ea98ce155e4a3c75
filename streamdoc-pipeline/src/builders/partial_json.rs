//! Partial JSON completion
//!
//! Visualization payloads are JSON objects written by a model, and they may stop anywhere:
//! inside a string, after a key, in the middle of `true` or `-1.5e`. [`complete`] turns any
//! such prefix of a JSON document into a parseable document by closing the open string and
//! appending the missing closers, innermost first.
//!
//! Dangling pieces that cannot be closed are cut back instead:
//!
//! - a partial escape sequence, or an unpaired high surrogate, at the end of a string
//! - an unterminated object key, a key without its value, a trailing comma
//! - a number ending in `-`, `.`, `e`, `E` or `+`
//!
//! A partial `true`, `false` or `null` is completed. Well-formed input comes back unchanged
//! (and unallocated).

use std::borrow::Cow;

/// Completes a possibly truncated JSON document.
///
/// Input that is structurally invalid (mismatched closers, stray characters) is returned as is,
/// so the JSON decoder reports the real problem.
pub fn complete(json: &str) -> Cow<'_, str> {
    let mut scanner = Scanner::default();
    for (pos, c) in json.char_indices() {
        if !scanner.step(pos, c) {
            return Cow::Borrowed(json);
        }
    }
    scanner.finish(json)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Key,
    Colon,
    Value,
    CommaOrEnd,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    object: bool,
    expect: Expect,
    /// Length of the input up to which this container can be closed as is
    safe_len: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct StringState {
    key: bool,
    /// Start of an escape sequence that is still being read
    escape_start: Option<usize>,
    /// Digits read so far of a `\u` escape, and their value
    hex: Option<(u8, u32)>,
    /// Start of a `\u` high surrogate still waiting for its low half
    high_surrogate_at: Option<usize>,
}

#[derive(Debug, Default)]
struct Scanner {
    stack: Vec<Frame>,
    string: Option<StringState>,
    /// Start of a number or literal that is still being read
    token: Option<usize>,
}

impl Scanner {
    fn step(&mut self, pos: usize, c: char) -> bool {
        if let Some(string) = self.string.as_mut() {
            return match string_step(string, pos, c) {
                StringStep::Continue => true,
                StringStep::Invalid => false,
                StringStep::Closed { key } => {
                    self.string = None;
                    if key {
                        if let Some(frame) = self.stack.last_mut() {
                            frame.expect = Expect::Colon;
                        }
                    } else {
                        self.finish_value(pos + c.len_utf8());
                    }
                    true
                }
            };
        }

        if self.token.is_some() {
            if matches!(c, ',' | '}' | ']') || c.is_whitespace() {
                self.token = None;
                self.finish_value(pos);
            } else {
                return true;
            }
        }

        match c {
            c if c.is_whitespace() => true,
            '{' | '[' => {
                if !self.expecting_value() {
                    return false;
                }
                let object = c == '{';
                self.stack.push(Frame {
                    object,
                    expect: if object { Expect::Key } else { Expect::Value },
                    safe_len: pos + 1,
                });
                true
            }
            '}' | ']' => match self.stack.pop() {
                Some(frame) if frame.object == (c == '}') => {
                    self.finish_value(pos + 1);
                    true
                }
                _ => false,
            },
            '"' => {
                let key = match self.stack.last() {
                    Some(frame) if frame.object && frame.expect == Expect::Key => true,
                    _ if self.expecting_value() => false,
                    _ => return false,
                };
                self.string = Some(StringState {
                    key,
                    ..StringState::default()
                });
                true
            }
            ':' => match self.stack.last_mut() {
                Some(frame) if frame.expect == Expect::Colon => {
                    frame.expect = Expect::Value;
                    true
                }
                _ => false,
            },
            ',' => match self.stack.last_mut() {
                Some(frame) if frame.expect == Expect::CommaOrEnd => {
                    frame.expect = if frame.object {
                        Expect::Key
                    } else {
                        Expect::Value
                    };
                    true
                }
                _ => false,
            },
            _ => {
                if !self.expecting_value() {
                    return false;
                }
                self.token = Some(pos);
                true
            }
        }
    }

    fn expecting_value(&self) -> bool {
        self.stack
            .last()
            .map_or(true, |frame| frame.expect == Expect::Value)
    }

    fn finish_value(&mut self, end: usize) {
        if let Some(frame) = self.stack.last_mut() {
            frame.expect = Expect::CommaOrEnd;
            frame.safe_len = end;
        }
    }

    fn finish(self, json: &str) -> Cow<'_, str> {
        let innermost_safe_len = self.stack.last().map(|frame| frame.safe_len);
        let mut keep = json.len();
        let mut suffix = "";

        if let Some(string) = self.string {
            if string.key {
                keep = innermost_safe_len.unwrap_or(0);
            } else {
                keep = string
                    .high_surrogate_at
                    .or(string.escape_start)
                    .unwrap_or(json.len());
                suffix = "\"";
            }
        } else if let Some(start) = self.token {
            match repair_token(&json[start..]) {
                Some(TokenRepair::Append(rest)) => suffix = rest,
                Some(TokenRepair::Keep(len)) => keep = start + len,
                None => match innermost_safe_len {
                    Some(safe_len) => keep = safe_len,
                    None => return Cow::Borrowed(json),
                },
            }
        } else if let Some(frame) = self.stack.last() {
            if frame.expect != Expect::CommaOrEnd {
                keep = frame.safe_len;
            }
        }

        if keep == json.len() && suffix.is_empty() && self.stack.is_empty() {
            return Cow::Borrowed(json);
        }

        let mut completed = String::with_capacity(keep + suffix.len() + self.stack.len());
        completed.push_str(&json[..keep]);
        completed.push_str(suffix);
        for frame in self.stack.iter().rev() {
            completed.push(if frame.object { '}' } else { ']' });
        }
        Cow::Owned(completed)
    }
}

enum StringStep {
    Continue,
    Invalid,
    Closed { key: bool },
}

fn string_step(string: &mut StringState, pos: usize, c: char) -> StringStep {
    let Some(start) = string.escape_start else {
        match c {
            '\\' => string.escape_start = Some(pos),
            '"' => return StringStep::Closed { key: string.key },
            _ => string.high_surrogate_at = None,
        }
        return StringStep::Continue;
    };

    match string.hex {
        Some((count, value)) => {
            let Some(digit) = c.to_digit(16) else {
                return StringStep::Invalid;
            };
            let value = value * 16 + digit;
            if count + 1 < 4 {
                string.hex = Some((count + 1, value));
            } else {
                string.hex = None;
                string.escape_start = None;
                string.high_surrogate_at = if (0xD800..=0xDBFF).contains(&value) {
                    Some(start)
                } else {
                    None
                };
            }
        }
        None if c == 'u' => string.hex = Some((0, 0)),
        None => {
            string.escape_start = None;
            string.high_surrogate_at = None;
        }
    }
    StringStep::Continue
}

enum TokenRepair {
    /// Append the rest of a literal
    Append(&'static str),
    /// Keep this many bytes of the token
    Keep(usize),
}

fn repair_token(token: &str) -> Option<TokenRepair> {
    for literal in ["true", "false", "null"] {
        if literal.starts_with(token) {
            return Some(TokenRepair::Append(&literal[token.len()..]));
        }
    }
    if !token
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
    {
        return None;
    }
    let number = token.trim_end_matches(|c: char| !c.is_ascii_digit());
    (!number.is_empty()).then_some(TokenRepair::Keep(number.len()))
}
