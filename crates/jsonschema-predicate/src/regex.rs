use core::fmt;
use std::borrow::Cow;
use std::fmt::Write as _;

use crate::error::CompileError;

/// A compiled `pattern` / `patternProperties` matcher.
///
/// Anchored literal patterns skip the regex engines entirely. Anything else goes
/// to `regex` first and falls back to `fancy-regex` for lookaround and
/// backreferences.
pub enum Pattern {
    Prefix {
        literal: String,
        source: Box<str>,
    },
    Exact {
        literal: String,
        source: Box<str>,
    },
    Standard {
        regex: regex::Regex,
        source: Box<str>,
        unicode: bool,
    },
    Backtracking {
        regex: fancy_regex::Regex,
        source: Box<str>,
        unicode: bool,
    },
}

impl Pattern {
    /// Compile `source` with ECMA-262 matching rules.
    ///
    /// `\d`, `\w` and `\b` are ASCII-only in both modes. `unicode` enables the
    /// `\p{..}` and `\u{..}` escapes and makes a character outside the BMP a
    /// single unit. Without it such a character is a pair of surrogates.
    pub(crate) fn new(source: &str, unicode: bool) -> Result<Pattern, CompileError> {
        let original: Box<str> = source.into();
        match analyze_pattern(source) {
            Some(PatternOptimization::Prefix(literal)) => Ok(Pattern::Prefix {
                literal,
                source: original,
            }),
            Some(PatternOptimization::Exact(literal)) => Ok(Pattern::Exact {
                literal,
                source: original,
            }),
            None => {
                let translated = translate(source, unicode, Boundary::Ascii);
                if let Ok(regex) = regex::Regex::new(&translated) {
                    return Ok(Pattern::Standard {
                        regex,
                        source: original,
                        unicode,
                    });
                }
                let translated = translate(source, unicode, Boundary::Lookaround);
                match fancy_regex::Regex::new(&translated) {
                    Ok(regex) => Ok(Pattern::Backtracking {
                        regex,
                        source: original,
                        unicode,
                    }),
                    Err(error) => Err(CompileError::InvalidPattern {
                        pattern: source.to_string(),
                        message: error.to_string(),
                    }),
                }
            }
        }
    }

    #[inline]
    pub(crate) fn is_match(&self, text: &str) -> bool {
        match self {
            Pattern::Prefix { literal, .. } => text.starts_with(literal.as_str()),
            Pattern::Exact { literal, .. } => text == literal,
            Pattern::Standard { regex, unicode, .. } => {
                regex.is_match(&code_units(text, *unicode))
            }
            // Exceeding the backtrack limit counts as a mismatch
            Pattern::Backtracking { regex, unicode, .. } => regex
                .is_match(&code_units(text, *unicode))
                .unwrap_or(false),
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            Pattern::Prefix { source, .. }
            | Pattern::Exact { source, .. }
            | Pattern::Standard { source, .. }
            | Pattern::Backtracking { source, .. } => source,
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source()).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = serde_json::Value::String(self.source().to_string());
        match self {
            Pattern::Prefix { literal, .. } => {
                write!(f, "prefix({})", serde_json::Value::String(literal.clone()))
            }
            Pattern::Exact { literal, .. } => {
                write!(f, "exact({})", serde_json::Value::String(literal.clone()))
            }
            Pattern::Standard { .. } => write!(f, "regex({source})"),
            Pattern::Backtracking { .. } => write!(f, "fancy_regex({source})"),
        }
    }
}

/// Result of analyzing a regex pattern for literal-match optimizations.
#[derive(Debug, PartialEq)]
pub(crate) enum PatternOptimization {
    /// `^prefix`, matched with `starts_with`.
    Prefix(String),
    /// `^exact$`, matched with string equality.
    Exact(String),
}

/// Analyze a pattern and return a [`PatternOptimization`] if one applies, or `None` if a full
/// regex engine is required.
///
/// Accepts unescaped alphanumeric chars, `-`, `_`, `/` and the escapes `\/`, `\-`, `\_`,
/// `\$`, `\.` in the literal body. A trailing unescaped `$` makes the match exact.
pub(crate) fn analyze_pattern(pattern: &str) -> Option<PatternOptimization> {
    let suffix = pattern.strip_prefix('^')?;
    let mut literal = String::new();
    let mut chars = suffix.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next()? {
                c @ ('/' | '-' | '_' | '$' | '.') => literal.push(c),
                _ => return None,
            }
        } else if c == '$' {
            if chars.peek().is_none() {
                return Some(PatternOptimization::Exact(literal));
            }
            return None;
        } else if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/') {
            literal.push(c);
        } else {
            return None;
        }
    }
    Some(PatternOptimization::Prefix(literal))
}

/// Surrogate code unit `U` is represented by the scalar `SURROGATE_BASE + U`.
///
/// Outside of Unicode mode the input and the pattern both spell a character
/// above the BMP as two such scalars, so `.` and negated classes consume one
/// UTF-16 code unit at a time.
const SURROGATE_BASE: u32 = 0x10_0000;

const WORD: &str = "0-9A-Za-z_";
const NOT_DIGIT: &str = r"\x00-/:-\x{10FFFF}";
const NOT_WORD: &str = r"\x00-/:-@\[-\^`\{-\x{10FFFF}";
const ANY: &str = r"[\x00-\x{10FFFF}]";
const NOTHING: &str = r"[^\x00-\x{10FFFF}]";
const DOT: &str = r"[^\n\r\x{2028}\x{2029}]";

/// How an ASCII word boundary is spelled for the target engine.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Boundary {
    /// `regex` has a flag group for ASCII boundaries.
    Ascii,
    /// `fancy-regex` rejects `(?-u)`.
    Lookaround,
}

impl Boundary {
    fn assertion(self, negated: bool) -> &'static str {
        match (self, negated) {
            (Boundary::Ascii, false) => r"(?-u:\b)",
            (Boundary::Ascii, true) => r"(?-u:\B)",
            (Boundary::Lookaround, false) => {
                "(?:(?<=[0-9A-Za-z_])(?![0-9A-Za-z_])|(?<![0-9A-Za-z_])(?=[0-9A-Za-z_]))"
            }
            (Boundary::Lookaround, true) => {
                "(?:(?<=[0-9A-Za-z_])(?=[0-9A-Za-z_])|(?<![0-9A-Za-z_])(?![0-9A-Za-z_]))"
            }
        }
    }
}

/// The text a pattern runs against.
fn code_units(text: &str, unicode: bool) -> Cow<'_, str> {
    if unicode || text.chars().all(|c| u32::from(c) <= 0xFFFF) {
        return Cow::Borrowed(text);
    }
    let mut output = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        if u32::from(c) <= 0xFFFF {
            output.push(c);
        } else {
            let mut units = [0; 2];
            for unit in c.encode_utf16(&mut units) {
                output.extend(char::from_u32(SURROGATE_BASE + u32::from(*unit)));
            }
        }
    }
    Cow::Owned(output)
}

fn push_scalar(output: &mut String, scalar: u32) {
    let _ = write!(output, "\\x{{{scalar:X}}}");
}

fn push_literal(output: &mut String, c: char, unicode: bool) {
    if unicode || u32::from(c) <= 0xFFFF {
        output.push(c);
    } else {
        let mut units = [0; 2];
        for unit in c.encode_utf16(&mut units) {
            push_scalar(output, SURROGATE_BASE + u32::from(*unit));
        }
    }
}

/// Exactly `width` hex digits starting at `at`.
fn hex(chars: &[char], at: usize, width: usize) -> Option<u32> {
    chars
        .get(at..at + width)?
        .iter()
        .try_fold(0, |acc, c| c.to_digit(16).map(|digit| acc * 16 + digit))
}

/// End of a `{n}`, `{n,}` or `{n,m}` quantifier whose body starts at `at`.
fn quantifier_end(chars: &[char], at: usize) -> Option<usize> {
    let digits = |mut idx: usize| {
        while chars.get(idx).is_some_and(char::is_ascii_digit) {
            idx += 1;
        }
        idx
    };
    let mut idx = digits(at);
    if idx == at {
        return None;
    }
    if chars.get(idx) == Some(&',') {
        idx = digits(idx + 1);
    }
    (chars.get(idx) == Some(&'}')).then_some(idx + 1)
}

/// Copy a braced escape body such as `{L}` verbatim.
fn copy_braced(chars: &[char], idx: &mut usize, output: &mut String) {
    while let Some(&c) = chars.get(*idx) {
        output.push(c);
        *idx += 1;
        if c == '}' {
            break;
        }
    }
}

/// Rewrite an ECMA-262 pattern into syntax understood by `regex` and `fancy-regex`.
pub(crate) fn translate(pattern: &str, unicode: bool, boundary: Boundary) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut output = String::with_capacity(pattern.len() + 16);
    let mut in_class = false;
    let mut idx = 0;
    while idx < chars.len() {
        let c = chars[idx];
        idx += 1;
        match c {
            '\\' => {
                let Some(&next) = chars.get(idx) else {
                    output.push('\\');
                    break;
                };
                idx += 1;
                match next {
                    'd' if in_class => output.push_str("0-9"),
                    'd' => output.push_str("[0-9]"),
                    'D' if in_class => output.push_str(NOT_DIGIT),
                    'D' => output.push_str("[^0-9]"),
                    'w' if in_class => output.push_str(WORD),
                    'w' => {
                        let _ = write!(output, "[{WORD}]");
                    }
                    'W' if in_class => output.push_str(NOT_WORD),
                    'W' => {
                        let _ = write!(output, "[^{WORD}]");
                    }
                    'b' if in_class => output.push_str(r"\x08"),
                    'b' | 'B' => output.push_str(boundary.assertion(next == 'B')),
                    '0' if !chars.get(idx).is_some_and(char::is_ascii_digit) => {
                        output.push_str(r"\x00");
                    }
                    'c' if chars.get(idx).is_some_and(char::is_ascii_alphabetic) => {
                        push_scalar(&mut output, u32::from(chars[idx]) % 32);
                        idx += 1;
                    }
                    'p' | 'P' if unicode && chars.get(idx) == Some(&'{') => {
                        output.push('\\');
                        output.push(next);
                        copy_braced(&chars, &mut idx, &mut output);
                    }
                    'u' => {
                        if let Some(unit) = hex(&chars, idx, 4) {
                            idx += 4;
                            let low = (chars.get(idx) == Some(&'\\')
                                && chars.get(idx + 1) == Some(&'u'))
                            .then(|| hex(&chars, idx + 2, 4))
                            .flatten()
                            .filter(|low| (0xDC00..0xE000).contains(low));
                            match low {
                                Some(low) if unicode && (0xD800..0xDC00).contains(&unit) => {
                                    idx += 6;
                                    push_scalar(
                                        &mut output,
                                        0x1_0000 + ((unit - 0xD800) << 10) + (low - 0xDC00),
                                    );
                                }
                                _ if (0xD800..0xE000).contains(&unit) => {
                                    push_scalar(&mut output, SURROGATE_BASE + unit);
                                }
                                _ => push_scalar(&mut output, unit),
                            }
                        } else if unicode && chars.get(idx) == Some(&'{') {
                            output.push_str(r"\x");
                            copy_braced(&chars, &mut idx, &mut output);
                        } else {
                            output.push('u');
                        }
                    }
                    'f' | 'n' | 'r' | 't' | 'v' | 's' | 'S' | 'x' | 'k' | '1'..='9' => {
                        output.push('\\');
                        output.push(next);
                    }
                    // Any other letter is an identity escape, `\<` and `\>` are
                    // boundaries in `regex`
                    next if next.is_ascii_alphanumeric() || matches!(next, '<' | '>') => {
                        output.push(next);
                    }
                    next if next.is_ascii() => {
                        output.push('\\');
                        output.push(next);
                    }
                    next => push_literal(&mut output, next, unicode),
                }
            }
            '[' if !in_class => {
                let negated = chars.get(idx) == Some(&'^');
                let body = if negated { idx + 1 } else { idx };
                if chars.get(body) == Some(&']') {
                    // `[]` never matches, `[^]` matches any unit
                    output.push_str(if negated { ANY } else { NOTHING });
                    idx = body + 1;
                } else {
                    in_class = true;
                    output.push_str(if negated { "[^" } else { "[" });
                    idx = body;
                }
            }
            ']' if in_class => {
                in_class = false;
                output.push(']');
            }
            '[' | '&' | '~' if in_class => {
                output.push('\\');
                output.push(c);
            }
            '.' if !in_class => output.push_str(DOT),
            '{' if !in_class => {
                if let Some(end) = quantifier_end(&chars, idx) {
                    output.push('{');
                    output.extend(&chars[idx..end]);
                    idx = end;
                } else {
                    output.push_str(r"\{");
                }
            }
            '}' if !in_class => output.push_str(r"\}"),
            c => push_literal(&mut output, c, unicode),
        }
    }
    output
}
