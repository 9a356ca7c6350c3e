#![forbid(unsafe_code)]

//! Escape-aware text tokenizer.
//!
//! Raw dialogue text arrives annotated with inline escape sequences
//! (color changes, icons, font size shifts) introduced by an ESC marker.
//! [`tokenize`] scans the text once, left to right, and produces the flat
//! [`Token`] sequence the layout engine consumes. Escape sequences are
//! decoded through the [`EscapeDecoder`] seam so hosts with their own
//! control-code grammar can plug in; [`ControlCodeDecoder`] implements the
//! stock grammar.
//!
//! # Invariants
//!
//! 1. Emitted token order mirrors source character order exactly.
//! 2. `Run` tokens are never empty.
//! 3. The scan always terminates: a decoder that fails to advance past the
//!    escape marker is overridden by a one-character step.
//! 4. Unknown escape codes are consumed silently and the literal text on
//!    either side merges into a single run; tokenization of the remainder
//!    of the string always continues.
//!
//! # Failure Modes
//!
//! - A trailing escape marker at end of input decodes to nothing and the
//!   scan ends.
//! - A malformed parameter (`[` without digits or closing bracket) is left
//!   in place and re-scanned as literal text.

use crate::message::{ColorId, Token};

/// The escape marker introducing a control sequence.
pub const ESCAPE: char = '\u{1b}';

/// A control code decoded from an escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeCode {
    /// Switch the active text color to a palette index.
    Color(u8),
    /// Draw an inline icon.
    Icon(u32),
    /// Grow the active font one step.
    FontGrow,
    /// Shrink the active font one step.
    FontShrink,
}

/// Result of decoding one escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedEscape {
    /// The recognized code, or `None` when the sequence is consumed but
    /// produces no token.
    pub code: Option<EscapeCode>,
    /// Byte offset just past the whole sequence; scanning resumes here.
    pub resume: usize,
}

/// Decodes one escape sequence starting at an ESC marker.
///
/// `escape_at` is the byte offset of the marker itself. Implementations
/// must return a `resume` offset past everything the sequence consumed,
/// marker included.
pub trait EscapeDecoder {
    /// Decode the escape sequence at `escape_at`.
    fn decode(&self, text: &str, escape_at: usize) -> DecodedEscape;
}

/// Symbols that form a complete one-character escape code.
const SYMBOL_CODES: &[char] = &['$', '.', '|', '^', '!', '>', '<', '{', '}', '\\'];

/// The stock escape grammar.
///
/// After the ESC marker, the code is either a single symbol from
/// `$ . | ^ ! > < { } \` or a run of ASCII uppercase letters, optionally
/// followed by a bracketed decimal parameter (`[12]`). Recognized codes:
/// `C[n]` (color), `I[n]` (icon), `{` (font grow), `}` (font shrink).
/// Everything else is consumed without emitting a token.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlCodeDecoder;

impl ControlCodeDecoder {
    /// Parse a leading `[digits]` parameter. Returns the value and the
    /// number of bytes consumed, or `None` when no well-formed parameter
    /// is present.
    fn parse_param(rest: &str) -> Option<(u32, usize)> {
        let after_bracket = rest.strip_prefix('[')?;
        let digits: usize = after_bracket
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits == 0 {
            return None;
        }
        let value: u32 = after_bracket[..digits].parse().ok()?;
        if after_bracket[digits..].starts_with(']') {
            // '[' + digits + ']'
            Some((value, digits + 2))
        } else {
            None
        }
    }
}

impl EscapeDecoder for ControlCodeDecoder {
    fn decode(&self, text: &str, escape_at: usize) -> DecodedEscape {
        let mut pos = escape_at + ESCAPE.len_utf8();
        let rest = &text[pos..];
        let Some(first) = rest.chars().next() else {
            return DecodedEscape { code: None, resume: pos };
        };

        if SYMBOL_CODES.contains(&first) {
            pos += first.len_utf8();
            let code = match first {
                '{' => Some(EscapeCode::FontGrow),
                '}' => Some(EscapeCode::FontShrink),
                _ => None,
            };
            return DecodedEscape { code, resume: pos };
        }

        if first.is_ascii_uppercase() {
            let letters = rest
                .bytes()
                .take_while(u8::is_ascii_uppercase)
                .count();
            let name = &rest[..letters];
            pos += letters;
            let param = Self::parse_param(&text[pos..]);
            if let Some((_, used)) = param {
                pos += used;
            }
            let code = match (name, param) {
                ("C", Some((n, _))) => Some(EscapeCode::Color(n.min(255) as u8)),
                ("I", Some((n, _))) => Some(EscapeCode::Icon(n)),
                _ => None,
            };
            return DecodedEscape { code, resume: pos };
        }

        // Not a code character at all; consume just the marker.
        DecodedEscape { code: None, resume: pos }
    }
}

/// Tokenize an annotated string into drawable commands.
///
/// Scans left to right. A newline flushes the pending literal run (when
/// non-empty) and emits [`Token::Newline`]; an ESC marker defers to the
/// decoder, and the pending run is flushed only when the decoder emits a
/// token. A dropped sequence leaves the run open, so the literals around
/// it merge into one [`Token::Run`]. Any trailing run is flushed at end
/// of input.
#[must_use]
pub fn tokenize(text: &str, decoder: &impl EscapeDecoder) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut run = String::new();
    let mut pos = 0;

    let flush = |run: &mut String, tokens: &mut Vec<Token>| {
        if !run.is_empty() {
            tokens.push(Token::Run(std::mem::take(run)));
        }
    };

    while pos < text.len() {
        let Some(c) = text[pos..].chars().next() else {
            break;
        };
        match c {
            '\n' => {
                flush(&mut run, &mut tokens);
                tokens.push(Token::Newline);
                pos += 1;
            }
            ESCAPE => {
                let decoded = decoder.decode(text, pos);
                if let Some(code) = decoded.code {
                    flush(&mut run, &mut tokens);
                    tokens.push(match code {
                        EscapeCode::Color(n) => Token::Color(ColorId(n)),
                        EscapeCode::Icon(n) => Token::Icon(n),
                        EscapeCode::FontGrow => Token::FontGrow,
                        EscapeCode::FontShrink => Token::FontShrink,
                    });
                }
                // Guarantee forward progress even against a decoder that
                // returns a stale cursor.
                pos = decoded.resume.max(pos + ESCAPE.len_utf8());
            }
            _ => {
                run.push(c);
                pos += c.len_utf8();
            }
        }
    }
    flush(&mut run, &mut tokens);
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(text: &str) -> Vec<Token> {
        tokenize(text, &ControlCodeDecoder)
    }

    #[test]
    fn plain_text_single_run() {
        assert_eq!(toks("hello world"), vec![Token::Run("hello world".into())]);
    }

    #[test]
    fn empty_input_no_tokens() {
        assert_eq!(toks(""), Vec::<Token>::new());
    }

    #[test]
    fn newline_splits_runs() {
        assert_eq!(
            toks("a\nb"),
            vec![
                Token::Run("a".into()),
                Token::Newline,
                Token::Run("b".into()),
            ]
        );
    }

    #[test]
    fn leading_and_double_newlines_emit_no_empty_runs() {
        assert_eq!(
            toks("\na\n\nb"),
            vec![
                Token::Newline,
                Token::Run("a".into()),
                Token::Newline,
                Token::Newline,
                Token::Run("b".into()),
            ]
        );
    }

    #[test]
    fn trailing_newline_no_trailing_run() {
        assert_eq!(toks("a\n"), vec![Token::Run("a".into()), Token::Newline]);
    }

    #[test]
    fn color_escape() {
        assert_eq!(
            toks("a\u{1b}C[3]b"),
            vec![
                Token::Run("a".into()),
                Token::Color(ColorId(3)),
                Token::Run("b".into()),
            ]
        );
    }

    #[test]
    fn icon_escape() {
        assert_eq!(
            toks("\u{1b}I[128]x"),
            vec![Token::Icon(128), Token::Run("x".into())]
        );
    }

    #[test]
    fn font_grow_and_shrink() {
        assert_eq!(
            toks("\u{1b}{big\u{1b}}small"),
            vec![
                Token::FontGrow,
                Token::Run("big".into()),
                Token::FontShrink,
                Token::Run("small".into()),
            ]
        );
    }

    #[test]
    fn unknown_letter_code_is_dropped_but_consumed() {
        // \x1bV[5] is a valid sequence shape but not a code this viewer
        // renders; the whole sequence vanishes.
        assert_eq!(toks("a\u{1b}V[5]b"), vec![Token::Run("ab".into())]);
    }

    #[test]
    fn unknown_symbol_code_is_dropped_but_consumed() {
        assert_eq!(toks("x\u{1b}$y"), vec![Token::Run("xy".into())]);
    }

    #[test]
    fn multi_letter_code_consumed() {
        assert_eq!(toks("a\u{1b}PX[2]b"), vec![Token::Run("ab".into())]);
    }

    #[test]
    fn color_without_param_is_dropped() {
        assert_eq!(toks("a\u{1b}Cb"), vec![Token::Run("ab".into())]);
    }

    #[test]
    fn malformed_param_rescanned_as_text() {
        // "[3" has no closing bracket; the code is consumed, the bracket
        // fragment stays literal.
        assert_eq!(toks("\u{1b}C[3x"), vec![Token::Run("[3x".into())]);
    }

    #[test]
    fn trailing_escape_marker() {
        assert_eq!(toks("ab\u{1b}"), vec![Token::Run("ab".into())]);
    }

    #[test]
    fn escape_then_newline_ordering() {
        assert_eq!(
            toks("\u{1b}C[1]a\nb"),
            vec![
                Token::Color(ColorId(1)),
                Token::Run("a".into()),
                Token::Newline,
                Token::Run("b".into()),
            ]
        );
    }

    #[test]
    fn color_param_saturates_to_u8() {
        assert_eq!(toks("\u{1b}C[999]"), vec![Token::Color(ColorId(255))]);
    }

    #[test]
    fn unicode_text_preserved() {
        assert_eq!(
            toks("こんにちは\nworld"),
            vec![
                Token::Run("こんにちは".into()),
                Token::Newline,
                Token::Run("world".into()),
            ]
        );
    }

    #[test]
    fn stuck_decoder_still_terminates() {
        struct Stuck;
        impl EscapeDecoder for Stuck {
            fn decode(&self, _text: &str, escape_at: usize) -> DecodedEscape {
                DecodedEscape {
                    code: None,
                    resume: escape_at, // refuses to advance
                }
            }
        }
        // Must not loop forever; the marker is skipped one char at a time.
        // No token is emitted, so the surrounding literals stay one run.
        assert_eq!(tokenize("a\u{1b}b", &Stuck), vec![Token::Run("ab".into())]);
    }

    #[test]
    fn dropped_escapes_merge_surrounding_runs() {
        // Several dropped sequences in a row still leave one run; a
        // recognized code in between splits as usual.
        assert_eq!(
            toks("a\u{1b}$b\u{1b}V[1]c\u{1b}C[2]d"),
            vec![Token::Run("abc".into()), Token::Color(ColorId(2)), Token::Run("d".into())]
        );
    }

    #[test]
    fn decoder_param_parsing() {
        assert_eq!(ControlCodeDecoder::parse_param("[12]x"), Some((12, 4)));
        assert_eq!(ControlCodeDecoder::parse_param("[0]"), Some((0, 3)));
        assert_eq!(ControlCodeDecoder::parse_param("[]"), None);
        assert_eq!(ControlCodeDecoder::parse_param("[12"), None);
        assert_eq!(ControlCodeDecoder::parse_param("12]"), None);
        assert_eq!(ControlCodeDecoder::parse_param(""), None);
    }
}
