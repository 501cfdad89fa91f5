//! Lexical analyzer for GRCI HDL source text.
//!
//! Converts source text into a sequence of [`Token`]s in a single pass,
//! handling `//` line comments, `/* */` block comments, the structural symbol
//! set, the `0b`/`0w` literal prefixes, and maximal-run identifiers. Errors
//! are reported to the [`DiagnosticSink`] and produce [`HdlToken::Error`]
//! tokens.

use crate::token::{lookup_keyword, HdlToken, Token};
use grci_diagnostics::code::{Category, DiagnosticCode};
use grci_diagnostics::{Diagnostic, DiagnosticSink};
use grci_common::{SourceId, Span};

/// Lexes the given HDL source text into a vector of tokens.
///
/// Whitespace and comments are skipped. The returned vector always ends with
/// an [`HdlToken::Eof`] token. Lexer errors are reported via the diagnostic
/// sink and produce [`HdlToken::Error`] tokens in the output.
pub fn lex(source: &str, source_id: SourceId, sink: &DiagnosticSink) -> Vec<Token> {
    let mut lexer = Lexer {
        source: source.as_bytes(),
        pos: 0,
        source_id,
        sink,
    };
    lexer.lex_all()
}

struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    source_id: SourceId,
    sink: &'a DiagnosticSink,
}

impl Lexer<'_> {
    fn lex_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            if self.pos >= self.source.len() {
                tokens.push(Token {
                    kind: HdlToken::Eof,
                    span: Span::new(self.source_id, self.pos as u32, self.pos as u32),
                });
                break;
            }
            tokens.push(self.next_token());
        }
        tokens
    }

    fn peek(&self) -> u8 {
        if self.pos < self.source.len() {
            self.source[self.pos]
        } else {
            0
        }
    }

    fn peek_at(&self, offset: usize) -> u8 {
        let idx = self.pos + offset;
        if idx < self.source.len() {
            self.source[idx]
        } else {
            0
        }
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(self.source_id, start as u32, self.pos as u32)
    }

    fn error(&self, msg: &str, span: Span) {
        self.sink.emit(Diagnostic::error(
            DiagnosticCode::new(Category::Error, 100),
            msg,
            span,
        ));
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            // Skip whitespace (LF-terminated lines; CR is whitespace too)
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.pos >= self.source.len() {
                return;
            }
            // Line comment: //
            if self.peek() == b'/' && self.peek_at(1) == b'/' {
                self.pos += 2;
                while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }
            // Block comment: /* ... */ (non-nesting)
            if self.peek() == b'/' && self.peek_at(1) == b'*' {
                let start = self.pos;
                self.pos += 2;
                loop {
                    if self.pos >= self.source.len() {
                        self.error("unterminated block comment", self.span_from(start));
                        break;
                    }
                    if self.source[self.pos] == b'*' && self.peek_at(1) == b'/' {
                        self.pos += 2;
                        break;
                    }
                    self.pos += 1;
                }
                continue;
            }
            break;
        }
    }

    fn next_token(&mut self) -> Token {
        let start = self.pos;
        let b = self.peek();

        // Numeric literals, including the 0b/0w prefixed forms
        if b.is_ascii_digit() {
            return self.lex_number(start);
        }

        // Structural symbols, fusing `->` and `..` for the parser
        if let Some(tok) = self.lex_symbol(start) {
            return tok;
        }

        // Everything else starts an identifier: a maximal run of
        // non-delimiter characters
        self.lex_identifier_or_keyword(start)
    }

    fn lex_symbol(&mut self, start: usize) -> Option<Token> {
        let kind = match self.peek() {
            b'{' => HdlToken::LeftBrace,
            b'}' => HdlToken::RightBrace,
            b'(' => HdlToken::LeftParen,
            b')' => HdlToken::RightParen,
            b'[' => HdlToken::LeftBracket,
            b']' => HdlToken::RightBracket,
            b',' => HdlToken::Comma,
            b':' => HdlToken::Colon,
            b'>' => HdlToken::Greater,
            b'-' => {
                if self.peek_at(1) == b'>' {
                    self.pos += 2;
                    return Some(Token {
                        kind: HdlToken::Arrow,
                        span: self.span_from(start),
                    });
                }
                HdlToken::Minus
            }
            b'.' => {
                if self.peek_at(1) == b'.' {
                    self.pos += 2;
                    return Some(Token {
                        kind: HdlToken::DotDot,
                        span: self.span_from(start),
                    });
                }
                HdlToken::Dot
            }
            b'/' => {
                // A bare slash is not part of any token; comments were
                // handled before dispatch.
                self.pos += 1;
                self.error("unexpected character '/'", self.span_from(start));
                return Some(Token {
                    kind: HdlToken::Error,
                    span: self.span_from(start),
                });
            }
            _ => return None,
        };
        self.pos += 1;
        Some(Token {
            kind,
            span: self.span_from(start),
        })
    }

    fn lex_number(&mut self, start: usize) -> Token {
        // 0b / 0w prefixes select the byte and word literal flavors
        if self.peek() == b'0'
            && matches!(self.peek_at(1), b'b' | b'w')
            && self.peek_at(2).is_ascii_digit()
        {
            let kind = if self.peek_at(1) == b'b' {
                HdlToken::ByteLiteral
            } else {
                HdlToken::WordLiteral
            };
            self.pos += 2;
            self.eat_digits();
            return Token {
                kind,
                span: self.span_from(start),
            };
        }

        self.eat_digits();
        Token {
            kind: HdlToken::IntLiteral,
            span: self.span_from(start),
        }
    }

    fn eat_digits(&mut self) {
        while self.pos < self.source.len() && self.source[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
    }

    fn lex_identifier_or_keyword(&mut self, start: usize) -> Token {
        while self.pos < self.source.len() && !is_delimiter(self.source[self.pos]) {
            self.pos += 1;
        }

        let Ok(text) = std::str::from_utf8(&self.source[start..self.pos]) else {
            // Source text is ASCII; anything else cannot name a symbol.
            self.error("source is not ASCII", self.span_from(start));
            return Token {
                kind: HdlToken::Error,
                span: self.span_from(start),
            };
        };

        let kind = lookup_keyword(text).unwrap_or(HdlToken::Identifier);
        Token {
            kind,
            span: self.span_from(start),
        }
    }
}

/// Returns `true` for bytes that terminate an identifier: whitespace, the
/// structural symbol set, and the comment-introducing slash.
fn is_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace()
        || matches!(
            b,
            b'{' | b'}' | b'(' | b')' | b'[' | b']' | b',' | b'.' | b'-' | b'>' | b':' | b'/'
        )
}
