//! Expression, slice, and binding-target parsing for the GRCI HDL parser.

use crate::ast::{BindTarget, Expr, Slice};
use crate::parser::HdlParser;
use crate::token::HdlToken;

impl HdlParser<'_> {
    /// Expects and returns a plain integer literal value.
    pub(crate) fn expect_int(&mut self) -> Option<u64> {
        if self.at(HdlToken::IntLiteral) {
            let text = self.current_text();
            match text.parse::<u64>() {
                Ok(value) => {
                    self.advance();
                    Some(value)
                }
                Err(_) => {
                    self.error("integer literal is too large");
                    None
                }
            }
        } else {
            self.expected("integer");
            None
        }
    }

    /// Parses a comma-separated, non-empty expression list.
    pub(crate) fn parse_expr_list(&mut self) -> Option<Vec<Expr>> {
        let mut exprs = vec![self.parse_expr()?];
        while self.eat(HdlToken::Comma) {
            exprs.push(self.parse_expr()?);
        }
        Some(exprs)
    }

    /// Parses one expression: `(IDENT | INT) slice?` or `'{' exprs '}'`.
    pub(crate) fn parse_expr(&mut self) -> Option<Expr> {
        let start = self.current_span();

        if self.eat(HdlToken::LeftBrace) {
            let parts = self.parse_expr_list()?;
            self.expect(HdlToken::RightBrace, "'}'")?;
            return Some(Expr::Concat {
                parts,
                span: start.join(self.prev_span()),
            });
        }

        if self.at(HdlToken::Identifier) {
            let name = self.expect_ident()?;
            let slice = self.parse_slice_opt()?;
            return Some(Expr::Ref {
                name,
                slice,
                span: start.join(self.prev_span()),
            });
        }

        if self.current().is_literal() {
            let value = self.literal_value()?;
            if self.at(HdlToken::LeftBracket) {
                self.error("a literal cannot be sliced");
                return None;
            }
            return Some(Expr::Literal {
                value,
                span: start.join(self.prev_span()),
            });
        }

        if self.current().is_keyword() {
            self.error(&format!("'{}' is a reserved keyword", self.current_text()));
            return None;
        }

        self.expected("expression");
        None
    }

    /// Parses the value of the current literal token, honoring the `0b`/`0w`
    /// prefixes and their byte/word ranges.
    fn literal_value(&mut self) -> Option<u64> {
        let kind = self.current();
        let text = self.current_text();
        let (digits, max, what) = match kind {
            HdlToken::ByteLiteral => (&text[2..], 0xFFu64, "byte"),
            HdlToken::WordLiteral => (&text[2..], 0xFFFFu64, "word"),
            _ => (text, u64::MAX, "integer"),
        };
        match digits.parse::<u64>() {
            Ok(value) if value <= max => {
                self.advance();
                Some(value)
            }
            _ => {
                self.error(&format!("{what} literal is out of range"));
                None
            }
        }
    }

    /// Parses an optional slice: `'[' INT ('..' INT)? ']'`.
    ///
    /// `[n]` selects bit n; `[n..m]` selects bits n..=m and requires m ≥ n.
    pub(crate) fn parse_slice_opt(&mut self) -> Option<Option<Slice>> {
        if !self.at(HdlToken::LeftBracket) {
            return Some(None);
        }
        let open = self.current_span();
        self.advance();

        let start = self.expect_int()?;
        let end = if self.eat(HdlToken::DotDot) {
            self.expect_int()?
        } else {
            start
        };
        self.expect(HdlToken::RightBracket, "']'")?;
        let span = open.join(self.prev_span());

        if end < start {
            self.error_at(
                &format!("slice end {end} is less than its start {start}"),
                span,
            );
            return None;
        }
        if end >= u32::MAX as u64 {
            self.error_at("slice index is out of range", span);
            return None;
        }

        Some(Some(Slice {
            start: start as u32,
            end: end as u32,
            span,
        }))
    }

    /// Parses a comma-separated, non-empty binding list (part outputs).
    pub(crate) fn parse_bind_list(&mut self) -> Option<Vec<BindTarget>> {
        let mut targets = vec![self.parse_bind_target()?];
        while self.eat(HdlToken::Comma) {
            targets.push(self.parse_bind_target()?);
        }
        Some(targets)
    }

    /// Parses one binding target: `IDENT slice?`.
    ///
    /// Binding positions name a fresh symbol or drive a declared output;
    /// aggregations and literals cannot be bound into.
    pub(crate) fn parse_bind_target(&mut self) -> Option<BindTarget> {
        if self.at(HdlToken::LeftBrace) {
            self.error("cannot bind into an aggregation");
            return None;
        }
        if self.current().is_literal() {
            self.error("cannot bind into a literal");
            return None;
        }

        let start = self.current_span();
        let name = self.expect_ident()?;
        let slice = self.parse_slice_opt()?;
        Some(BindTarget {
            name,
            slice,
            span: start.join(self.prev_span()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BodyItem, HdlSourceFile};
    use crate::lexer::lex;
    use grci_common::Interner;
    use grci_diagnostics::{Diagnostic, DiagnosticSink};
    use grci_common::SourceId;

    fn parse(source: &str) -> (HdlSourceFile, Vec<Diagnostic>) {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let source_id = SourceId::from_raw(0);
        let tokens = lex(source, source_id, &sink);
        let mut parser = HdlParser::new(tokens, source, source_id, &interner, &sink);
        let ast = parser.parse_source_file();
        (ast, sink.take_all())
    }

    fn first_part(source: &str) -> crate::ast::PartStmt {
        let (ast, diags) = parse(source);
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
        let BodyItem::Part(part) = &ast.modules[0].body[0] else {
            panic!("expected part");
        };
        part.clone()
    }

    fn first_error(source: &str) -> String {
        let (_, diags) = parse(source);
        diags
            .iter()
            .find(|d| d.severity.is_error())
            .expect("expected an error")
            .message
            .clone()
    }

    #[test]
    fn single_bit_slice() {
        let part = first_part("module A(a[8]) -> out { Not(a[3]) -> out }");
        let Expr::Ref { slice, .. } = &part.args[0] else {
            panic!("expected ref");
        };
        let slice = slice.expect("expected slice");
        assert_eq!(slice.start, 3);
        assert_eq!(slice.end, 3);
        assert_eq!(slice.width(), 1);
    }

    #[test]
    fn range_slice() {
        let part = first_part("module B(a[8]) -> out[4] { Pass4(a[2..5]) -> out }");
        let Expr::Ref { slice, .. } = &part.args[0] else {
            panic!("expected ref");
        };
        let slice = slice.expect("expected slice");
        assert_eq!(slice.start, 2);
        assert_eq!(slice.end, 5);
        assert_eq!(slice.width(), 4);
    }

    #[test]
    fn equal_bounds_range() {
        let part = first_part("module C(a[8]) -> out { Not(a[4..4]) -> out }");
        let Expr::Ref { slice, .. } = &part.args[0] else {
            panic!("expected ref");
        };
        assert_eq!(slice.unwrap().width(), 1);
    }

    #[test]
    fn concat_flattens_in_order() {
        let part = first_part("module D(a, b[2], c) -> out { Take4({a, b, c}) -> out }");
        let Expr::Concat { parts, .. } = &part.args[0] else {
            panic!("expected concat");
        };
        assert_eq!(parts.len(), 3);
    }

    #[test]
    fn nested_concat() {
        let part = first_part("module E(a, b) -> out { Take2({{a}, b}) -> out }");
        let Expr::Concat { parts, .. } = &part.args[0] else {
            panic!("expected concat");
        };
        assert!(matches!(parts[0], Expr::Concat { .. }));
    }

    #[test]
    fn literal_values() {
        let part = first_part("module F(a) -> out { Mux(a, 1, 0) -> out }");
        assert!(matches!(part.args[1], Expr::Literal { value: 1, .. }));
        assert!(matches!(part.args[2], Expr::Literal { value: 0, .. }));
    }

    #[test]
    fn byte_literal_value() {
        let part = first_part("module G() -> out { Feed(0b200) -> out }");
        assert!(matches!(part.args[0], Expr::Literal { value: 200, .. }));
    }

    #[test]
    fn word_literal_value() {
        let part = first_part("module H() -> out { Feed(0w4111) -> out }");
        assert!(matches!(part.args[0], Expr::Literal { value: 4111, .. }));
    }

    #[test]
    fn byte_literal_out_of_range() {
        let msg = first_error("module I() -> out { Feed(0b256) -> out }");
        assert!(msg.contains("byte literal"), "got: {msg}");
    }

    #[test]
    fn word_literal_out_of_range() {
        let msg = first_error("module J() -> out { Feed(0w65536) -> out }");
        assert!(msg.contains("word literal"), "got: {msg}");
    }

    #[test]
    fn sliced_literal_is_error() {
        let msg = first_error("module K(a) -> out { Nand(a, 1[0]) -> out }");
        assert!(msg.contains("literal cannot be sliced"), "got: {msg}");
    }

    #[test]
    fn reversed_slice_reports_bounds() {
        let msg = first_error("module L(a[8]) -> out { Not(a[5..2]) -> out }");
        assert!(msg.contains("5"), "got: {msg}");
        assert!(msg.contains("2"), "got: {msg}");
    }

    #[test]
    fn binding_literal_is_error() {
        let msg = first_error("module M(a) -> out { Nand(a, a) -> 1 }");
        assert!(msg.contains("bind into a literal"), "got: {msg}");
    }

    #[test]
    fn empty_aggregation_is_error() {
        let msg = first_error("module N() -> out { Feed({}) -> out }");
        assert!(msg.contains("expected expression"), "got: {msg}");
    }
}
