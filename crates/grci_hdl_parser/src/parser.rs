//! Core parser infrastructure and top-level GRCI HDL parsing rules.
//!
//! The [`HdlParser`] struct provides primitive operations (advance, expect,
//! eat) over the token stream, while top-level methods parse source files,
//! module declarations, parameter lists, and module bodies. The pipeline
//! reports the first error encountered and stops: parsing methods return
//! `None` once a diagnostic has been emitted, and the file loop bails out.

use crate::ast::*;
use crate::token::{HdlToken, Token};
use grci_common::{Ident, Interner, SourceId, Span};
use grci_diagnostics::code::{Category, DiagnosticCode};
use grci_diagnostics::{Diagnostic, DiagnosticSink};

/// A recursive descent parser for GRCI HDL source text.
///
/// The parser consumes a token stream produced by the lexer and builds an
/// [`HdlSourceFile`] AST. It keeps two tokens of context (current and next)
/// to distinguish part instantiations from wire statements.
pub struct HdlParser<'src> {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    pub(crate) source: &'src str,
    #[allow(dead_code)]
    source_id: SourceId,
    pub(crate) interner: &'src Interner,
    pub(crate) sink: &'src DiagnosticSink,
}

impl<'src> HdlParser<'src> {
    /// Creates a new parser from a token stream produced by the lexer.
    ///
    /// The `tokens` must have been lexed from `source` under `source_id`.
    /// Identifiers are interned via `interner`, and parse errors are emitted
    /// to `sink`.
    pub fn new(
        tokens: Vec<Token>,
        source: &'src str,
        source_id: SourceId,
        interner: &'src Interner,
        sink: &'src DiagnosticSink,
    ) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
            source_id,
            interner,
            sink,
        }
    }

    // ========================================================================
    // Primitive operations
    // ========================================================================

    /// Returns the kind of the current token.
    pub(crate) fn current(&self) -> HdlToken {
        self.tokens[self.pos].kind
    }

    /// Returns the span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    /// Returns the source text of the current token.
    pub(crate) fn current_text(&self) -> &'src str {
        let span = self.current_span();
        &self.source[span.start as usize..span.end as usize]
    }

    /// Returns `true` if the current token matches the given kind.
    pub(crate) fn at(&self, kind: HdlToken) -> bool {
        self.current() == kind
    }

    /// Returns `true` if the parser is at end of file.
    pub(crate) fn at_eof(&self) -> bool {
        self.current() == HdlToken::Eof
    }

    /// Returns the span of the previous token.
    pub(crate) fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            self.current_span()
        }
    }

    /// Advances past the current token.
    pub(crate) fn advance(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    /// Consumes the current token if it matches the given kind. Returns `true` if consumed.
    pub(crate) fn eat(&mut self, kind: HdlToken) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects the current token to match the given kind.
    ///
    /// Returns `None` (after emitting a diagnostic) if it does not.
    pub(crate) fn expect(&mut self, kind: HdlToken, what: &str) -> Option<()> {
        if self.eat(kind) {
            Some(())
        } else {
            self.expected(what);
            None
        }
    }

    /// Expects and returns an identifier, interning its text.
    pub(crate) fn expect_ident(&mut self) -> Option<Ident> {
        if self.at(HdlToken::Identifier) {
            let ident = self.interner.get_or_intern(self.current_text());
            self.advance();
            Some(ident)
        } else if self.current().is_keyword() {
            self.error(&format!(
                "'{}' is a reserved keyword",
                self.current_text()
            ));
            None
        } else {
            self.expected("identifier");
            None
        }
    }

    /// Returns the kind of the token at pos+offset.
    pub(crate) fn peek_kind(&self, offset: usize) -> HdlToken {
        let idx = self.pos + offset;
        if idx < self.tokens.len() {
            self.tokens[idx].kind
        } else {
            HdlToken::Eof
        }
    }

    // ========================================================================
    // Error reporting
    // ========================================================================

    /// Emits an error diagnostic at the current position.
    pub(crate) fn error(&self, msg: &str) {
        self.error_at(msg, self.current_span());
    }

    /// Emits an error diagnostic at the given span.
    pub(crate) fn error_at(&self, msg: &str, span: Span) {
        self.sink.emit(Diagnostic::error(
            DiagnosticCode::new(Category::Error, 101),
            msg,
            span,
        ));
    }

    /// Emits an "expected X" error at the current position.
    pub(crate) fn expected(&self, what: &str) {
        let found = match self.current() {
            HdlToken::Eof => "end of input".to_string(),
            _ => format!("'{}'", self.current_text()),
        };
        self.error(&format!("expected {what}, found {found}"));
    }

    // ========================================================================
    // Top-level parsing
    // ========================================================================

    /// Parses a complete HDL source file.
    ///
    /// Stops at the first error; the returned file contains the modules
    /// parsed before the failure.
    pub fn parse_source_file(&mut self) -> HdlSourceFile {
        let start = self.current_span();
        let mut modules = Vec::new();

        while !self.at_eof() {
            if !self.at(HdlToken::Module) {
                self.expected("'module'");
                break;
            }
            match self.parse_module() {
                Some(module) => modules.push(module),
                None => break,
            }
        }

        let span = if modules.is_empty() {
            start
        } else {
            start.join(self.prev_span())
        };

        HdlSourceFile { modules, span }
    }

    /// Parses a module declaration:
    /// `'module' IDENT '(' params ')' '->' outputs '{' body '}'`.
    fn parse_module(&mut self) -> Option<ModuleDecl> {
        let start = self.current_span();
        self.expect(HdlToken::Module, "'module'")?;
        let name = self.expect_ident()?;

        self.expect(HdlToken::LeftParen, "'('")?;
        let params = if self.at(HdlToken::RightParen) {
            Vec::new()
        } else {
            self.parse_param_list()?
        };
        self.expect(HdlToken::RightParen, "')'")?;

        self.expect(HdlToken::Arrow, "'->'")?;
        let outputs = self.parse_param_list()?;

        self.expect(HdlToken::LeftBrace, "'{'")?;
        let body = self.parse_body()?;
        self.expect(HdlToken::RightBrace, "'}'")?;

        let span = start.join(self.prev_span());
        Some(ModuleDecl {
            name,
            params,
            outputs,
            body,
            span,
        })
    }

    /// Parses a comma-separated, non-empty parameter list.
    fn parse_param_list(&mut self) -> Option<Vec<ParamDecl>> {
        let mut params = vec![self.parse_param()?];
        while self.eat(HdlToken::Comma) {
            params.push(self.parse_param()?);
        }
        Some(params)
    }

    /// Parses one parameter declaration: `IDENT` or `IDENT '[' INT ']'`.
    ///
    /// On a declaration the slice is the bus-width form: `a[8]` declares an
    /// 8-bit bus. The range form is not legal here.
    fn parse_param(&mut self) -> Option<ParamDecl> {
        let start = self.current_span();
        let name = self.expect_ident()?;

        let width = if self.eat(HdlToken::LeftBracket) {
            let width_span = self.current_span();
            let width = self.expect_int()?;
            if self.at(HdlToken::DotDot) {
                self.error("a range slice is not allowed in a parameter declaration");
                return None;
            }
            self.expect(HdlToken::RightBracket, "']'")?;
            if width == 0 {
                self.error_at("bus width must be at least 1", width_span);
                return None;
            }
            if width > u32::MAX as u64 {
                self.error_at("bus width is out of range", width_span);
                return None;
            }
            Some(width as u32)
        } else {
            None
        };

        let span = start.join(self.prev_span());
        Some(ParamDecl { name, width, span })
    }

    /// Parses body items until the closing `}`.
    fn parse_body(&mut self) -> Option<Vec<BodyItem>> {
        let mut items = Vec::new();
        while !self.at(HdlToken::RightBrace) {
            if self.at_eof() {
                self.expected("'}'");
                return None;
            }
            items.push(self.parse_body_item()?);
        }
        Some(items)
    }

    /// Parses one part or wire statement.
    ///
    /// A part starts with `IDENT ':'` (named) or `IDENT '('` (anonymous);
    /// anything else is a wire.
    fn parse_body_item(&mut self) -> Option<BodyItem> {
        if self.at(HdlToken::Identifier) && self.peek_kind(1) == HdlToken::Colon {
            let instance_name = self.expect_ident()?;
            self.expect(HdlToken::Colon, "':'")?;
            return self.parse_part(Some(instance_name)).map(BodyItem::Part);
        }
        if self.at(HdlToken::Identifier) && self.peek_kind(1) == HdlToken::LeftParen {
            return self.parse_part(None).map(BodyItem::Part);
        }
        self.parse_wire().map(BodyItem::Wire)
    }

    /// Parses a part instantiation after any `name:` prefix:
    /// `IDENT '(' exprs? ')' '->' bindings`.
    fn parse_part(&mut self, instance_name: Option<Ident>) -> Option<PartStmt> {
        let start = self.current_span();
        let callee = self.expect_ident()?;

        self.expect(HdlToken::LeftParen, "'('")?;
        let args = if self.at(HdlToken::RightParen) {
            Vec::new()
        } else {
            self.parse_expr_list()?
        };
        self.expect(HdlToken::RightParen, "')'")?;

        self.expect(HdlToken::Arrow, "'->'")?;
        let bindings = self.parse_bind_list()?;

        let span = start.join(self.prev_span());
        Some(PartStmt {
            instance_name,
            callee,
            args,
            bindings,
            span,
        })
    }

    /// Parses a wire statement: `(expr | '{' exprs '}') '->' target`.
    ///
    /// A leading aggregation contributes its parts as the wire's sources;
    /// any other expression is the sole source.
    fn parse_wire(&mut self) -> Option<WireStmt> {
        let start = self.current_span();
        let head = self.parse_expr()?;
        let sources = match head {
            Expr::Concat { parts, .. } => parts,
            other => vec![other],
        };

        self.expect(HdlToken::Arrow, "'->'")?;
        let target = self.parse_bind_target()?;

        let span = start.join(self.prev_span());
        Some(WireStmt {
            sources,
            target,
            span,
        })
    }
}
