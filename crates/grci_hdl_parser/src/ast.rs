//! AST node types for the GRCI HDL parser.
//!
//! Every AST node carries a [`Span`] for source location tracking. The AST is
//! symbolic: identifiers are interned, widths are not yet known, and `{…}`
//! aggregations are kept as first-class [`Expr::Concat`] nodes whose
//! elaboration contract (expansion into an ordered list of source bits) is
//! handled downstream.

use grci_common::{Ident, Span};
use serde::{Deserialize, Serialize};

/// A complete HDL source file: zero or more module declarations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HdlSourceFile {
    /// The module declarations in this file, in declaration order.
    pub modules: Vec<ModuleDecl>,
    /// The span covering the entire file.
    pub span: Span,
}

/// A module declaration: name, input parameters, outputs, and a body of
/// parts and wires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDecl {
    /// The module name.
    pub name: Ident,
    /// Input parameters, in declaration order.
    pub params: Vec<ParamDecl>,
    /// Output parameters, in declaration order (at least one).
    pub outputs: Vec<ParamDecl>,
    /// Body items (parts and wires), in declaration order.
    pub body: Vec<BodyItem>,
    /// Source span of the whole declaration.
    pub span: Span,
}

/// An input or output parameter declaration.
///
/// A trailing `[n]` on a declaration means "bus of width n", unlike in
/// expressions where it selects bit n.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDecl {
    /// The parameter name.
    pub name: Ident,
    /// Declared bus width; `None` means a single bit.
    pub width: Option<u32>,
    /// Source span.
    pub span: Span,
}

impl ParamDecl {
    /// The parameter's bit width (1 for a plain single-bit parameter).
    pub fn bit_width(&self) -> u32 {
        self.width.unwrap_or(1)
    }
}

/// A statement in a module body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BodyItem {
    /// A part instantiation: `name: Callee(args) -> bindings`.
    Part(PartStmt),
    /// A wire: `source -> target` or `{sources} -> target`.
    Wire(WireStmt),
}

impl BodyItem {
    /// The source span of this item.
    pub fn span(&self) -> Span {
        match self {
            BodyItem::Part(p) => p.span,
            BodyItem::Wire(w) => w.span,
        }
    }
}

/// A part instantiation.
///
/// Instantiates a previously declared module. The argument list supplies the
/// callee's input parameters in order; the binding list names the callee's
/// outputs in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartStmt {
    /// The optional instance name (`name:` prefix), used for state snapshots.
    pub instance_name: Option<Ident>,
    /// The name of the instantiated module.
    pub callee: Ident,
    /// One expression per callee input parameter.
    pub args: Vec<Expr>,
    /// One binding per callee output parameter.
    pub bindings: Vec<BindTarget>,
    /// Source span.
    pub span: Span,
}

/// A wire statement: aggregates one or more source expressions into a bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireStmt {
    /// The source expressions, concatenated in order (bit 0 first).
    pub sources: Vec<Expr>,
    /// The binding target the aggregated bus drives.
    pub target: BindTarget,
    /// Source span.
    pub span: Span,
}

/// A binding position: a fresh internal symbol, or a declared module output
/// (optionally sliced) to drive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindTarget {
    /// The bound name.
    pub name: Ident,
    /// Optional slice, only legal when the name is a declared output.
    pub slice: Option<Slice>,
    /// Source span.
    pub span: Span,
}

/// An expression in argument or wire-source position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    /// A reference to a parameter, part output, or wire, optionally sliced.
    Ref {
        /// The referenced name.
        name: Ident,
        /// Optional bit or range selection.
        slice: Option<Slice>,
        /// Source span.
        span: Span,
    },
    /// An integer literal. Only 0 and 1 are legal in wiring positions.
    Literal {
        /// The literal value.
        value: u64,
        /// Source span.
        span: Span,
    },
    /// A `{a, b, c}` aggregation, concatenating its parts bit 0 first.
    Concat {
        /// The aggregated expressions, in order.
        parts: Vec<Expr>,
        /// Source span.
        span: Span,
    },
}

impl Expr {
    /// The source span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Ref { span, .. } | Expr::Literal { span, .. } | Expr::Concat { span, .. } => {
                *span
            }
        }
    }
}

/// A bit or range selection: `[n]` selects bit n, `[n..m]` selects bits
/// n..=m. `m >= n` is enforced when the slice is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slice {
    /// First selected bit (inclusive).
    pub start: u32,
    /// Last selected bit (inclusive).
    pub end: u32,
    /// Source span.
    pub span: Span,
}

impl Slice {
    /// The number of bits this slice selects.
    pub fn width(&self) -> u32 {
        self.end - self.start + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_bit_width() {
        let single = ParamDecl {
            name: Ident::from_raw(0),
            width: None,
            span: Span::SYNTHETIC,
        };
        assert_eq!(single.bit_width(), 1);

        let bus = ParamDecl {
            name: Ident::from_raw(0),
            width: Some(8),
            span: Span::SYNTHETIC,
        };
        assert_eq!(bus.bit_width(), 8);
    }

    #[test]
    fn slice_width() {
        let bit = Slice {
            start: 3,
            end: 3,
            span: Span::SYNTHETIC,
        };
        assert_eq!(bit.width(), 1);

        let range = Slice {
            start: 2,
            end: 5,
            span: Span::SYNTHETIC,
        };
        assert_eq!(range.width(), 4);
    }

    #[test]
    fn expr_span() {
        let f = grci_common::SourceId::from_raw(0);
        let e = Expr::Literal {
            value: 1,
            span: Span::new(f, 3, 4),
        };
        assert_eq!(e.span().start, 3);
    }

    #[test]
    fn serde_roundtrip() {
        let decl = ModuleDecl {
            name: Ident::from_raw(1),
            params: vec![ParamDecl {
                name: Ident::from_raw(2),
                width: Some(8),
                span: Span::SYNTHETIC,
            }],
            outputs: vec![ParamDecl {
                name: Ident::from_raw(3),
                width: None,
                span: Span::SYNTHETIC,
            }],
            body: vec![],
            span: Span::SYNTHETIC,
        };
        let json = serde_json::to_string(&decl).unwrap();
        let back: ModuleDecl = serde_json::from_str(&json).unwrap();
        assert_eq!(back.params[0].width, Some(8));
        assert_eq!(back.outputs.len(), 1);
    }
}
