//! Analyzed expression nodes
//!
//! The closed union of node kinds the analyzer can produce, one variant
//! per form shape, plus the base annotations the code generator relies
//! on: evaluation context, boxing requirement, and the frame the node was
//! analyzed in. Nodes are built once during analysis and never mutated
//! after their constructing handler returns them.

use crate::analyze::frame::{BindingId, FrameId};
use crate::form::{Form, Span};
use crate::ns::VarId;
use crate::symbol::SymbolId;
use smallvec::SmallVec;
use std::rc::Rc;

/// Where a node's value flows.
///
/// `Statement` positions discard the value; `ReturnStatement` marks
/// exactly the terminal form of a function body. Everything else is
/// `Expression`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalContext {
    Expression,
    Statement,
    ReturnStatement,
}

impl EvalContext {
    /// True for both statement-like contexts
    pub fn is_statement(self) -> bool {
        self != EvalContext::Expression
    }
}

/// A primitive literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Keyword(SymbolId),
    EmptyList,
}

impl Literal {
    /// Scalar literals have a native unboxed representation; strings,
    /// keywords, and the empty list are heap objects regardless.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Literal::Nil | Literal::Bool(_) | Literal::Int(_) | Literal::Float(_)
        )
    }
}

/// One arity of a `fn`: parameters bound in a fresh function frame, a
/// body ending in a `ReturnStatement` node, and a variadic flag.
#[derive(Debug, Clone)]
pub struct FnArity {
    pub frame: FrameId,
    pub params: Vec<BindingId>,
    pub variadic: bool,
    pub body: Vec<Expr>,
}

impl FnArity {
    /// The argument count this arity accepts exactly, or the minimum it
    /// requires when variadic.
    pub fn required(&self) -> usize {
        if self.variadic {
            self.params.len() - 1
        } else {
            self.params.len()
        }
    }

    /// Whether a call with `argc` arguments lands on this arity.
    pub fn accepts(&self, argc: usize) -> bool {
        if self.variadic {
            argc >= self.required()
        } else {
            argc == self.params.len()
        }
    }
}

/// A `catch` clause: the caught value bound in a fresh catch frame.
#[derive(Debug, Clone)]
pub struct CatchClause {
    pub frame: FrameId,
    pub binding: BindingId,
    pub body: Vec<Expr>,
}

/// A single `let` binding with its analyzed init.
#[derive(Debug, Clone)]
pub struct LetBinding {
    pub binding: BindingId,
    pub init: Expr,
}

/// An analyzed expression node.
///
/// `needs_box` defaults to true: a value is heap-boxed unless the
/// analyzer proved its producer and every consumer agree on a native
/// representation. `frame` is a non-owning back-reference into the
/// [`Frames`](crate::analyze::frame::Frames) arena.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub ctx: EvalContext,
    pub needs_box: bool,
    pub frame: FrameId,
    pub span: Span,
}

/// The closed set of node kinds.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Global binding. The var is forward-declared before the init is
    /// analyzed, so self-referential definitions resolve.
    Def {
        name: SymbolId,
        var: VarId,
        init: Rc<Expr>,
    },
    /// Dereferencing read of a global var
    VarDeref { var: VarId },
    /// Reference-only read of a global var (the `var` special)
    VarRef { var: VarId },
    /// Invocation. The unanalyzed argument forms are retained for
    /// diagnostics alongside the analyzed argument expressions.
    Call {
        callee: Box<Expr>,
        arg_forms: Vec<Form>,
        args: Vec<Expr>,
    },
    Literal(Literal),
    /// Vector literal construction
    Vector { items: Vec<Expr> },
    /// Map literal construction
    Map { pairs: Vec<(Expr, Expr)> },
    /// Set literal construction
    Set { items: Vec<Expr> },
    /// Closure definition, possibly multi-arity
    Fn {
        name: Option<SymbolId>,
        arities: SmallVec<[FnArity; 2]>,
    },
    /// Tail self-call targeting the innermost enclosing function frame
    Recur { args: Vec<Expr> },
    /// Read of a lexical binding
    LocalRef { binding: BindingId },
    /// Lexical binding introduction plus body
    Let {
        bindings: Vec<LetBinding>,
        body: Vec<Expr>,
    },
    /// Sequencing; all but the last form are statements
    Do { forms: Vec<Expr> },
    If {
        test: Box<Expr>,
        then: Box<Expr>,
        els: Box<Expr>,
    },
    Throw { value: Box<Expr> },
    /// Protected region with catch clauses and an optional finally
    Try {
        body: Vec<Expr>,
        catches: Vec<CatchClause>,
        finally: Option<Vec<Expr>>,
    },
    /// Opaque native code escape, passed verbatim to the code generator
    NativeRaw { code: String },
}

impl Expr {
    pub fn new(
        kind: ExprKind,
        ctx: EvalContext,
        needs_box: bool,
        frame: FrameId,
        span: Span,
    ) -> Self {
        Expr {
            kind,
            ctx,
            needs_box,
            frame,
            span,
        }
    }

    /// Build a literal node, demoting scalars whose value is discarded.
    ///
    /// A scalar in statement context has no consumer, so its native
    /// representation suffices; every other literal position feeds a
    /// polymorphic consumer and stays boxed.
    pub fn literal(lit: Literal, ctx: EvalContext, frame: FrameId, span: Span) -> Self {
        let needs_box = !(lit.is_scalar() && ctx == EvalContext::Statement);
        Expr::new(ExprKind::Literal(lit), ctx, needs_box, frame, span)
    }

    /// Force this node's result to be boxed, propagating through every
    /// tail position that produces the node's value so the join point
    /// sees one uniform representation.
    ///
    /// Invariant: a node's `needs_box` equals the boxedness of its tail
    /// producers, so a node already marked boxed has boxed tails and the
    /// walk can stop.
    pub fn force_boxed(&mut self) {
        if self.needs_box {
            return;
        }
        self.needs_box = true;
        match &mut self.kind {
            ExprKind::If { then, els, .. } => {
                then.force_boxed();
                els.force_boxed();
            }
            ExprKind::Do { forms } => {
                if let Some(last) = forms.last_mut() {
                    last.force_boxed();
                }
            }
            ExprKind::Let { body, .. } => {
                if let Some(last) = body.last_mut() {
                    last.force_boxed();
                }
            }
            ExprKind::Try {
                body,
                catches,
                ..
            } => {
                if let Some(last) = body.last_mut() {
                    last.force_boxed();
                }
                for catch in catches {
                    if let Some(last) = catch.body.last_mut() {
                        last.force_boxed();
                    }
                }
            }
            _ => {}
        }
    }
}
