//! Form to expression-tree analysis
//!
//! This module converts parsed forms into typed expression nodes by:
//! 1. Dispatching special forms to their handlers
//! 2. Resolving every symbol to a lexical binding or a global var
//! 3. Stamping each node with its evaluation context and owning frame
//! 4. Inferring boxing requirements as nodes are built
//!
//! Analysis is single-threaded, synchronous recursion: one form in, one
//! node (or one error) out. Stack depth is bounded by source nesting.

mod binding;
mod call;
mod forms;
mod lambda;

pub mod expr;
pub mod frame;

use crate::error::{AnalysisError, Result};
use crate::form::{Form, FormKind, Span};
use crate::ns::{Namespace, VarId};
use crate::symbol::{SymbolId, SymbolTable};
use self::expr::{EvalContext, Expr, ExprKind, Literal};
use self::frame::{BindingId, BindingKind, FrameId, Frames};

/// The special operators. Reserved unconditionally: an ordinary binding
/// with one of these names is rejected at the binding site, so a head
/// symbol naming a special always dispatches here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Special {
    Def,
    Var,
    Let,
    Do,
    If,
    Throw,
    Try,
    Fn,
    Recur,
    NativeRaw,
}

/// Classify a symbol name as a special operator.
pub fn special_operator(name: &str) -> Option<Special> {
    match name {
        "def" => Some(Special::Def),
        "var" => Some(Special::Var),
        "let" => Some(Special::Let),
        "do" => Some(Special::Do),
        "if" => Some(Special::If),
        "throw" => Some(Special::Throw),
        "try" => Some(Special::Try),
        "fn" => Some(Special::Fn),
        "recur" => Some(Special::Recur),
        "native/raw" => Some(Special::NativeRaw),
        _ => None,
    }
}

fn is_recur_form(form: &Form) -> bool {
    form.as_list()
        .and_then(|items| items.first())
        .map(|head| head.is_symbol("recur"))
        .unwrap_or(false)
}

/// How a symbol resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    /// A lexical binding; its [`BindingKind`] distinguishes locals,
    /// parameters, caught values, and fn self-names.
    Binding(BindingId),
    /// A global var
    Var(VarId),
}

/// Analyzer that converts forms into expression nodes.
///
/// Owns the frame arena for one analysis; borrows the symbol table and
/// the global var namespace, which outlive it and are shared with the
/// rest of the compiler.
pub struct Analyzer<'a> {
    symbols: &'a mut SymbolTable,
    ns: &'a mut Namespace,
    frames: Frames,
    /// Vars whose `def` init is currently being analyzed. Self-calls
    /// inside the init must not be arity-checked against the stale root.
    defining: Vec<VarId>,
}

impl<'a> Analyzer<'a> {
    pub fn new(symbols: &'a mut SymbolTable, ns: &'a mut Namespace) -> Self {
        Analyzer {
            symbols,
            ns,
            frames: Frames::new(),
            defining: Vec::new(),
        }
    }

    /// Create a root frame for a compilation unit.
    pub fn root_frame(&mut self) -> FrameId {
        self.frames.root()
    }

    /// The frame arena, for interpreting the ids carried by nodes.
    pub fn frames(&self) -> &Frames {
        &self.frames
    }

    /// Analyze a whole compilation unit: root-level forms are statements,
    /// the last one a tail return when the unit wants a trailing value.
    /// Stops at the first error.
    pub fn analyze_unit(
        &mut self,
        forms: &[Form],
        frame: FrameId,
        want_value: bool,
    ) -> Result<Vec<Expr>> {
        let mut out = Vec::with_capacity(forms.len());
        for (i, form) in forms.iter().enumerate() {
            let ctx = if want_value && i + 1 == forms.len() {
                EvalContext::ReturnStatement
            } else {
                EvalContext::Statement
            };
            out.push(self.analyze(form, frame, ctx)?);
        }
        Ok(out)
    }

    /// Analyze one form in a frame and evaluation context, producing one
    /// expression node. The sole producer of tree nodes.
    pub fn analyze(&mut self, form: &Form, frame: FrameId, ctx: EvalContext) -> Result<Expr> {
        let span = form.span.clone();

        match &form.kind {
            FormKind::Nil => Ok(Expr::literal(Literal::Nil, ctx, frame, span)),
            FormKind::Bool(b) => Ok(Expr::literal(Literal::Bool(*b), ctx, frame, span)),
            FormKind::Int(n) => Ok(Expr::literal(Literal::Int(*n), ctx, frame, span)),
            FormKind::Float(f) => Ok(Expr::literal(Literal::Float(*f), ctx, frame, span)),
            FormKind::String(s) => Ok(Expr::literal(Literal::String(s.clone()), ctx, frame, span)),
            FormKind::Keyword(k) => {
                let sym = self.symbols.intern(k);
                Ok(Expr::literal(Literal::Keyword(sym), ctx, frame, span))
            }

            FormKind::Symbol(name) => self.analyze_symbol(name, frame, ctx, &span),

            FormKind::Vector(items) => {
                let items = self.analyze_elements(items, frame)?;
                Ok(Expr::new(ExprKind::Vector { items }, ctx, true, frame, span))
            }
            FormKind::Set(items) => {
                let items = self.analyze_elements(items, frame)?;
                Ok(Expr::new(ExprKind::Set { items }, ctx, true, frame, span))
            }
            FormKind::Map(entries) => {
                let mut pairs = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    let mut key = self.analyze(k, frame, EvalContext::Expression)?;
                    let mut val = self.analyze(v, frame, EvalContext::Expression)?;
                    key.force_boxed();
                    val.force_boxed();
                    pairs.push((key, val));
                }
                Ok(Expr::new(ExprKind::Map { pairs }, ctx, true, frame, span))
            }

            FormKind::List(items) => {
                // The empty list is a reader-level literal, not a call.
                if items.is_empty() {
                    return Ok(Expr::literal(Literal::EmptyList, ctx, frame, span));
                }

                if let Some(name) = items[0].as_symbol() {
                    if let Some(special) = special_operator(name) {
                        return match special {
                            Special::Def => self.analyze_def(items, frame, ctx, span),
                            Special::Var => self.analyze_var(items, frame, ctx, span),
                            Special::Let => self.analyze_let(items, frame, ctx, span),
                            Special::Do => self.analyze_do(items, frame, ctx, span),
                            Special::If => self.analyze_if(items, frame, ctx, span),
                            Special::Throw => self.analyze_throw(items, frame, ctx, span),
                            Special::Try => self.analyze_try(items, frame, ctx, span),
                            Special::Fn => self.analyze_fn(items, frame, ctx, span),
                            Special::Recur => self.analyze_recur(items, frame, ctx, span),
                            Special::NativeRaw => {
                                self.analyze_native_raw(items, frame, ctx, span)
                            }
                        };
                    }
                }

                self.analyze_call(items, frame, ctx, span)
            }
        }
    }

    /// Resolve a symbol: frame chain first, then the global namespace.
    pub fn resolve_symbol(&mut self, name: &str, frame: FrameId) -> Option<Resolved> {
        let sym = self.symbols.intern(name);
        if let Some(binding) = self.frames.resolve(frame, sym) {
            return Some(Resolved::Binding(binding));
        }
        self.ns.resolve(sym).map(Resolved::Var)
    }

    fn analyze_symbol(
        &mut self,
        name: &str,
        frame: FrameId,
        ctx: EvalContext,
        span: &Span,
    ) -> Result<Expr> {
        // A special name can only ever appear as a list head.
        if special_operator(name).is_some() {
            return Err(AnalysisError::syntax(
                format!("special form {} is not a value", name),
                span,
            ));
        }

        match self.resolve_symbol(name, frame) {
            Some(Resolved::Binding(binding)) => Ok(Expr::new(
                ExprKind::LocalRef { binding },
                ctx,
                true,
                frame,
                span.clone(),
            )),
            Some(Resolved::Var(var)) => Ok(Expr::new(
                ExprKind::VarDeref { var },
                ctx,
                true,
                frame,
                span.clone(),
            )),
            None => Err(AnalysisError::UnresolvedSymbol {
                name: name.to_string(),
                span: span.clone(),
            }),
        }
    }

    /// Aggregate literal elements: always expression context, always
    /// boxed (they land in a polymorphic container).
    fn analyze_elements(&mut self, items: &[Form], frame: FrameId) -> Result<Vec<Expr>> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let mut e = self.analyze(item, frame, EvalContext::Expression)?;
            e.force_boxed();
            out.push(e);
        }
        Ok(out)
    }

    /// Analyze a body sequence: all but the last form become statements,
    /// the last inherits `ctx`. An empty body is a nil literal.
    ///
    /// `recur` is a terminal construct: it must constitute the entire
    /// tail of its body, so a sequence that does work before an
    /// unconditional self-call is rejected.
    pub(crate) fn analyze_sequence(
        &mut self,
        forms: &[Form],
        frame: FrameId,
        ctx: EvalContext,
        span: &Span,
    ) -> Result<Vec<Expr>> {
        if forms.is_empty() {
            return Ok(vec![Expr::literal(
                Literal::Nil,
                ctx,
                frame,
                span.clone(),
            )]);
        }
        let mut out = Vec::with_capacity(forms.len());
        for form in &forms[..forms.len() - 1] {
            out.push(self.analyze(form, frame, EvalContext::Statement)?);
        }
        if let Some(last) = forms.last() {
            if forms.len() > 1 && ctx == EvalContext::ReturnStatement && is_recur_form(last) {
                return Err(AnalysisError::illegal_recur(
                    "recur may only appear in tail position",
                    &last.span,
                ));
            }
            out.push(self.analyze(last, frame, ctx)?);
        }
        Ok(out)
    }

    /// Declare a binding, surfacing duplicates as analysis errors.
    pub(crate) fn declare(
        &mut self,
        frame: FrameId,
        sym: SymbolId,
        kind: BindingKind,
        span: &Span,
    ) -> Result<BindingId> {
        self.frames.declare(frame, sym, kind).map_err(|name| {
            AnalysisError::DuplicateBinding {
                name: self.symbols.name(name).unwrap_or("?").to_string(),
                span: span.clone(),
            }
        })
    }

    /// Reject binding positions that would shadow a special form.
    pub(crate) fn check_shadow(&self, name: &str, span: &Span) -> Result<()> {
        if special_operator(name).is_some() {
            return Err(AnalysisError::IllegalShadow {
                name: name.to_string(),
                span: span.clone(),
            });
        }
        Ok(())
    }

    pub(crate) fn frames_mut(&mut self) -> &mut Frames {
        &mut self.frames
    }
}
