//! Call analysis and static arity checking

use super::*;
use crate::analyze::expr::FnArity;

impl<'a> Analyzer<'a> {
    /// Generic invocation: the head did not name a special operator.
    ///
    /// The callee and every argument are analyzed in expression context
    /// (arguments are never statements). When the callee's arities are
    /// statically known the argument count is validated here instead of
    /// deferring to runtime.
    pub(crate) fn analyze_call(
        &mut self,
        items: &[Form],
        frame: FrameId,
        ctx: EvalContext,
        span: Span,
    ) -> Result<Expr> {
        let callee = self.analyze(&items[0], frame, EvalContext::Expression)?;

        // Original forms are retained for diagnostics.
        let arg_forms: Vec<Form> = items[1..].to_vec();

        let mut args = Vec::with_capacity(arg_forms.len());
        for arg in &items[1..] {
            let mut e = self.analyze(arg, frame, EvalContext::Expression)?;
            // The callee's representation is dynamic; every argument
            // crosses a polymorphic boundary.
            e.force_boxed();
            args.push(e);
        }

        self.check_call_arity(&callee, args.len(), &span)?;

        Ok(Expr::new(
            ExprKind::Call {
                callee: Box::new(callee),
                arg_forms,
                args,
            },
            ctx,
            true,
            frame,
            span,
        ))
    }

    /// Validate the argument count when the callee shape is known at
    /// analysis time: an inline fn, or a var whose root is a fn. Locals
    /// and unbound vars defer to runtime dispatch.
    fn check_call_arity(&self, callee: &Expr, argc: usize, span: &Span) -> Result<()> {
        let (name, arities): (String, &[FnArity]) = match &callee.kind {
            ExprKind::Fn { name, arities } => {
                let name = name
                    .and_then(|sym| self.symbols.name(sym))
                    .unwrap_or("fn")
                    .to_string();
                (name, arities.as_slice())
            }
            // A var being redefined right now would be checked against
            // its stale root.
            ExprKind::VarDeref { var } if self.defining.contains(var) => return Ok(()),
            ExprKind::VarDeref { var } => match self.ns.root(*var) {
                Some(root) => match &root.kind {
                    ExprKind::Fn { arities, .. } => {
                        let name = self
                            .ns
                            .name(*var)
                            .and_then(|sym| self.symbols.name(sym))
                            .unwrap_or("fn")
                            .to_string();
                        (name, arities.as_slice())
                    }
                    _ => return Ok(()),
                },
                None => return Ok(()),
            },
            _ => return Ok(()),
        };

        if arities.iter().any(|arity| arity.accepts(argc)) {
            return Ok(());
        }

        Err(AnalysisError::ArityMismatch {
            name,
            expected: describe_arities(arities),
            got: argc,
            span: span.clone(),
        })
    }
}

/// Human-readable arity summary: "1", "1 or 2", "2, 4 or at least 5".
fn describe_arities(arities: &[FnArity]) -> String {
    let mut fixed: Vec<usize> = arities
        .iter()
        .filter(|a| !a.variadic)
        .map(|a| a.params.len())
        .collect();
    fixed.sort_unstable();

    let mut parts: Vec<String> = fixed.iter().map(|n| n.to_string()).collect();
    if let Some(variadic) = arities.iter().find(|a| a.variadic) {
        parts.push(format!("at least {}", variadic.required()));
    }

    match parts.len() {
        0 => "none".to_string(),
        1 => parts.remove(0),
        _ => {
            let last = parts.pop().unwrap_or_default();
            format!("{} or {}", parts.join(", "), last)
        }
    }
}
