//! Function definition and tail self-call: fn, recur

use super::*;
use crate::analyze::expr::FnArity;
use crate::analyze::frame::FrameKind;
use smallvec::SmallVec;

/// Parsed parameter vector: fixed names plus an optional rest name.
struct ParamList<'f> {
    fixed: Vec<(&'f str, &'f Span)>,
    rest: Option<(&'f str, &'f Span)>,
}

impl<'a> Analyzer<'a> {
    /// `(fn name? [params...] body...)` or
    /// `(fn name? ([params...] body...)+)`
    ///
    /// Each arity gets a fresh function frame; the fn's own name, when
    /// present, is bound in that frame before the body is analyzed so
    /// self-reference resolves. The body's last form is the function's
    /// result and is analyzed in return context.
    pub(crate) fn analyze_fn(
        &mut self,
        items: &[Form],
        frame: FrameId,
        ctx: EvalContext,
        span: Span,
    ) -> Result<Expr> {
        let mut idx = 1;
        let name = match items.get(idx).and_then(|f| f.as_symbol()) {
            Some(name) => {
                self.check_shadow(name, &items[idx].span)?;
                idx += 1;
                Some(self.symbols.intern(name))
            }
            None => None,
        };

        let rest = &items[idx..];
        if rest.is_empty() {
            return Err(AnalysisError::syntax(
                "fn requires a parameter vector",
                &span,
            ));
        }

        let mut arities: SmallVec<[FnArity; 2]> = SmallVec::new();
        if rest[0].as_vector().is_some() {
            // Single arity: (fn name? [params] body...)
            arities.push(self.analyze_arity(&rest[0], &rest[1..], name, frame, &span)?);
        } else {
            // Multi-arity: each remaining form is ([params] body...)
            for arity_form in rest {
                let list = arity_form.as_list().ok_or_else(|| {
                    AnalysisError::syntax(
                        "fn arity must be a list of parameter vector and body",
                        &arity_form.span,
                    )
                })?;
                let params = list.first().filter(|f| f.as_vector().is_some()).ok_or_else(
                    || {
                        AnalysisError::syntax(
                            "fn arity must start with a parameter vector",
                            &arity_form.span,
                        )
                    },
                )?;
                arities.push(self.analyze_arity(params, &list[1..], name, frame, &span)?);
            }
        }

        self.validate_arities(&arities, &span)?;

        Ok(Expr::new(
            ExprKind::Fn { name, arities },
            ctx,
            true,
            frame,
            span,
        ))
    }

    fn analyze_arity(
        &mut self,
        params_form: &Form,
        body_forms: &[Form],
        fn_name: Option<SymbolId>,
        frame: FrameId,
        span: &Span,
    ) -> Result<FnArity> {
        let params = self.parse_params(params_form)?;
        let param_count = params.fixed.len() + usize::from(params.rest.is_some());
        let variadic = params.rest.is_some();

        let child = self
            .frames_mut()
            .child(frame, FrameKind::Fn { param_count, variadic });

        // Self-name first, so the body can recurse by name. A parameter
        // with the same name is a duplicate in this frame.
        if let Some(name) = fn_name {
            self.declare(child, name, BindingKind::FnSelf, span)?;
        }

        let mut bindings = Vec::with_capacity(param_count);
        for (index, (name, pspan)) in params.fixed.iter().enumerate() {
            self.check_shadow(name, pspan)?;
            let sym = self.symbols.intern(name);
            bindings.push(self.declare(child, sym, BindingKind::Param { index }, pspan)?);
        }
        if let Some((name, pspan)) = params.rest {
            self.check_shadow(name, pspan)?;
            let sym = self.symbols.intern(name);
            let index = params.fixed.len();
            bindings.push(self.declare(child, sym, BindingKind::Param { index }, pspan)?);
        }

        let body =
            self.analyze_sequence(body_forms, child, EvalContext::ReturnStatement, span)?;

        Ok(FnArity {
            frame: child,
            params: bindings,
            variadic,
            body,
        })
    }

    fn parse_params<'f>(&self, params_form: &'f Form) -> Result<ParamList<'f>> {
        let items = params_form.as_vector().ok_or_else(|| {
            AnalysisError::syntax("fn params must be a vector", &params_form.span)
        })?;

        let mut fixed = Vec::with_capacity(items.len());
        let mut rest = None;
        let mut i = 0;
        while i < items.len() {
            let name = items[i].as_symbol().ok_or_else(|| {
                AnalysisError::syntax("fn param must be a symbol", &items[i].span)
            })?;
            if name == "&" {
                // Exactly one rest param, in final position.
                if i + 2 != items.len() {
                    return Err(AnalysisError::syntax(
                        "& must be followed by exactly one rest param",
                        &items[i].span,
                    ));
                }
                let rest_name = items[i + 1].as_symbol().ok_or_else(|| {
                    AnalysisError::syntax("rest param must be a symbol", &items[i + 1].span)
                })?;
                rest = Some((rest_name, &items[i + 1].span));
                break;
            }
            fixed.push((name, &items[i].span));
            i += 1;
        }

        Ok(ParamList { fixed, rest })
    }

    fn validate_arities(&self, arities: &[FnArity], span: &Span) -> Result<()> {
        if arities.is_empty() {
            return Err(AnalysisError::syntax("fn requires at least one arity", span));
        }

        let mut variadic_required = None;
        let mut fixed_counts = Vec::with_capacity(arities.len());
        for arity in arities {
            if arity.variadic {
                if variadic_required.is_some() {
                    return Err(AnalysisError::syntax(
                        "fn may have at most one variadic arity",
                        span,
                    ));
                }
                variadic_required = Some(arity.required());
            } else {
                if fixed_counts.contains(&arity.params.len()) {
                    return Err(AnalysisError::syntax("duplicate fn arity", span));
                }
                fixed_counts.push(arity.params.len());
            }
        }

        if let Some(required) = variadic_required {
            if fixed_counts.iter().any(|&count| count > required) {
                return Err(AnalysisError::syntax(
                    "fixed arity cannot take more params than the variadic arity",
                    span,
                ));
            }
        }

        Ok(())
    }

    /// `(recur arg...)` - terminal tail self-call. Legal only in return
    /// context, under a function boundary, not across a try boundary,
    /// and with an argument count matching the target arity.
    pub(crate) fn analyze_recur(
        &mut self,
        items: &[Form],
        frame: FrameId,
        ctx: EvalContext,
        span: Span,
    ) -> Result<Expr> {
        if ctx != EvalContext::ReturnStatement {
            return Err(AnalysisError::illegal_recur(
                "recur may only appear in tail position",
                &span,
            ));
        }

        let target = self
            .frames()
            .recur_target(frame)
            .ok_or_else(|| {
                AnalysisError::illegal_recur("recur outside a function boundary", &span)
            })?;
        if target.crosses_try {
            return Err(AnalysisError::illegal_recur(
                "cannot recur across a try boundary",
                &span,
            ));
        }

        let param_count = match self.frames().frame(target.frame).kind {
            FrameKind::Fn { param_count, .. } => param_count,
            // recur_target only returns Fn frames
            _ => 0,
        };

        let argc = items.len() - 1;
        if argc != param_count {
            return Err(AnalysisError::ArityMismatch {
                name: "recur".to_string(),
                expected: param_count.to_string(),
                got: argc,
                span,
            });
        }

        let mut args = Vec::with_capacity(argc);
        for arg in &items[1..] {
            let mut e = self.analyze(arg, frame, EvalContext::Expression)?;
            // Arguments rebind the target's params, which are boxed.
            e.force_boxed();
            args.push(e);
        }

        // recur transfers control; it produces no value of its own.
        Ok(Expr::new(
            ExprKind::Recur { args },
            ctx,
            false,
            frame,
            span,
        ))
    }
}
