//! Control flow and effect forms: do, if, throw, try, native/raw

use super::*;
use crate::analyze::expr::CatchClause;
use crate::analyze::frame::FrameKind;

impl<'a> Analyzer<'a> {
    /// `(do form...)` - all but the last form are statements, the last
    /// inherits the surrounding context.
    pub(crate) fn analyze_do(
        &mut self,
        items: &[Form],
        frame: FrameId,
        ctx: EvalContext,
        span: Span,
    ) -> Result<Expr> {
        let forms = self.analyze_sequence(&items[1..], frame, ctx, &span)?;
        let needs_box = forms.last().map(|e| e.needs_box).unwrap_or(true);
        Ok(Expr::new(
            ExprKind::Do { forms },
            ctx,
            needs_box,
            frame,
            span,
        ))
    }

    /// `(if test then else?)` - test in expression context, branches
    /// inherit; a missing else defaults to nil. Branch representations
    /// are reconciled: if either branch is boxed, both are.
    pub(crate) fn analyze_if(
        &mut self,
        items: &[Form],
        frame: FrameId,
        ctx: EvalContext,
        span: Span,
    ) -> Result<Expr> {
        if items.len() < 3 || items.len() > 4 {
            return Err(AnalysisError::syntax(
                "if requires a test and one or two branches",
                &span,
            ));
        }

        let test = self.analyze(&items[1], frame, EvalContext::Expression)?;
        let mut then = self.analyze(&items[2], frame, ctx)?;
        let mut els = if items.len() == 4 {
            self.analyze(&items[3], frame, ctx)?
        } else {
            Expr::literal(Literal::Nil, ctx, frame, span.clone())
        };

        // Join point: the branches produce one logical value, so their
        // representations must match.
        if then.needs_box || els.needs_box {
            then.force_boxed();
            els.force_boxed();
        }
        let needs_box = then.needs_box;

        Ok(Expr::new(
            ExprKind::If {
                test: Box::new(test),
                then: Box::new(then),
                els: Box::new(els),
            },
            ctx,
            needs_box,
            frame,
            span,
        ))
    }

    /// `(throw value)` - the thrown value crosses a non-local,
    /// dynamically-typed control path, so it is always boxed.
    pub(crate) fn analyze_throw(
        &mut self,
        items: &[Form],
        frame: FrameId,
        ctx: EvalContext,
        span: Span,
    ) -> Result<Expr> {
        if items.len() != 2 {
            return Err(AnalysisError::syntax(
                "throw requires exactly one value form",
                &span,
            ));
        }

        let mut value = self.analyze(&items[1], frame, EvalContext::Expression)?;
        value.force_boxed();

        Ok(Expr::new(
            ExprKind::Throw {
                value: Box::new(value),
            },
            ctx,
            true,
            frame,
            span,
        ))
    }

    /// `(try body... (catch name body...)* (finally body...)?)`
    ///
    /// The result may originate from the body or any catch clause, so it
    /// is forced boxed along every tail. The finally body never produces
    /// the value: all of its forms are statements.
    pub(crate) fn analyze_try(
        &mut self,
        items: &[Form],
        frame: FrameId,
        ctx: EvalContext,
        span: Span,
    ) -> Result<Expr> {
        let mut body_forms: Vec<&Form> = Vec::new();
        let mut catch_forms: Vec<&[Form]> = Vec::new();
        let mut finally_forms: Option<&[Form]> = None;

        for item in &items[1..] {
            let clause = item.as_list().and_then(|list| {
                list.first()
                    .and_then(|head| head.as_symbol())
                    .filter(|s| *s == "catch" || *s == "finally")
                    .map(|s| (s, list))
            });
            match clause {
                Some(("catch", list)) => {
                    if finally_forms.is_some() {
                        return Err(AnalysisError::syntax(
                            "catch clause after finally",
                            &item.span,
                        ));
                    }
                    catch_forms.push(list);
                }
                Some(("finally", list)) => {
                    if finally_forms.is_some() {
                        return Err(AnalysisError::syntax(
                            "try allows only one finally clause",
                            &item.span,
                        ));
                    }
                    finally_forms = Some(&list[1..]);
                }
                _ => {
                    if !catch_forms.is_empty() || finally_forms.is_some() {
                        return Err(AnalysisError::syntax(
                            "try body form after catch or finally",
                            &item.span,
                        ));
                    }
                    body_forms.push(item);
                }
            }
        }

        let try_frame = self.frames_mut().child(frame, FrameKind::Try);
        let owned_body: Vec<Form> = body_forms.into_iter().cloned().collect();
        let mut body = self.analyze_sequence(&owned_body, try_frame, ctx, &span)?;
        if let Some(last) = body.last_mut() {
            last.force_boxed();
        }

        let mut catches = Vec::with_capacity(catch_forms.len());
        for clause in catch_forms {
            // (catch name body...)
            let name_form = clause.get(1).ok_or_else(|| {
                AnalysisError::syntax("catch requires a binding name", &span)
            })?;
            let name = name_form.as_symbol().ok_or_else(|| {
                AnalysisError::syntax("catch binding must be a symbol", &name_form.span)
            })?;
            self.check_shadow(name, &name_form.span)?;

            let catch_frame = self.frames_mut().child(frame, FrameKind::Catch);
            let sym = self.symbols.intern(name);
            let binding =
                self.declare(catch_frame, sym, BindingKind::CatchBound, &name_form.span)?;

            let mut catch_body =
                self.analyze_sequence(&clause[2..], catch_frame, ctx, &span)?;
            if let Some(last) = catch_body.last_mut() {
                last.force_boxed();
            }
            catches.push(CatchClause {
                frame: catch_frame,
                binding,
                body: catch_body,
            });
        }

        let finally = match finally_forms {
            Some(forms) => {
                let mut out = Vec::with_capacity(forms.len());
                for f in forms {
                    out.push(self.analyze(f, try_frame, EvalContext::Statement)?);
                }
                Some(out)
            }
            None => None,
        };

        Ok(Expr::new(
            ExprKind::Try {
                body,
                catches,
                finally,
            },
            ctx,
            true,
            frame,
            span,
        ))
    }

    /// `(native/raw "code")` - opaque payload, trusted verbatim by the
    /// code generator. Only context and boxing are annotated here.
    pub(crate) fn analyze_native_raw(
        &mut self,
        items: &[Form],
        frame: FrameId,
        ctx: EvalContext,
        span: Span,
    ) -> Result<Expr> {
        if items.len() != 2 {
            return Err(AnalysisError::syntax(
                "native/raw requires one string payload",
                &span,
            ));
        }
        let code = match &items[1].kind {
            FormKind::String(s) => s.clone(),
            _ => {
                return Err(AnalysisError::syntax(
                    "native/raw payload must be a string",
                    &items[1].span,
                ))
            }
        };

        let needs_box = ctx != EvalContext::Statement;
        Ok(Expr::new(
            ExprKind::NativeRaw { code },
            ctx,
            needs_box,
            frame,
            span,
        ))
    }
}
