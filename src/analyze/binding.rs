//! Binding forms: def, var, let

use super::*;
use crate::analyze::expr::LetBinding;
use crate::analyze::frame::FrameKind;
use std::rc::Rc;

impl<'a> Analyzer<'a> {
    /// `(def name value)` - exactly a symbol and one value form.
    ///
    /// The var is forward-declared before the init is analyzed so a
    /// self-referential definition resolves; the root is only installed
    /// once the init analyzes successfully.
    pub(crate) fn analyze_def(
        &mut self,
        items: &[Form],
        frame: FrameId,
        ctx: EvalContext,
        span: Span,
    ) -> Result<Expr> {
        if items.len() != 3 {
            return Err(AnalysisError::syntax(
                "def requires a name and exactly one value form",
                &span,
            ));
        }

        let name = items[1]
            .as_symbol()
            .ok_or_else(|| AnalysisError::syntax("def name must be a symbol", &items[1].span))?;
        self.check_shadow(name, &items[1].span)?;

        let sym = self.symbols.intern(name);
        let var = self.ns.declare(sym);

        self.defining.push(var);
        let analyzed = self.analyze(&items[2], frame, EvalContext::Expression);
        self.defining.pop();
        let mut init = analyzed?;
        // The var's value crosses every dynamic dispatch path.
        init.force_boxed();
        let init = Rc::new(init);
        self.ns.redefine(var, init.clone());

        Ok(Expr::new(
            ExprKind::Def { name: sym, var, init },
            ctx,
            true,
            frame,
            span,
        ))
    }

    /// `(var name)` - reference-only read of a global var.
    pub(crate) fn analyze_var(
        &mut self,
        items: &[Form],
        frame: FrameId,
        ctx: EvalContext,
        span: Span,
    ) -> Result<Expr> {
        if items.len() != 2 {
            return Err(AnalysisError::syntax("var requires one symbol", &span));
        }
        let name = items[1]
            .as_symbol()
            .ok_or_else(|| AnalysisError::syntax("var requires a symbol", &items[1].span))?;

        let sym = self.symbols.intern(name);
        let var = self
            .ns
            .resolve(sym)
            .ok_or_else(|| AnalysisError::UnresolvedSymbol {
                name: name.to_string(),
                span: items[1].span.clone(),
            })?;

        Ok(Expr::new(
            ExprKind::VarRef { var },
            ctx,
            true,
            frame,
            span,
        ))
    }

    /// `(let [name value ...] body...)` - one child frame, bindings
    /// declared left-to-right so each init sees only earlier bindings.
    pub(crate) fn analyze_let(
        &mut self,
        items: &[Form],
        frame: FrameId,
        ctx: EvalContext,
        span: Span,
    ) -> Result<Expr> {
        if items.len() < 2 {
            return Err(AnalysisError::syntax("let requires a binding vector", &span));
        }

        let binding_forms = items[1].as_vector().ok_or_else(|| {
            AnalysisError::syntax("let bindings must be a vector", &items[1].span)
        })?;
        if binding_forms.len() % 2 != 0 {
            return Err(AnalysisError::syntax(
                "let requires an even number of binding forms",
                &items[1].span,
            ));
        }

        let child = self.frames_mut().child(frame, FrameKind::Let);

        let mut bindings = Vec::with_capacity(binding_forms.len() / 2);
        for pair in binding_forms.chunks_exact(2) {
            let name = pair[0].as_symbol().ok_or_else(|| {
                AnalysisError::syntax("let binding name must be a symbol", &pair[0].span)
            })?;
            self.check_shadow(name, &pair[0].span)?;

            // Analyzed in the child frame before this name is declared:
            // the init sees earlier bindings of this let, never itself or
            // later ones.
            let mut init = self.analyze(&pair[1], child, EvalContext::Expression)?;
            init.force_boxed();

            let sym = self.symbols.intern(name);
            let index = self.frames().frame(child).len();
            let binding =
                self.declare(child, sym, BindingKind::Local { index }, &pair[0].span)?;
            bindings.push(LetBinding { binding, init });
        }

        let body = self.analyze_sequence(&items[2..], child, ctx, &span)?;
        let needs_box = body.last().map(|e| e.needs_box).unwrap_or(true);

        Ok(Expr::new(
            ExprKind::Let { bindings, body },
            ctx,
            needs_box,
            frame,
            span,
        ))
    }
}
