//! Analysis error taxonomy
//!
//! Every failure mode of the analyzer is a variant here. Errors are local,
//! non-retryable, and surfaced synchronously to the immediate caller of
//! `analyze`: a form either fully analyzes to a node or fails with exactly
//! one error naming the offending form. There is no silent recovery or
//! default substitution.

use crate::form::Span;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Wrong arity or shape for a special form (odd `let` bindings,
    /// `if` without a test, a non-vector parameter list, ...)
    #[error("{span}: {message}")]
    SyntaxShape { message: String, span: Span },

    /// Re-declaration of a name within a single frame. Shadowing across
    /// frames is legal; within one frame it is not.
    #[error("{span}: duplicate binding: {name}")]
    DuplicateBinding { name: String, span: Span },

    /// No lexical binding and no global var for a symbol.
    #[error("{span}: unable to resolve symbol: {name}")]
    UnresolvedSymbol { name: String, span: Span },

    /// Call or `recur` argument count disagrees with a statically known
    /// arity.
    #[error("{span}: arity mismatch for {name}: expected {expected}, got {got}")]
    ArityMismatch {
        name: String,
        expected: String,
        got: usize,
        span: Span,
    },

    /// `recur` outside a function boundary, in non-tail position, or
    /// across a `try` boundary.
    #[error("{span}: {reason}")]
    IllegalRecur { reason: String, span: Span },

    /// Attempt to bind a special-form name. Specials are reserved
    /// unconditionally; a binding would silently change dispatch at every
    /// use site in its scope.
    #[error("{span}: cannot shadow special form: {name}")]
    IllegalShadow { name: String, span: Span },
}

impl AnalysisError {
    pub fn syntax(message: impl Into<String>, span: &Span) -> Self {
        AnalysisError::SyntaxShape {
            message: message.into(),
            span: span.clone(),
        }
    }

    pub fn illegal_recur(reason: impl Into<String>, span: &Span) -> Self {
        AnalysisError::IllegalRecur {
            reason: reason.into(),
            span: span.clone(),
        }
    }
}
