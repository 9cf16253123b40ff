//! # Karst - semantic analysis for a natively-compiled Lisp
//!
//! Karst is a dynamically-typed Lisp-family language that executes via
//! native code generation. This crate is the semantic-analysis stage of
//! its compiler: it consumes parsed forms and produces a typed expression
//! tree annotated with everything the code generator needs.
//!
//! ## Quick Start
//!
//! ```
//! use karst::{Analyzer, EvalContext, Form, Namespace, SymbolTable};
//!
//! let mut symbols = SymbolTable::new();
//! let mut ns = Namespace::new();
//! let mut analyzer = Analyzer::new(&mut symbols, &mut ns);
//! let root = analyzer.root_frame();
//!
//! // (if true 1 2)
//! let form = Form::list(vec![
//!     Form::symbol("if"),
//!     Form::bool(true),
//!     Form::int(1),
//!     Form::int(2),
//! ]);
//! let expr = analyzer.analyze(&form, root, EvalContext::Expression).unwrap();
//! assert!(expr.needs_box);
//! ```
//!
//! ## Architecture
//!
//! Karst compiles code through several stages:
//!
//! 1. **Reader** - Parse s-expressions from text (external)
//! 2. **Analyzer** - Resolve symbols, dispatch special forms, infer boxing
//! 3. **Codegen** - Lower the expression tree to native code (external)
//!
//! The analyzer produces one [`Expr`] per top-level form. Every node
//! carries its evaluation context (expression, statement, or tail return),
//! whether its value must be heap-boxed, and the lexical frame it was
//! analyzed in. Once a node is returned it is never mutated again.

pub mod analyze;
pub mod error;
pub mod form;
pub mod ns;
pub mod symbol;

pub use analyze::expr::{EvalContext, Expr, ExprKind, Literal};
pub use analyze::frame::{BindingId, BindingKind, FrameId, FrameKind, Frames};
pub use analyze::Analyzer;
pub use error::AnalysisError;
pub use form::{Form, FormKind, Span};
pub use ns::{Namespace, VarId};
pub use symbol::{SymbolId, SymbolTable};
