//! Global var namespace
//!
//! Vars are the mutable, process-wide, redefinable bindings of the
//! language, distinct from lexical bindings. The analyzer treats the
//! namespace as a service: it forward-declares vars for `def`, resolves
//! free symbols against it, and installs analyzed roots on success.
//!
//! Identity matters more than value here. A [`VarId`] handle is stable
//! across redefinition, so a tree analyzed against an old root keeps
//! referring to the same var; last write wins for everyone who
//! dereferences it afterwards.

use crate::analyze::expr::Expr;
use crate::symbol::SymbolId;
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// Stable handle to a global var. Redefinition never changes the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(pub u32);

/// A single global var: a name plus an optional analyzed root.
///
/// A var with no root is forward-declared: `def` creates it before
/// analyzing the init so self-referential definitions resolve. The root
/// is only installed once the init analyzes successfully, so a failed
/// `def` never leaves a var pointing at a partially built node.
#[derive(Debug)]
pub struct Var {
    pub name: SymbolId,
    root: Option<Rc<Expr>>,
}

/// The process-wide var table for one compilation unit.
#[derive(Debug, Default)]
pub struct Namespace {
    vars: Vec<Var>,
    by_name: FxHashMap<SymbolId, VarId>,
}

impl Namespace {
    pub fn new() -> Self {
        Namespace {
            vars: Vec::new(),
            by_name: FxHashMap::default(),
        }
    }

    /// Forward-declare a var, or return the existing handle.
    ///
    /// Idempotent: declaring an already-bound var keeps its root, so a
    /// redefinition that later fails leaves the previous definition
    /// intact.
    pub fn declare(&mut self, name: SymbolId) -> VarId {
        if let Some(&id) = self.by_name.get(&name) {
            return id;
        }
        let id = VarId(self.vars.len() as u32);
        self.vars.push(Var { name, root: None });
        self.by_name.insert(name, id);
        id
    }

    /// Resolve a name to an existing var, without declaring.
    pub fn resolve(&self, name: SymbolId) -> Option<VarId> {
        self.by_name.get(&name).copied()
    }

    /// Install a new root for a var. Last write wins, by handle identity.
    pub fn redefine(&mut self, var: VarId, root: Rc<Expr>) {
        if let Some(v) = self.vars.get_mut(var.0 as usize) {
            v.root = Some(root);
        }
    }

    /// The current root of a var, if it has been finalized.
    pub fn root(&self, var: VarId) -> Option<&Rc<Expr>> {
        self.vars.get(var.0 as usize).and_then(|v| v.root.as_ref())
    }

    pub fn var(&self, var: VarId) -> Option<&Var> {
        self.vars.get(var.0 as usize)
    }

    /// The interned name of a var.
    pub fn name(&self, var: VarId) -> Option<SymbolId> {
        self.vars.get(var.0 as usize).map(|v| v.name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
