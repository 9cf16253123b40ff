//! Local frames: the lexical scope chain
//!
//! Every binding introduced during analysis (let locals, fn parameters,
//! caught values, a fn's self-name) lives in a [`LocalFrame`]. Frames form
//! a parent chain; resolving a symbol walks innermost to outermost and
//! stops at the first hit. Frames are allocated from a [`Frames`] arena
//! and referenced by stable [`FrameId`] handles, so expression nodes can
//! carry a non-owning back-reference to the frame they were analyzed in
//! without any lifetime entanglement.
//!
//! Shadowing is permitted across frames, never within one: declaring a
//! name twice in the same frame is a duplicate-binding failure.

use crate::symbol::SymbolId;
use rustc_hash::FxHashMap;

/// Stable handle to a frame in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u32);

/// Stable handle to a binding in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(pub u32);

/// What kind of scope a frame represents.
///
/// `Fn` frames are function boundaries: they carry the active arity and
/// act as `recur` targets. `Try` and `Catch` frames mark regions that
/// non-local exits must respect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Root,
    Fn { param_count: usize, variadic: bool },
    Let,
    Try,
    Catch,
}

/// How a name was bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Function parameter, with its position in the arity's param list
    Param { index: usize },
    /// `let`-introduced local, with its position within the frame
    Local { index: usize },
    /// The value bound by a `catch` clause
    CatchBound,
    /// A fn's own name, bound for self-recursion
    FnSelf,
}

/// One binding: a name, how it was introduced, and the owning frame.
#[derive(Debug, Clone, Copy)]
pub struct LocalBinding {
    pub name: SymbolId,
    pub kind: BindingKind,
    pub frame: FrameId,
}

/// One lexical scope: bindings by name plus a parent link.
#[derive(Debug)]
pub struct LocalFrame {
    pub parent: Option<FrameId>,
    pub kind: FrameKind,
    bindings: FxHashMap<SymbolId, BindingId>,
    order: Vec<BindingId>,
}

impl LocalFrame {
    fn new(parent: Option<FrameId>, kind: FrameKind) -> Self {
        LocalFrame {
            parent,
            kind,
            bindings: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    /// Look up a binding in this frame only
    pub fn get(&self, name: SymbolId) -> Option<BindingId> {
        self.bindings.get(&name).copied()
    }

    /// Bindings in declaration order
    pub fn bindings_in_order(&self) -> &[BindingId] {
        &self.order
    }

    /// Number of bindings declared in this frame
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Outcome of walking the frame chain towards a `recur` target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurTarget {
    /// The innermost enclosing function boundary
    pub frame: FrameId,
    /// Whether the walk crossed a `try` or `catch` boundary; recurring
    /// across one would jump out of the protected region
    pub crosses_try: bool,
}

/// Arena owning every frame and binding of one analysis.
///
/// Nothing is freed individually; frames live as long as the analysis
/// that allocated them, and handles stay valid as long as the arena
/// lives.
#[derive(Debug, Default)]
pub struct Frames {
    frames: Vec<LocalFrame>,
    bindings: Vec<LocalBinding>,
}

impl Frames {
    pub fn new() -> Self {
        Frames::default()
    }

    /// Create a root frame for a compilation unit
    pub fn root(&mut self) -> FrameId {
        self.push(None, FrameKind::Root)
    }

    /// Create a child frame. This is the only way child scopes come into
    /// existence.
    pub fn child(&mut self, parent: FrameId, kind: FrameKind) -> FrameId {
        self.push(Some(parent), kind)
    }

    fn push(&mut self, parent: Option<FrameId>, kind: FrameKind) -> FrameId {
        let id = FrameId(self.frames.len() as u32);
        self.frames.push(LocalFrame::new(parent, kind));
        id
    }

    /// Declare a binding in `frame`. Fails (returning the clashing name)
    /// if the name is already declared in that frame; ancestor frames are
    /// not consulted, shadowing across frames is intentional.
    pub fn declare(
        &mut self,
        frame: FrameId,
        name: SymbolId,
        kind: BindingKind,
    ) -> std::result::Result<BindingId, SymbolId> {
        if self.frames[frame.0 as usize].bindings.contains_key(&name) {
            return Err(name);
        }
        let id = BindingId(self.bindings.len() as u32);
        self.bindings.push(LocalBinding { name, kind, frame });
        let f = &mut self.frames[frame.0 as usize];
        f.bindings.insert(name, id);
        f.order.push(id);
        Ok(id)
    }

    /// Resolve a name, walking this frame then the parent chain. The
    /// first binding found wins. A miss here falls through to the global
    /// var namespace, which the analyzer consults next.
    pub fn resolve(&self, frame: FrameId, name: SymbolId) -> Option<BindingId> {
        let mut current = Some(frame);
        while let Some(id) = current {
            let f = &self.frames[id.0 as usize];
            if let Some(binding) = f.get(name) {
                return Some(binding);
            }
            current = f.parent;
        }
        None
    }

    pub fn frame(&self, id: FrameId) -> &LocalFrame {
        &self.frames[id.0 as usize]
    }

    pub fn binding(&self, id: BindingId) -> &LocalBinding {
        &self.bindings[id.0 as usize]
    }

    /// Is this frame a function boundary (a `recur` target, with an
    /// active arity)?
    pub fn is_function_boundary(&self, id: FrameId) -> bool {
        matches!(self.frame(id).kind, FrameKind::Fn { .. })
    }

    /// Is this frame a `try` or `catch` boundary?
    pub fn is_try_boundary(&self, id: FrameId) -> bool {
        matches!(self.frame(id).kind, FrameKind::Try | FrameKind::Catch)
    }

    /// Find the innermost enclosing function boundary, noting whether the
    /// walk crosses a `try` boundary on the way.
    pub fn recur_target(&self, frame: FrameId) -> Option<RecurTarget> {
        let mut crosses_try = false;
        let mut current = Some(frame);
        while let Some(id) = current {
            let f = self.frame(id);
            if matches!(f.kind, FrameKind::Fn { .. }) {
                return Some(RecurTarget { frame: id, crosses_try });
            }
            if self.is_try_boundary(id) {
                crosses_try = true;
            }
            current = f.parent;
        }
        None
    }

    /// Total frames allocated
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
