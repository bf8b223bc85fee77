//! Plan/operation shapes (`spec.md` §4.7, GLOSSARY "Plan / operation").

/// What the manager should do with one node in a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Not yet installed: run its install guide.
    Install,
    /// Installed at a different version: run its update guide.
    Update,
    /// The root of the request, not yet installed: run its install guide
    /// with `explicit=true`.
    Target,
    /// Already installed at the resolved version: nothing to do.
    Noop,
}

/// One planned action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub kind: OperationKind,
    pub source: String,
    /// `USER/PACKAGE`.
    pub package_ref: String,
    pub version: String,
    /// Set when this op's source isn't configured yet but an earlier dep in
    /// the walk will add it via `add-repo` (`spec.md` §4.7 step 3).
    pub footnote: Option<String>,
}

/// A flat, ordered list of operations: dependencies first, root op last.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub operations: Vec<Operation>,
}

impl Plan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.iter().all(|op| op.kind == OperationKind::Noop)
    }
}
