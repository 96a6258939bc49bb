//! Error identities and the fact types that track them through the
//! call graph: `ReturnFact`, `ParamCheckFact`, and the intraprocedural
//! `CheckSet` lattice.

use std::cmp::Ordering;

use crate::symbol::Symbol;

/// A canonical handle to one distinct error a function may return.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorIdentity {
    /// A package-level error value: `package path + symbol name`.
    Sentinel(Symbol),
    /// A concrete type whose value implements the error interface.
    TypeError(Symbol),
}

impl ErrorIdentity {
    #[must_use]
    pub fn name(self) -> Symbol {
        match self {
            ErrorIdentity::Sentinel(s) | ErrorIdentity::TypeError(s) => s,
        }
    }

    /// Identities from a foreign package are unreachable to an external
    /// `Is`/`As` check unless their symbol is exported.
    #[must_use]
    pub fn is_reachable_from_foreign_package(self) -> bool {
        self.name().is_exported()
    }
}

impl Ord for ErrorIdentity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name().cmp(&other.name()).then_with(|| {
            let rank = |id: &ErrorIdentity| matches!(id, ErrorIdentity::TypeError(_)) as u8;
            rank(self).cmp(&rank(other))
        })
    }
}

impl PartialOrd for ErrorIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One element of a `ReturnFact`: a concrete identity, or a passthrough
/// marker standing in for "whatever identity flows through parameter `i`".
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum FactElem {
    Identity(ErrorIdentity),
    /// `param:i` — returns the error passed as parameter `i`, possibly wrapped.
    Param(u32),
    /// `call:i` — invokes the function passed as parameter `i` and returns
    /// its result.
    Call(u32),
}

impl FactElem {
    #[must_use]
    pub fn as_identity(self) -> Option<ErrorIdentity> {
        match self {
            FactElem::Identity(id) => Some(id),
            FactElem::Param(_) | FactElem::Call(_) => None,
        }
    }

    fn sort_key(self) -> (u8, Symbol, u32) {
        match self {
            FactElem::Identity(id) => (0, id.name(), 0),
            FactElem::Param(i) => (1, Symbol::intern(""), i),
            FactElem::Call(i) => (2, Symbol::intern(""), i),
        }
    }
}

impl Ord for FactElem {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FactElem::Identity(a), FactElem::Identity(b)) => a.cmp(b),
            _ => self.sort_key().cmp(&other.sort_key()),
        }
    }
}

impl PartialOrd for FactElem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A finite set of `FactElem`s, stored as a sorted, deduplicated array so
/// that set equality (the fixed-point convergence check in the propagator)
/// is a single `O(n)` vector comparison rather than a hash-set comparison.
#[derive(Clone, Eq, PartialEq, Default, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ReturnFact {
    elements: Vec<FactElem>,
}

impl ReturnFact {
    #[must_use]
    pub fn empty() -> Self {
        ReturnFact { elements: Vec::new() }
    }

    /// Build from an arbitrary (possibly unsorted, possibly duplicated)
    /// iterator of elements.
    pub fn from_elems(elems: impl IntoIterator<Item = FactElem>) -> Self {
        let mut elements: Vec<FactElem> = elems.into_iter().collect();
        elements.sort_unstable();
        elements.dedup();
        ReturnFact { elements }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[FactElem] {
        &self.elements
    }

    pub fn insert(&mut self, elem: FactElem) -> bool {
        match self.elements.binary_search(&elem) {
            Ok(_) => false,
            Err(idx) => {
                self.elements.insert(idx, elem);
                true
            }
        }
    }

    /// Union in place; returns whether anything new was added (used by the
    /// propagator to detect progress toward the fixed point).
    pub fn union_with(&mut self, other: &ReturnFact) -> bool {
        let mut changed = false;
        for &elem in &other.elements {
            changed |= self.insert(elem);
        }
        changed
    }

    /// Only the concrete identities, with unreachable (unexported foreign)
    /// identities removed — the view a cross-package fact-store publication
    /// or an external caller's obligation set is built from.
    pub fn reachable_identities(&self, in_defining_package: bool) -> Vec<ErrorIdentity> {
        self.elements
            .iter()
            .filter_map(|e| e.as_identity())
            .filter(|id| in_defining_package || id.is_reachable_from_foreign_package())
            .collect()
    }

    pub fn param_markers(&self) -> impl Iterator<Item = u32> + '_ {
        self.elements.iter().filter_map(|e| match e {
            FactElem::Param(i) => Some(*i),
            _ => None,
        })
    }

    pub fn call_markers(&self) -> impl Iterator<Item = u32> + '_ {
        self.elements.iter().filter_map(|e| match e {
            FactElem::Call(i) => Some(*i),
            _ => None,
        })
    }
}

impl FromIterator<FactElem> for ReturnFact {
    fn from_iter<T: IntoIterator<Item = FactElem>>(iter: T) -> Self {
        ReturnFact::from_elems(iter)
    }
}

/// The set of error identities checked, inside a function body, before a
/// given parameter of error or function type escapes (returns or is passed
/// to an unknown consumer).
#[derive(Clone, Eq, PartialEq, Default, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamCheckFact {
    pub param: u32,
    checked: Vec<ErrorIdentity>,
}

impl ParamCheckFact {
    #[must_use]
    pub fn new(param: u32, checked: impl IntoIterator<Item = ErrorIdentity>) -> Self {
        let mut checked: Vec<ErrorIdentity> = checked.into_iter().collect();
        checked.sort_unstable();
        checked.dedup();
        ParamCheckFact { param, checked }
    }

    pub fn checked(&self) -> &[ErrorIdentity] {
        &self.checked
    }

    #[must_use]
    pub fn is_checked(&self, identity: ErrorIdentity) -> bool {
        self.checked.binary_search(&identity).is_ok()
    }

    /// An identity is pre-checked by a method set only if *every*
    /// implementation checks it (spec §4.2: interface `ParamCheckFact`s are
    /// the intersection across implementations).
    #[must_use]
    pub fn intersect<'a>(param: u32, facts: impl IntoIterator<Item = &'a ParamCheckFact>) -> Self {
        let mut facts = facts.into_iter();
        let Some(first) = facts.next() else {
            return ParamCheckFact::new(param, []);
        };
        let mut shared: Vec<ErrorIdentity> = first.checked.clone();
        for fact in facts {
            shared.retain(|id| fact.is_checked(*id));
        }
        ParamCheckFact::new(param, shared)
    }
}

/// The intraprocedural dataflow lattice element tracked per program point:
/// which identities have been compared against the error variable in
/// scope. Union along a single path. `dataflow.rs`'s branch join also
/// unions rather than intersects (no type-narrowing means a branch can't
/// be credited with ruling an identity out, so intersecting would punish
/// an else-if identity-dispatch chain); `intersect`/`intersect_all` below
/// back the one place a meet genuinely is wanted — folding a published
/// `ParamCheckFact` across every implementation of an interface method,
/// where a check is reported through the interface only if *every*
/// implementation performs it.
#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct CheckSet {
    checked: Vec<ErrorIdentity>,
}

impl CheckSet {
    #[must_use]
    pub fn empty() -> Self {
        CheckSet { checked: Vec::new() }
    }

    #[must_use]
    pub fn single(identity: ErrorIdentity) -> Self {
        CheckSet { checked: vec![identity] }
    }

    pub fn contains(&self, identity: ErrorIdentity) -> bool {
        self.checked.binary_search(&identity).is_ok()
    }

    pub fn insert(&mut self, identity: ErrorIdentity) {
        if let Err(idx) = self.checked.binary_search(&identity) {
            self.checked.insert(idx, identity);
        }
    }

    /// Union: checks seen on *either* of two sequential program points along
    /// one path are both in scope afterward.
    #[must_use]
    pub fn union(&self, other: &CheckSet) -> CheckSet {
        let mut out = self.clone();
        for &id in &other.checked {
            out.insert(id);
        }
        out
    }

    /// Meet at a control-flow join: only identities checked on *every*
    /// incoming path survive.
    #[must_use]
    pub fn intersect(&self, other: &CheckSet) -> CheckSet {
        CheckSet {
            checked: self
                .checked
                .iter()
                .filter(|id| other.contains(**id))
                .copied()
                .collect(),
        }
    }

    /// Meet over an arbitrary number of incoming paths; an empty set of
    /// predecessors (dead/unreachable join) contributes nothing checked.
    #[must_use]
    pub fn intersect_all<'a>(sets: impl IntoIterator<Item = &'a CheckSet>) -> CheckSet {
        let mut sets = sets.into_iter();
        let Some(first) = sets.next() else {
            return CheckSet::empty();
        };
        let mut acc = first.clone();
        for set in sets {
            acc = acc.intersect(set);
        }
        acc
    }

    pub fn checked_identities(&self) -> &[ErrorIdentity] {
        &self.checked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sentinel(name: &str) -> ErrorIdentity {
        ErrorIdentity::Sentinel(Symbol::intern(name))
    }

    #[test]
    fn return_fact_sorts_and_dedups() {
        let a = sentinel("pkg.ErrB");
        let b = sentinel("pkg.ErrA");
        let fact = ReturnFact::from_elems([
            FactElem::Identity(a),
            FactElem::Identity(b),
            FactElem::Identity(a),
        ]);
        assert_eq!(fact.elements().len(), 2);
        assert_eq!(fact.elements()[0], FactElem::Identity(b));
        assert_eq!(fact.elements()[1], FactElem::Identity(a));
    }

    #[test]
    fn union_with_reports_progress() {
        let mut fact = ReturnFact::from_elems([FactElem::Identity(sentinel("pkg.ErrA"))]);
        let more = ReturnFact::from_elems([FactElem::Identity(sentinel("pkg.ErrB"))]);
        assert!(fact.union_with(&more));
        assert!(!fact.union_with(&more));
        assert_eq!(fact.elements().len(), 2);
    }

    #[test]
    fn reachable_identities_filters_unexported_foreign() {
        let fact = ReturnFact::from_elems([
            FactElem::Identity(sentinel("pkg.ErrPublic")),
            FactElem::Identity(sentinel("pkg.errPrivate")),
        ]);
        let reachable = fact.reachable_identities(false);
        assert_eq!(reachable, vec![sentinel("pkg.ErrPublic")]);
        assert_eq!(fact.reachable_identities(true).len(), 2);
    }

    #[test]
    fn param_check_fact_intersection() {
        let a = sentinel("pkg.ErrA");
        let b = sentinel("pkg.ErrB");
        let impl1 = ParamCheckFact::new(0, [a, b]);
        let impl2 = ParamCheckFact::new(0, [a]);
        let merged = ParamCheckFact::intersect(0, [&impl1, &impl2]);
        assert_eq!(merged.checked(), &[a]);
    }

    #[test]
    fn check_set_intersection_requires_all_paths() {
        let a = sentinel("pkg.ErrA");
        let b = sentinel("pkg.ErrB");
        let left = CheckSet::single(a).union(&CheckSet::single(b));
        let right = CheckSet::single(a);
        let joined = left.intersect(&right);
        assert!(joined.contains(a));
        assert!(!joined.contains(b));
    }
}
