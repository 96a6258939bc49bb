//! Interned fully-qualified names.
//!
//! `Symbol` is a cheap `Copy` handle into a process-wide interner. Unlike a
//! per-compilation interner scoped to a single `Db`, this one is global: the
//! fact store outlives any single package's analysis (spec §3, §6 — facts
//! persist across a whole-program run keyed by fully qualified name), so the
//! handle space needs to be stable for the lifetime of the process, not just
//! one package's pass.
//!
//! Equality and hashing of `Symbol` are O(1) integer comparisons, but the
//! canonical identity — the thing that crosses the fact-store boundary — is
//! always the underlying string, recovered via [`Symbol::as_str`].

use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

struct Interner {
    by_str: RwLock<FxHashMap<Arc<str>, Symbol>>,
    by_id: RwLock<Vec<Arc<str>>>,
}

impl Interner {
    fn new() -> Self {
        Interner {
            by_str: RwLock::new(FxHashMap::default()),
            by_id: RwLock::new(Vec::new()),
        }
    }

    // The table index is bounded by u32::MAX by construction (`Symbol` is a
    // u32 newtype) and every `Symbol` handed out was produced by this same
    // process-wide interner, so both invariants below can't actually fail.
    #[allow(clippy::expect_used)]
    fn intern(&self, s: &str) -> Symbol {
        if let Some(sym) = self.by_str.read().get(s) {
            return *sym;
        }
        let mut by_str = self.by_str.write();
        if let Some(sym) = by_str.get(s) {
            return *sym;
        }
        let mut by_id = self.by_id.write();
        let arc: Arc<str> = Arc::from(s);
        let id = Symbol(u32::try_from(by_id.len()).expect("symbol table exceeded u32::MAX entries"));
        by_id.push(arc.clone());
        by_str.insert(arc, id);
        id
    }

    #[allow(clippy::expect_used)]
    fn resolve(&self, sym: Symbol) -> Arc<str> {
        self.by_id.read().get(sym.0 as usize).cloned().expect("Symbol not produced by this interner")
    }
}

static INTERNER: OnceLock<Interner> = OnceLock::new();

fn interner() -> &'static Interner {
    INTERNER.get_or_init(Interner::new)
}

/// An interned, fully qualified name: a package path plus a symbol name
/// (e.g. `"example.com/pkg".ErrNotFound`, stored as one string
/// `"example.com/pkg.ErrNotFound"`).
///
/// `Ord` compares the underlying string, not the interned id: `ReturnFact`
/// relies on symbols sorting by fully qualified name (spec's sorted-array
/// convergence check), and intern order is just allocation order.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Symbol(u32);

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        if self.0 == other.0 {
            std::cmp::Ordering::Equal
        } else {
            self.as_str().cmp(&other.as_str())
        }
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Symbol {
    /// Intern a fully qualified name, returning a stable handle.
    pub fn intern(s: &str) -> Symbol {
        interner().intern(s)
    }

    /// Recover the original string.
    #[must_use]
    pub fn as_str(self) -> Arc<str> {
        interner().resolve(self)
    }

    /// The package path portion (everything before the last `.`), or the
    /// whole name if there is no `.`.
    #[must_use]
    pub fn package_path(self) -> Arc<str> {
        let s = self.as_str();
        match s.rfind('.') {
            Some(idx) => Arc::from(&s[..idx]),
            None => s,
        }
    }

    /// The bare symbol name portion (everything after the last `.`).
    #[must_use]
    pub fn local_name(self) -> Arc<str> {
        let s = self.as_str();
        match s.rfind('.') {
            Some(idx) => Arc::from(&s[idx + 1..]),
            None => s,
        }
    }

    /// Exported per the target language's convention: the local name's
    /// first character is an uppercase ASCII letter.
    #[must_use]
    pub fn is_exported(self) -> bool {
        self.local_name()
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_uppercase())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(feature = "cache")]
impl serde::Serialize for Symbol {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_str())
    }
}

#[cfg(feature = "cache")]
impl<'de> serde::Deserialize<'de> for Symbol {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Symbol::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable() {
        let a = Symbol::intern("pkg.ErrAlpha");
        let b = Symbol::intern("pkg.ErrAlpha");
        assert_eq!(a, b);
        assert_eq!(&*a.as_str(), "pkg.ErrAlpha");
    }

    #[test]
    fn distinct_strings_distinct_symbols() {
        let a = Symbol::intern("pkg.ErrAlpha");
        let b = Symbol::intern("pkg.ErrBeta");
        assert_ne!(a, b);
    }

    #[test]
    fn exported_rule() {
        assert!(Symbol::intern("pkg.ErrPublic").is_exported());
        assert!(!Symbol::intern("pkg.errPrivate").is_exported());
    }

    #[test]
    fn package_path_split() {
        let sym = Symbol::intern("example.com/pkg.CustomError");
        assert_eq!(&*sym.package_path(), "example.com/pkg");
        assert_eq!(&*sym.local_name(), "CustomError");
    }
}
