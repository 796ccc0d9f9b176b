//! Symbol interning.
//!
//! Symbols in the runtime are identity-equal exactly when their names are
//! equal, so every name is interned once and handled by a small `Atom` id.

use rustc_hash::FxHashMap;

/// Handle to an interned string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(pub u32);

/// Interns strings and hands out stable `Atom` ids.
#[derive(Debug, Default)]
pub struct Interner {
    map: FxHashMap<Box<str>, Atom>,
    names: Vec<Box<str>>,
}

impl Interner {
    pub fn new() -> Self {
        Interner {
            map: FxHashMap::default(),
            names: Vec::new(),
        }
    }

    /// Intern a string, returning the same `Atom` for equal inputs.
    pub fn intern(&mut self, name: &str) -> Atom {
        if let Some(&atom) = self.map.get(name) {
            return atom;
        }
        let atom = Atom(self.names.len() as u32);
        let boxed: Box<str> = name.into();
        self.names.push(boxed.clone());
        self.map.insert(boxed, atom);
        atom
    }

    /// Look up an already-interned string without interning it.
    pub fn get(&self, name: &str) -> Option<Atom> {
        self.map.get(name).copied()
    }

    /// Resolve an `Atom` back to its string.
    pub fn resolve(&self, atom: Atom) -> &str {
        self.names[atom.0 as usize].as_ref()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
