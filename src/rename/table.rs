//! The rename table and the call-site rules applied through it.

use std::fmt;

use crate::{
    rename::pattern::{Pattern, Substitution},
    Error, Result,
};

/// How a particular kind of name is matched and rewritten.
///
/// A rule matches when any of its patterns matches. Its substitutions are alternatives: the
/// first one that changes the name is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    /// Positions in which the original identity must appear
    pub patterns: &'static [Pattern],
    /// Substitutions tried in order
    pub substitutions: &'static [Substitution],
}

impl Rule {
    /// Full namespace strings of type definitions, type references and exported types
    pub const NAMESPACE: Rule = Rule {
        patterns: &[Pattern::Exact, Pattern::Namespace],
        substitutions: &[Substitution::Prefix],
    };

    /// Member names: explicit interface implementations (`Orig.IFoo.Method`), backing fields
    /// and names embedding assembly qualified type strings
    pub const MEMBER_NAME: Rule = Rule {
        patterns: &[Pattern::Namespace, Pattern::Synthetic, Pattern::Qualified],
        substitutions: &[Substitution::Dotted, Substitution::Synthetic],
    };

    /// Compiler generated type and field names only: `<Orig-Bar>d__0`
    pub const SYNTHETIC: Rule = Rule {
        patterns: &[Pattern::Synthetic],
        substitutions: &[Substitution::Synthetic],
    };

    /// String data: `ldstr` literals and attribute strings
    pub const LITERAL: Rule = Rule {
        patterns: &[Pattern::Namespace, Pattern::Qualified],
        substitutions: &[Substitution::Dotted],
    };

    /// Assembly title and description
    pub const TITLE: Rule = Rule {
        patterns: &[Pattern::Exact, Pattern::Namespace],
        substitutions: &[Substitution::Prefix],
    };
}

/// One `original -> new` identity mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEntry {
    /// Identity before the rewrite
    pub original: String,
    /// Identity after the rewrite
    pub new: String,
}

impl RenameEntry {
    /// Whether the idempotence guard holds `name` back from this entry.
    ///
    /// A name already owned by the new identity is not rewritten again. When the new identity
    /// is itself a parent path of the original (`Orig.Core -> Orig`) every name owned by the
    /// original is also owned by the new identity, so only names the original no longer owns
    /// are held back.
    fn guards(&self, name: &str) -> bool {
        let owned_by_new = Pattern::ALL.iter().any(|p| p.matches(name, &self.new));
        if !owned_by_new {
            return false;
        }

        if Pattern::Namespace.matches(&self.original, &self.new) {
            return !Pattern::ALL.iter().any(|p| p.matches(name, &self.original));
        }

        true
    }

    fn rewrite(&self, name: &str, rule: &Rule) -> Option<String> {
        if !rule.patterns.iter().any(|p| p.matches(name, &self.original)) || self.guards(name) {
            return None;
        }

        rule.substitutions
            .iter()
            .map(|sub| sub.apply(name, &self.original, &self.new))
            .find(|rewritten| rewritten != name)
    }
}

impl fmt::Display for RenameEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.original, self.new)
    }
}

/// Mapping from original identities to new identities.
///
/// Built once per request and read-only while modules are rewritten. Entries keep their
/// insertion order, which is the order in which they are tried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameTable {
    entries: Vec<RenameEntry>,
}

impl RenameTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        RenameTable::default()
    }

    /// Build a table from `(original, new)` pairs
    ///
    /// # Errors
    /// Returns [`Error::DuplicateIdentity`] if an identity repeats, see [`RenameTable::insert`].
    pub fn from_pairs<I, O, N>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (O, N)>,
        O: Into<String>,
        N: Into<String>,
    {
        let mut table = RenameTable::new();
        for (original, new) in pairs {
            table.insert(original, new)?;
        }
        Ok(table)
    }

    /// Append a mapping
    ///
    /// # Errors
    /// Returns [`Error::DuplicateIdentity`] if `original` is already mapped or already the
    /// target of a mapping, or if `new` is already mapped or already the target of a mapping.
    /// A mapping to itself is allowed. Returns [`Error::Error`] for an empty identity.
    pub fn insert(&mut self, original: impl Into<String>, new: impl Into<String>) -> Result<()> {
        let original = original.into();
        let new = new.into();

        if original.is_empty() || new.is_empty() {
            return Err(Error::Error(format!(
                "Empty identity in mapping '{original}' -> '{new}'"
            )));
        }
        // Identities are unique across both sides: `A -> B` with `B -> C` would overwrite B
        if self
            .entries
            .iter()
            .any(|e| e.original == original || e.new == original)
        {
            return Err(Error::DuplicateIdentity(original));
        }
        if self
            .entries
            .iter()
            .any(|e| e.new == new || e.original == new)
        {
            return Err(Error::DuplicateIdentity(new));
        }

        self.entries.push(RenameEntry { original, new });
        Ok(())
    }

    /// All mappings in lookup order
    #[must_use]
    pub fn entries(&self) -> &[RenameEntry] {
        &self.entries
    }

    /// The new identity `original` is renamed to, if it is in the table
    #[must_use]
    pub fn new_identity(&self, original: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.original == original)
            .map(|e| e.new.as_str())
    }

    /// Number of mappings
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no mappings
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrite `name` under `rule`.
    ///
    /// The first entry whose patterns match, that the idempotence guard does not hold back
    /// and whose substitution changes the name wins. Entries are never compounded. Returns
    /// `None` when the name stays as it is.
    #[must_use]
    pub fn rewrite(&self, name: &str, rule: &Rule) -> Option<String> {
        if name.is_empty() {
            return None;
        }

        self.entries.iter().find_map(|entry| entry.rewrite(name, rule))
    }

    /// Whether [`RenameTable::rewrite`] would change `name`
    #[must_use]
    pub fn is_rewritable(&self, name: &str, rule: &Rule) -> bool {
        self.rewrite(name, rule).is_some()
    }
}
