//! Pattern classes deciding whether a name is owned by an identity, and the substitutions
//! that move an owned name to a new identity.
//!
//! Every class is a positional rule on top of a plain substring search: an occurrence of the
//! identity only counts when the characters around it put it in an owning position. This
//! keeps `Foo.Orig.Bar` or `Original.Bar` from being mistaken for names owned by `Orig`.

use strum::Display;

/// A position in which an identity owns a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Pattern {
    /// The name is the identity: `Orig`
    Exact,
    /// The name is a dotted path below the identity: `Orig.Foo`
    Namespace,
    /// A compiler generated name embeds the identity: `<Orig.Foo>k__BackingField`,
    /// `<Orig-Bar>d__0`
    Synthetic,
    /// An assembly qualified type string embeds the identity: `List[[Orig.Foo, Orig]]`,
    /// `Foo,Orig.Bar`
    Qualified,
}

impl Pattern {
    /// Every pattern class, used by the idempotence guard
    pub const ALL: [Pattern; 4] = [
        Pattern::Exact,
        Pattern::Namespace,
        Pattern::Synthetic,
        Pattern::Qualified,
    ];

    /// Whether `identity` owns `name` in this position
    #[must_use]
    pub fn matches(self, name: &str, identity: &str) -> bool {
        if identity.is_empty() {
            return false;
        }

        match self {
            Pattern::Exact => name == identity,
            Pattern::Namespace => name
                .strip_prefix(identity)
                .is_some_and(|rest| rest.starts_with('.')),
            Pattern::Synthetic => occurrences(name, identity).any(|(before, after)| {
                before.ends_with('<') && after.starts_with(['.', '-'])
            }),
            Pattern::Qualified => occurrences(name, identity).any(|(before, after)| {
                before.trim_end_matches(' ').ends_with([',', '['])
                    && after.starts_with('.')
            }),
        }
    }
}

/// A strategy for replacing an owned identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Substitution {
    /// Replace a leading `original` that is the whole name or is followed by a dot. Used for
    /// full namespace strings
    Prefix,
    /// Replace every `original.` that starts a dotted path, plus `original` standing in the
    /// assembly slot of an assembly qualified type string (`Orig.Foo, Orig`)
    Dotted,
    /// Replace `<original.` and `<original-`
    Synthetic,
}

impl Substitution {
    /// Apply the substitution, returning the possibly unchanged name
    #[must_use]
    pub fn apply(self, name: &str, original: &str, new: &str) -> String {
        if original.is_empty() {
            return name.to_string();
        }

        match self {
            Substitution::Prefix => {
                if Pattern::Exact.matches(name, original) || Pattern::Namespace.matches(name, original)
                {
                    format!("{new}{}", &name[original.len()..])
                } else {
                    name.to_string()
                }
            }
            Substitution::Dotted => replace_where(name, original, new, |before, after| {
                starts_path(before)
                    && (after.starts_with('.')
                        || (in_assembly_slot(before)
                            && (after.is_empty() || after.starts_with([',', ']']))))
            }),
            Substitution::Synthetic => replace_where(name, original, new, |before, after| {
                before.ends_with('<') && after.starts_with(['.', '-'])
            }),
        }
    }
}

/// Every occurrence of `needle` as `(text before, text after)`
fn occurrences<'a>(name: &'a str, needle: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> {
    name.match_indices(needle)
        .map(move |(at, _)| (&name[..at], &name[at + needle.len()..]))
}

/// Whether an occurrence following `before` begins a new dotted path rather than continuing
/// an identifier or a path owned by something else
fn starts_path(before: &str) -> bool {
    before
        .chars()
        .next_back()
        .map_or(true, |c| !(c.is_alphanumeric() || matches!(c, '_' | '.' | '`' | '+' | '-' | '$')))
}

/// Whether an occurrence following `before` is the assembly part of `Type, Assembly`
fn in_assembly_slot(before: &str) -> bool {
    before.trim_end_matches(' ').ends_with(',')
}

fn replace_where<F>(name: &str, original: &str, new: &str, accept: F) -> String
where
    F: Fn(&str, &str) -> bool,
{
    let mut out = String::with_capacity(name.len());
    let mut copied = 0;

    for (at, _) in name.match_indices(original) {
        let end = at + original.len();
        if accept(&name[..at], &name[end..]) {
            out.push_str(&name[copied..at]);
            out.push_str(new);
            copied = end;
        }
    }

    out.push_str(&name[copied..]);
    out
}
