//! Structured rewrite events.
//!
//! The rewrite engine never writes to the console. It reports what it does as
//! [`RewriteEvent`]s delivered to an [`EventSink`] supplied by the caller. [`LogSink`] forwards
//! them to the `log` facade, closures can be used to collect or redirect them, and
//! [`NullSink`] discards them.
//!
//! Events come in two levels. Lifecycle events (module started and finished, dependency
//! ordering decisions, attribute and title updates, signing) are always delivered. Node events
//! (a single name rewritten) are only delivered at [`Verbosity::Detailed`].

use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Kind of metadata node a name belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[allow(missing_docs)]
pub enum NodeKind {
    Namespace,
    TypeName,
    TypeRefNamespace,
    TypeRefName,
    ExportedType,
    Method,
    Field,
    Property,
    Event,
    GenericParam,
    MemberRef,
    StringLiteral,
    AttributeString,
}

/// Importance of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventLevel {
    /// Module level progress, always delivered
    Lifecycle,
    /// Per-node detail
    Detail,
}

/// How much the engine reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Verbosity {
    /// Lifecycle events only
    #[default]
    Normal,
    /// Lifecycle and per-node events
    Detailed,
}

impl Verbosity {
    /// Whether events of `level` are delivered at this verbosity
    #[must_use]
    pub fn admits(self, level: EventLevel) -> bool {
        match level {
            EventLevel::Lifecycle => true,
            EventLevel::Detail => self == Verbosity::Detailed,
        }
    }
}

/// Something the rewrite engine did.
#[derive(Debug, Clone, PartialEq)]
pub enum RewriteEvent {
    /// Rewriting of a module began
    ModuleStarted {
        /// Original identity
        identity: String,
        /// Source path
        path: PathBuf,
    },
    /// A module was rewritten and written out
    ModuleFinished {
        /// Original identity
        identity: String,
        /// New identity
        renamed: String,
        /// Destination path
        output: PathBuf,
    },
    /// A dependency in the rewrite set is rewritten before the module depending on it
    DependencyFirst {
        /// Identity of the depending module
        module: String,
        /// Identity of the dependency
        dependency: String,
    },
    /// A dependency is already being rewritten further up the stack
    DependencyCycle {
        /// Identity of the depending module
        module: String,
        /// Identity of the dependency
        dependency: String,
    },
    /// A dependency outside the rewrite set was located
    DependencyResolved {
        /// Identity of the depending module
        module: String,
        /// Identity of the dependency
        dependency: String,
        /// Where it was found, `None` for runtime provided assemblies
        path: Option<PathBuf>,
    },
    /// An assembly reference now points at a new identity
    DependencyUpdated {
        /// Identity of the depending module
        module: String,
        /// Previous name of the reference
        from: String,
        /// New name of the reference
        to: String,
    },
    /// A single name was rewritten
    NameRewritten {
        /// Kind of node
        kind: NodeKind,
        /// Previous name
        from: String,
        /// New name
        to: String,
    },
    /// A custom attribute had at least one name rewritten
    AttributeRewritten {
        /// Description of the node the attribute is attached to
        owner: String,
        /// Number of names rewritten in the attribute
        names: usize,
    },
    /// An assembly title or description attribute was updated
    TitleUpdated {
        /// Previous value
        from: String,
        /// New value
        to: String,
    },
    /// The output module was signed
    Signed {
        /// New identity of the module
        identity: String,
        /// Hex public key token of the signing key
        token: String,
    },
    /// Signing was requested but the key file does not exist
    SigningSkipped {
        /// Missing key file
        path: PathBuf,
    },
}

impl RewriteEvent {
    /// Importance of the event
    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            RewriteEvent::NameRewritten { .. } => EventLevel::Detail,
            _ => EventLevel::Lifecycle,
        }
    }
}

impl fmt::Display for RewriteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewriteEvent::ModuleStarted { identity, path } => {
                write!(f, "Rewriting {identity} ({})", path.display())
            }
            RewriteEvent::ModuleFinished {
                identity,
                renamed,
                output,
            } => write!(f, "Rewrote {identity} -> {renamed} ({})", output.display()),
            RewriteEvent::DependencyFirst { module, dependency } => {
                write!(f, "{module} depends on {dependency}, rewriting it first")
            }
            RewriteEvent::DependencyCycle { module, dependency } => write!(
                f,
                "{module} depends on {dependency}, which is already being rewritten (cycle)"
            ),
            RewriteEvent::DependencyResolved {
                module,
                dependency,
                path,
            } => match path {
                Some(path) => write!(f, "{module} depends on {dependency} at {}", path.display()),
                None => write!(f, "{module} depends on runtime assembly {dependency}"),
            },
            RewriteEvent::DependencyUpdated { module, from, to } => {
                write!(f, "{module}: reference {from} -> {to}")
            }
            RewriteEvent::NameRewritten { kind, from, to } => write!(f, "{kind}: {from} -> {to}"),
            RewriteEvent::AttributeRewritten { owner, names } => {
                write!(f, "Attribute on {owner}: {names} names rewritten")
            }
            RewriteEvent::TitleUpdated { from, to } => write!(f, "Title: {from} -> {to}"),
            RewriteEvent::Signed { identity, token } => {
                write!(f, "Signed {identity} (PublicKeyToken={token})")
            }
            RewriteEvent::SigningSkipped { path } => {
                write!(f, "Key file {} not found, output is not signed", path.display())
            }
        }
    }
}

/// Receiver of rewrite events.
///
/// Rewriting is single threaded, so sinks take `&self` and use interior mutability when they
/// need to record events.
pub trait EventSink {
    /// Deliver one event
    fn emit(&self, event: RewriteEvent);
}

impl<F: Fn(RewriteEvent)> EventSink for F {
    fn emit(&self, event: RewriteEvent) {
        self(event);
    }
}

/// Forward events to the `log` facade.
///
/// Lifecycle events are logged at `info`, node events at `debug`, signing problems at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: RewriteEvent) {
        match (&event, event.level()) {
            (RewriteEvent::SigningSkipped { .. }, _) => log::warn!("{event}"),
            (_, EventLevel::Lifecycle) => log::info!("{event}"),
            (_, EventLevel::Detail) => log::debug!("{event}"),
        }
    }
}

/// Discard every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: RewriteEvent) {}
}

/// Drops events the configured verbosity does not admit before they reach `inner`.
pub struct FilteredSink<'a> {
    inner: &'a dyn EventSink,
    verbosity: Verbosity,
}

impl<'a> FilteredSink<'a> {
    /// Wrap `inner`
    #[must_use]
    pub fn new(inner: &'a dyn EventSink, verbosity: Verbosity) -> Self {
        FilteredSink { inner, verbosity }
    }
}

impl EventSink for FilteredSink<'_> {
    fn emit(&self, event: RewriteEvent) {
        if self.verbosity.admits(event.level()) {
            self.inner.emit(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn rename_event() -> RewriteEvent {
        RewriteEvent::NameRewritten {
            kind: NodeKind::Namespace,
            from: "Orig".into(),
            to: "New".into(),
        }
    }

    #[test]
    fn test_filtered_sink_drops_detail_at_normal() {
        let seen = RefCell::new(Vec::new());
        let collect = |event: RewriteEvent| seen.borrow_mut().push(event);

        let sink = FilteredSink::new(&collect, Verbosity::Normal);
        sink.emit(rename_event());
        sink.emit(RewriteEvent::TitleUpdated {
            from: "Orig".into(),
            to: "New".into(),
        });

        assert_eq!(seen.borrow().len(), 1);
        assert!(matches!(seen.borrow()[0], RewriteEvent::TitleUpdated { .. }));
    }

    #[test]
    fn test_filtered_sink_passes_detail_when_detailed() {
        let seen = RefCell::new(Vec::new());
        let collect = |event: RewriteEvent| seen.borrow_mut().push(event);

        FilteredSink::new(&collect, Verbosity::Detailed).emit(rename_event());
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(rename_event().to_string(), "namespace: Orig -> New");
        assert_eq!("detailed".parse::<Verbosity>().unwrap(), Verbosity::Detailed);
    }
}
