//! Error types for the temporal graph store.
//!
//! Uses `thiserror` for ergonomic error definition with rich context, mirroring
//! the two-layer `Error { kind, context }` shape used throughout this crate family.

use std::fmt;

use thiserror::Error;

/// The main error type for epochweave operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a graph-name error (reserved or duplicate name).
    #[must_use]
    pub fn graph_name(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::GraphName(name.into()))
    }

    /// Creates an out-of-timeline error describing the rejected time move.
    #[must_use]
    pub fn out_of_timeline(from: Time, to: Time) -> Self {
        Self::new(ErrorKind::OutOfTimeline { from, to })
    }

    /// Creates a historical-write error: an attempted write earlier than the
    /// branch's committed extent.
    #[must_use]
    pub fn historical_write(at: Time, committed_through: Time) -> Self {
        Self::new(ErrorKind::HistoricalWrite {
            at,
            committed_through,
        })
    }

    /// Creates a forward-mode violation error.
    #[must_use]
    pub fn time_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Time(message.into()))
    }

    /// Creates a missing-entity error (graph, node, edge, or attribute).
    #[must_use]
    pub fn key_not_found(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::KeyNotFound(description.into()))
    }

    /// Creates an internal, fatal error. Recovery requires a restart.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }
}

/// A `(branch, turn, tick)` cursor position, used by error variants that need
/// to describe a rejected time move without depending on the timeline crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Time {
    /// Branch name.
    pub branch: String,
    /// Turn number.
    pub turn: u64,
    /// Tick number within the turn.
    pub tick: u64,
}

impl Time {
    /// Builds a `Time` triple.
    #[must_use]
    pub fn new(branch: impl Into<String>, turn: u64, tick: u64) -> Self {
        Self {
            branch: branch.into(),
            turn,
            tick,
        }
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.branch, self.turn, self.tick)
    }
}

/// Categorized error kinds for pattern matching.
///
/// The first five variants are the user-facing, recoverable class: mutators
/// that raise them must leave the journal and cache unchanged, as if the call
/// never happened. `Internal` is the fatal class; recovery requires a restart.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Graph name is reserved or already in use.
    #[error("graph name error: {0}")]
    GraphName(String),

    /// Requested time move is invalid (e.g. forward-mode branch change, or a
    /// jump the cursor state machine forbids).
    #[error("out of timeline: cannot move from {from} to {to}")]
    OutOfTimeline {
        /// The cursor position before the attempted move.
        from: Time,
        /// The rejected destination.
        to: Time,
    },

    /// Attempted write earlier than the branch's committed extent.
    #[error("historical write at {at}: branch is already committed through {committed_through}")]
    HistoricalWrite {
        /// Where the rejected write targeted.
        at: Time,
        /// The latest time already committed on that branch.
        committed_through: Time,
    },

    /// Forward-mode violation: turn regressed, skipped more than one step, or
    /// the branch changed while `advancing()` was active.
    #[error("time error: {0}")]
    Time(String),

    /// Missing graph, node, edge, or attribute.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Internal error: persistence failure or invariant violation. Fatal.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Component or operation name.
    pub source: Option<String>,
    /// Graph name, when the error is scoped to one graph.
    pub graph: Option<String>,
    /// Call-stack-like trail of operation names, innermost last.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the originating component or operation.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the graph this error is scoped to.
    #[must_use]
    pub fn with_graph(mut self, graph: impl Into<String>) -> Self {
        self.graph = Some(graph.into());
        self
    }

    /// Adds a frame to the operation trail.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
        }
        if let Some(graph) = &self.graph {
            write!(f, " (graph {graph})")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}

/// Convenience alias used throughout epochweave crates.
pub type Result<T> = std::result::Result<T, Error>;
