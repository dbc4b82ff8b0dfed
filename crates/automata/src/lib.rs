//! This library provides the finite automata used by the [`rexfa`] crate:
//! Nondeterministic Finite Automata (NFA) with epsilon transitions,
//! Deterministic Finite Automata (DFA) obtained by subset construction and
//! minimized by table-filling, and the conversion of an automaton back into
//! a regular expression by state elimination.
//!
//! Transitions are labeled by opaque [`Symbol`]s (a literal character, an
//! escape sequence such as `\d` or a character class such as `[a-z]`). The
//! epsilon label is represented by `None`.
//!
//! Automata are exchanged with the outside world through the plain
//! node/edge [`Graph`] form.
//!
//! [`rexfa`]: <https://crates.io/crates/rexfa>
use std::{borrow::Borrow, fmt};

pub mod nfa;
pub use nfa::{IdCounter, StateBuilder, TooManyStates, NFA};

pub mod dfa;
pub use dfa::DFA;

pub mod expr;
pub use expr::Expr;

pub mod graph;
pub use graph::{Definition, Edge, Graph, Node, Position, TransitionRow};

#[cfg(feature = "dot")]
pub mod dot;

/// Textual marker of the epsilon label in graphs and tables.
pub const EPSILON: &str = "ε";

/// Automaton state identifier.
pub type StateId = u32;

/// Automata error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("no accepting state is reachable from the start state")]
	EmptyGraph,

	#[error("invalid DFA transition symbol `{symbol}` out of state `{state}`")]
	InvalidTransitionSymbol { state: String, symbol: String },

	#[error("unknown node `{0}`")]
	UnknownNode(String),

	#[error("unknown DFA state {0}")]
	UnknownState(usize),

	#[error(transparent)]
	TooManyStates(#[from] TooManyStates),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Transition symbol.
///
/// A symbol is opaque to the automata: `a`, `\d` and `[a-z]` are three
/// distinct, unrelated symbols.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
	feature = "serde",
	derive(serde::Serialize, serde::Deserialize),
	serde(transparent)
)]
pub struct Symbol(String);

impl Symbol {
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_string(self) -> String {
		self.0
	}

	/// Checks if this symbol denotes a single pattern atom.
	///
	/// Atoms are single characters, escape sequences and character classes.
	/// Any other label (e.g. a hand-written `ab` edge) denotes a sequence
	/// and must be grouped before a postfix operator is applied to it.
	pub fn is_atomic(&self) -> bool {
		let mut chars = self.0.chars();
		match (chars.next(), chars.next()) {
			(Some(_), None) => true,
			(Some('\\'), Some(_)) => chars.next().is_none(),
			(Some('['), Some(_)) => self.0.ends_with(']'),
			_ => false,
		}
	}
}

impl Borrow<str> for Symbol {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl From<char> for Symbol {
	fn from(value: char) -> Self {
		Self(value.to_string())
	}
}

impl<'a> From<&'a str> for Symbol {
	fn from(value: &'a str) -> Self {
		Self(value.to_owned())
	}
}

impl From<String> for Symbol {
	fn from(value: String) -> Self {
		Self(value)
	}
}

impl fmt::Display for Symbol {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Formats an optional label, using [`EPSILON`] for `None`.
pub(crate) fn label_str(label: Option<&Symbol>) -> &str {
	match label {
		Some(symbol) => symbol.as_str(),
		None => EPSILON,
	}
}
