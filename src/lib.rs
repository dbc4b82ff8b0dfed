//! Rexfa compiles regular expressions into finite automata, and finite
//! automata back into regular expressions.
//!
//! The forward pipeline turns a pattern into a Thompson NFA, then into a
//! DFA by subset construction, and finally minimizes the DFA:
//!
//! ```
//! let dfa = rexfa::compile_dfa("a(b|c)*d").unwrap();
//! assert_eq!(dfa.len(), 3);
//! assert!(dfa.accepts_str("abbcbcd"));
//! ```
//!
//! The reverse pipeline turns any automaton, typically authored by hand as
//! a [`Graph`], into an equivalent pattern by state elimination:
//!
//! ```
//! use rexfa::{Edge, Graph, Node};
//!
//! let graph = Graph {
//! 	nodes: vec![Node::new("q0", false), Node::new("q1", false), Node::new("q2", true)],
//! 	edges: vec![Edge::new("q0", "q1", "a"), Edge::new("q1", "q2", "b")],
//! 	start_node_id: None,
//! };
//!
//! assert_eq!(rexfa::graph_to_regex(&graph).unwrap(), "ab");
//! ```
//!
//! This library does not match patterns against text: symbols are opaque,
//! `\d` being a transition label like any other.
pub use rexfa_automata as automata;
pub use rexfa_automata::{Definition, Edge, Expr, Graph, Node, Position, Symbol, TransitionRow, DFA, NFA};
pub use rexfa_syntax as syntax;
pub use rexfa_syntax::{Operator, Repeat, Token, TokenKind};

mod compiler;
pub use compiler::*;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Syntax(#[from] rexfa_syntax::Error),

	#[error(transparent)]
	Automata(#[from] rexfa_automata::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Compilation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
	pub syntax: rexfa_syntax::Options,

	/// Maximum number of states allocated by a compilation session.
	pub state_limit: Option<u32>,

	/// Minimize the DFA built by [`Compiler::compile_dfa`].
	pub minimize: bool,
}

impl Default for Options {
	fn default() -> Self {
		Self {
			syntax: rexfa_syntax::Options::default(),
			state_limit: None,
			minimize: true,
		}
	}
}

/// Compiles `pattern` into a Thompson NFA, with the default options.
pub fn compile(pattern: &str) -> Result<NFA> {
	Compiler::default().compile(pattern)
}

/// Compiles `pattern` into a minimal DFA, with the default options.
pub fn compile_dfa(pattern: &str) -> Result<DFA> {
	Compiler::default().compile_dfa(pattern)
}

/// Converts the automaton described by `graph` into an equivalent regular
/// expression.
pub fn graph_to_regex(graph: &Graph) -> Result<String> {
	Ok(graph.to_nfa()?.to_regex()?)
}
