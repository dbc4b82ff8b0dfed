//! Plain node/edge interchange form of automata.
//!
//! This is the form in which automata are authored by hand or handed over
//! for display. Edge labels may list several symbols separated by commas,
//! the [`EPSILON`] marker (or an empty label) standing for an epsilon
//! transition.
//!
//! Inside a label, a backslash followed by a comma, a whitespace, a
//! backslash or `ε` stands for that character taken literally. Any other
//! backslash is part of the symbol (`\d`). This way `[a\,b]` is the single
//! class symbol `[a,b]`, and `\ε` the literal `ε` symbol.
use std::{
	collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
	fmt,
};

use crate::{label_str, Error, StateId, Symbol, DFA, EPSILON, NFA};

const COLUMN_WIDTH: f64 = 160.0;
const ROW_HEIGHT: f64 = 100.0;
const MARGIN: f64 = 80.0;

/// Node position on the display canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
	pub x: f64,
	pub y: f64,
}

/// Graph node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
	feature = "serde",
	derive(serde::Serialize, serde::Deserialize),
	serde(rename_all = "camelCase")
)]
pub struct Node {
	pub id: String,

	#[cfg_attr(feature = "serde", serde(default))]
	pub label: String,

	#[cfg_attr(feature = "serde", serde(default))]
	pub is_accept: bool,

	#[cfg_attr(feature = "serde", serde(default))]
	pub position: Position,
}

impl Node {
	pub fn new(id: impl Into<String>, is_accept: bool) -> Self {
		let id = id.into();
		Self {
			label: id.clone(),
			id,
			is_accept,
			position: Position::default(),
		}
	}
}

/// Graph edge.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
	pub from: String,
	pub to: String,

	#[cfg_attr(feature = "serde", serde(default))]
	pub label: String,
}

impl Edge {
	pub fn new(from: impl Into<String>, to: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			from: from.into(),
			to: to.into(),
			label: label.into(),
		}
	}

	/// Returns the symbols listed by the label of this edge, `None` standing
	/// for epsilon.
	pub fn symbols(&self) -> Vec<Option<Symbol>> {
		// Characters paired with whether they were escaped.
		let mut pieces: Vec<Vec<(char, bool)>> = Vec::new();
		let mut current = Vec::new();
		let mut chars = self.label.chars().peekable();
		while let Some(c) = chars.next() {
			match c {
				'\\' => match chars.next_if(|n| is_escapable(*n)) {
					Some(n) => current.push((n, true)),
					None => current.push(('\\', true)),
				},
				',' => pieces.push(std::mem::take(&mut current)),
				c => current.push((c, false)),
			}
		}
		pieces.push(current);

		let symbols: Vec<_> = pieces
			.iter()
			.filter_map(|piece| {
				let is_blank = |(c, escaped): &(char, bool)| !escaped && c.is_whitespace();
				let start = piece.iter().position(|e| !is_blank(e))?;
				let end = piece.iter().rposition(|e| !is_blank(e))? + 1;

				match &piece[start..end] {
					[(c, false)] if is_epsilon(*c) => Some(None),
					piece => Some(Some(Symbol::new(
						piece.iter().map(|(c, _)| *c).collect::<String>(),
					))),
				}
			})
			.collect();

		if symbols.is_empty() {
			vec![None]
		} else {
			symbols
		}
	}
}

fn is_epsilon(c: char) -> bool {
	let mut buffer = [0; 4];
	c.encode_utf8(&mut buffer) == EPSILON
}

fn is_escapable(c: char) -> bool {
	matches!(c, ',' | '\\') || c.is_whitespace() || is_epsilon(c)
}

/// Writes the label of a transition, escaping the symbol so that
/// [`Edge::symbols`] reads it back unchanged.
pub fn write_label(symbol: Option<&Symbol>) -> String {
	let symbol = match symbol {
		Some(symbol) => symbol.as_str(),
		None => return EPSILON.to_owned(),
	};

	if symbol == EPSILON {
		return format!("\\{EPSILON}");
	}

	let mut label = String::with_capacity(symbol.len());
	let mut chars = symbol.chars().peekable();
	while let Some(c) = chars.next() {
		match c {
			'\\' if chars.peek().map_or(true, |n| is_escapable(*n)) => label.push_str("\\\\"),
			',' => label.push_str("\\,"),
			c if c.is_whitespace() => {
				label.push('\\');
				label.push(c)
			}
			c => label.push(c),
		}
	}

	label
}

/// Automaton graph.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
	feature = "serde",
	derive(serde::Serialize, serde::Deserialize),
	serde(rename_all = "camelCase")
)]
pub struct Graph {
	#[cfg_attr(feature = "serde", serde(default))]
	pub nodes: Vec<Node>,

	#[cfg_attr(feature = "serde", serde(default))]
	pub edges: Vec<Edge>,

	#[cfg_attr(
		feature = "serde",
		serde(default, skip_serializing_if = "Option::is_none")
	)]
	pub start_node_id: Option<String>,
}

impl Graph {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the index of the node with the given id.
	pub fn node_index(&self, id: &str) -> Result<usize, Error> {
		self.nodes
			.iter()
			.position(|n| n.id == id)
			.ok_or_else(|| Error::UnknownNode(id.to_owned()))
	}

	/// Returns the index of the start node: the node designated by
	/// `start_node_id`, or the first node.
	pub fn start_index(&self) -> Result<usize, Error> {
		match &self.start_node_id {
			Some(id) => self.node_index(id),
			None if self.nodes.is_empty() => Err(Error::EmptyGraph),
			None => Ok(0),
		}
	}

	fn edge_indexes(&self, edge: &Edge) -> Result<(usize, usize), Error> {
		Ok((self.node_index(&edge.from)?, self.node_index(&edge.to)?))
	}

	/// Builds the NFA described by this graph.
	///
	/// The `i`-th node becomes state `i`.
	pub fn to_nfa(&self) -> Result<NFA, Error> {
		let mut nfa = NFA::new();

		for (i, node) in self.nodes.iter().enumerate() {
			nfa.add_state(i as StateId);
			if node.is_accept {
				nfa.add_final_state(i as StateId);
			}
		}

		nfa.set_initial_state(self.start_index()? as StateId);

		for edge in &self.edges {
			let (from, to) = self.edge_indexes(edge)?;
			for symbol in edge.symbols() {
				nfa.add(from as StateId, symbol, to as StateId);
			}
		}

		log::debug!(
			"graph of {} nodes and {} edges read as NFA",
			self.nodes.len(),
			self.edges.len()
		);

		Ok(nfa)
	}

	/// Checks that this graph describes a deterministic automaton: no
	/// epsilon label and no symbol used twice out of the same node.
	pub fn validate_dfa(&self) -> Result<(), Error> {
		let mut seen = HashSet::new();

		for edge in &self.edges {
			self.edge_indexes(edge)?;

			for symbol in edge.symbols() {
				let invalid = match &symbol {
					Some(symbol) => !seen.insert((edge.from.as_str(), symbol.clone())),
					None => true,
				};

				if invalid {
					return Err(Error::InvalidTransitionSymbol {
						state: edge.from.clone(),
						symbol: label_str(symbol.as_ref()).to_owned(),
					});
				}
			}
		}

		Ok(())
	}

	/// Creates the graph of the given NFA.
	///
	/// Nodes are named `q{id}` and listed in breadth-first order from the
	/// initial state, followed by unreachable states.
	pub fn from_nfa(nfa: &NFA) -> Self {
		let layers = layered(nfa.initial_state(), nfa.states(), |q| {
			nfa.successors(q)
				.flat_map(|(_, targets)| targets.iter().copied())
				.collect()
		});

		let name = |q: StateId| format!("q{q}");
		let mut graph = Graph {
			start_node_id: nfa.initial_state().map(name),
			..Graph::default()
		};

		for (q, position) in &layers {
			let mut node = Node::new(name(*q), nfa.is_final_state(*q));
			node.position = *position;
			graph.nodes.push(node);

			for (label, targets) in nfa.successors(*q) {
				for r in targets {
					graph.edges.push(Edge::new(name(*q), name(*r), write_label(label.as_ref())))
				}
			}
		}

		graph
	}

	/// Creates the graph of the given DFA.
	///
	/// Nodes are named `D{i}` and listed in breadth-first order from the
	/// initial state, followed by unreachable states.
	pub fn from_dfa(dfa: &DFA) -> Self {
		let layers = layered(Some(dfa.initial_state()), 0..dfa.len(), |q| {
			dfa.successors(q).map(|(_, r)| *r).collect()
		});

		let name = |q: usize| format!("D{q}");
		let mut graph = Graph {
			start_node_id: Some(name(dfa.initial_state())),
			..Graph::default()
		};

		for (q, position) in &layers {
			let mut node = Node::new(name(*q), dfa.is_final_state(*q));
			node.position = *position;
			graph.nodes.push(node);

			for (symbol, r) in dfa.successors(*q) {
				graph.edges.push(Edge::new(name(*q), name(*r), write_label(Some(symbol))))
			}
		}

		graph
	}

	/// Returns the transition table of this graph, one row per edge.
	pub fn transition_table(&self) -> Vec<TransitionRow> {
		self.edges
			.iter()
			.map(|e| TransitionRow {
				from: e.from.clone(),
				symbol: if e.label.trim().is_empty() {
					EPSILON.to_owned()
				} else {
					e.label.clone()
				},
				to: e.to.clone(),
			})
			.collect()
	}

	/// Returns the formal definition of the automaton described by this
	/// graph.
	pub fn definition(&self) -> Definition {
		let mut alphabet = Vec::new();
		for edge in &self.edges {
			for symbol in edge.symbols().into_iter().flatten() {
				let symbol = symbol.into_string();
				if !alphabet.contains(&symbol) {
					alphabet.push(symbol)
				}
			}
		}

		Definition {
			states: self.nodes.iter().map(|n| n.id.clone()).collect(),
			alphabet,
			initial_state: self
				.start_node_id
				.clone()
				.or_else(|| self.nodes.first().map(|n| n.id.clone())),
			final_states: self
				.nodes
				.iter()
				.filter(|n| n.is_accept)
				.map(|n| n.id.clone())
				.collect(),
			transitions: self.transition_table(),
		}
	}
}

impl From<&NFA> for Graph {
	fn from(nfa: &NFA) -> Self {
		Self::from_nfa(nfa)
	}
}

impl From<&DFA> for Graph {
	fn from(dfa: &DFA) -> Self {
		Self::from_dfa(dfa)
	}
}

impl<'a> TryFrom<&'a Graph> for DFA {
	type Error = Error;

	/// Reads a graph as a DFA, the `i`-th node becoming state `i`.
	///
	/// Fails if the graph is not deterministic.
	fn try_from(graph: &'a Graph) -> Result<Self, Error> {
		graph.validate_dfa()?;

		let mut transitions = vec![BTreeMap::new(); graph.nodes.len()];
		for edge in &graph.edges {
			let (from, to) = graph.edge_indexes(edge)?;
			for symbol in edge.symbols().into_iter().flatten() {
				transitions[from].insert(symbol, to);
			}
		}

		let final_states = graph
			.nodes
			.iter()
			.enumerate()
			.filter(|(_, n)| n.is_accept)
			.map(|(i, _)| i)
			.collect();

		let subsets = (0..graph.nodes.len())
			.map(|i| BTreeSet::from([i as StateId]))
			.collect();

		DFA::from_parts(graph.start_index()?, final_states, transitions, subsets)
	}
}

/// Orders states breadth-first from `initial` and places them in columns by
/// depth. States not reachable from `initial` come last, in an extra column.
fn layered<K: Copy + Eq + std::hash::Hash>(
	initial: Option<K>,
	states: impl IntoIterator<Item = K>,
	successors: impl Fn(K) -> Vec<K>,
) -> Vec<(K, Position)> {
	let mut depths = HashMap::new();
	let mut order = Vec::new();

	if let Some(q) = initial {
		depths.insert(q, 0usize);
		let mut queue = VecDeque::from([q]);
		while let Some(q) = queue.pop_front() {
			order.push(q);
			let depth = depths[&q];
			for r in successors(q) {
				if !depths.contains_key(&r) {
					depths.insert(r, depth + 1);
					queue.push_back(r);
				}
			}
		}
	}

	let extra = order.iter().map(|q| depths[q] + 1).max().unwrap_or(0);
	for q in states {
		if !depths.contains_key(&q) {
			depths.insert(q, extra);
			order.push(q);
		}
	}

	let mut rows: HashMap<usize, usize> = HashMap::new();
	order
		.into_iter()
		.map(|q| {
			let column = depths[&q];
			let row = rows.entry(column).or_default();
			let position = Position {
				x: MARGIN + column as f64 * COLUMN_WIDTH,
				y: MARGIN + *row as f64 * ROW_HEIGHT,
			};
			*row += 1;
			(q, position)
		})
		.collect()
}

/// Transition table row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionRow {
	pub from: String,
	pub symbol: String,
	pub to: String,
}

/// Formal definition `(Q, Σ, q0, F, δ)` of an automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Definition {
	pub states: Vec<String>,
	pub alphabet: Vec<String>,
	pub initial_state: Option<String>,
	pub final_states: Vec<String>,
	pub transitions: Vec<TransitionRow>,
}

impl fmt::Display for Definition {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		writeln!(f, "Q = {{ {} }}", self.states.join(", "))?;
		writeln!(f, "Σ = {{ {} }}", self.alphabet.join(", "))?;
		writeln!(f, "q0 = {}", self.initial_state.as_deref().unwrap_or_default())?;
		writeln!(f, "F = {{ {} }}", self.final_states.join(", "))?;
		write!(f, "δ:")?;
		for row in &self.transitions {
			write!(f, "\n  δ({}, {}) = {}", row.from, row.symbol, row.to)?;
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn chain() -> Graph {
		Graph {
			nodes: vec![
				Node::new("q0", false),
				Node::new("q1", false),
				Node::new("q2", true),
			],
			edges: vec![Edge::new("q0", "q1", "a"), Edge::new("q1", "q2", "b")],
			start_node_id: None,
		}
	}

	#[test]
	fn chain_to_regex() {
		let nfa = chain().to_nfa().unwrap();
		assert_eq!(nfa.initial_state(), Some(0));
		assert_eq!(nfa.to_regex().unwrap(), "ab");
	}

	#[test]
	fn edge_labels() {
		assert_eq!(
			Edge::new("q0", "q1", " a, b ,").symbols(),
			vec![Some(Symbol::from('a')), Some(Symbol::from('b'))]
		);
		assert_eq!(Edge::new("q0", "q1", "").symbols(), vec![None]);
		assert_eq!(Edge::new("q0", "q1", "ε, x").symbols(), vec![None, Some(Symbol::from('x'))]);
	}

	#[test]
	fn escaped_labels() {
		assert_eq!(write_label(Some(&Symbol::from("[a,b]"))), "[a\\,b]");
		assert_eq!(write_label(Some(&Symbol::from("\\d"))), "\\d");
		assert_eq!(write_label(Some(&Symbol::from(EPSILON))), "\\ε");
		assert_eq!(write_label(None), EPSILON);

		for s in ["[a,b]", ",", EPSILON, "\\,", "\\d", " ", "\\ ", "\\", "\\\\", "a\\", "\\ε"] {
			let label = write_label(Some(&Symbol::from(s)));
			assert_eq!(
				Edge::new("q0", "q1", label.as_str()).symbols(),
				vec![Some(Symbol::from(s))],
				"reading `{label}`"
			);
		}

		assert_eq!(
			Edge::new("q0", "q1", "x\\,y, \\ ,z").symbols(),
			vec![Some(Symbol::from("x,y")), Some(Symbol::from(' ')), Some(Symbol::from('z'))]
		);
	}

	#[test]
	fn start_node() {
		let mut graph = chain();
		graph.start_node_id = Some("q1".to_owned());
		assert_eq!(graph.to_nfa().unwrap().to_regex().unwrap(), "b");

		graph.start_node_id = Some("q9".to_owned());
		assert!(matches!(graph.to_nfa(), Err(Error::UnknownNode(id)) if id == "q9"));
	}

	#[test]
	fn unknown_edge_node() {
		let mut graph = chain();
		graph.edges.push(Edge::new("q2", "q3", "c"));
		assert!(matches!(graph.to_nfa(), Err(Error::UnknownNode(id)) if id == "q3"));
	}

	#[test]
	fn dfa_validation() {
		let mut graph = chain();
		assert!(graph.validate_dfa().is_ok());
		let dfa = DFA::try_from(&graph).unwrap();
		assert!(dfa.accepts(&["a", "b"]));
		assert!(!dfa.accepts(&["a"]));

		graph.edges.push(Edge::new("q0", "q2", "a"));
		assert!(matches!(
			graph.validate_dfa(),
			Err(Error::InvalidTransitionSymbol { state, symbol }) if state == "q0" && symbol == "a"
		));

		let mut graph = chain();
		graph.edges.push(Edge::new("q1", "q0", "ε"));
		assert!(matches!(
			DFA::try_from(&graph),
			Err(Error::InvalidTransitionSymbol { symbol, .. }) if symbol == EPSILON
		));
	}

	#[test]
	fn nfa_graph() {
		let mut nfa = NFA::new();
		nfa.set_initial_state(3);
		nfa.add(3, None, 5);
		nfa.add(5, Some(Symbol::from('a')), 4);
		nfa.add_final_state(4);
		nfa.add_state(7);

		let graph = Graph::from_nfa(&nfa);
		let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["q3", "q5", "q4", "q7"]);
		assert_eq!(graph.start_node_id.as_deref(), Some("q3"));
		assert_eq!(graph.edges[0], Edge::new("q3", "q5", EPSILON));
		assert!(graph.nodes[2].is_accept);
		assert!(graph.nodes[1].position.x > graph.nodes[0].position.x);

		// Round trip through the interchange form.
		let nfa = graph.to_nfa().unwrap();
		assert!(nfa.accepts(&["a"]));
		assert!(!nfa.accepts(&[]));
	}

	#[test]
	fn dfa_graph() {
		let graph = chain();
		let dfa = DFA::try_from(&graph).unwrap();
		let graph = Graph::from_dfa(&dfa);
		let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["D0", "D1", "D2"]);
		assert_eq!(graph.edges.len(), 2);
	}

	#[test]
	fn definition() {
		let mut graph = chain();
		graph.edges.push(Edge::new("q2", "q0", ""));

		let definition = graph.definition();
		assert_eq!(definition.alphabet, ["a", "b"]);
		assert_eq!(definition.initial_state.as_deref(), Some("q0"));
		assert_eq!(definition.final_states, ["q2"]);
		assert_eq!(definition.transitions[2].symbol, EPSILON);

		let text = definition.to_string();
		assert!(text.starts_with("Q = { q0, q1, q2 }\nΣ = { a, b }\nq0 = q0\nF = { q2 }\nδ:"));
		assert!(text.ends_with("δ(q2, ε) = q0"));
	}
}
