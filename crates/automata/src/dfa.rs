use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use educe::Educe;

use crate::{Error, StateId, Symbol, NFA};

/// Deterministic state transitions.
pub type DetTransitions = BTreeMap<Symbol, usize>;

/// Deterministic finite automaton.
///
/// States are indexes into the transition table. A state without a
/// transition for some symbol rejects that symbol: there is no explicit
/// dead state.
///
/// Each state remembers the set of NFA states it was derived from. This set
/// is informative only and does not take part in equality.
#[derive(Debug, Clone, Educe)]
#[educe(PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DFA {
	initial_state: usize,
	final_states: BTreeSet<usize>,
	transitions: Vec<DetTransitions>,
	#[educe(PartialEq(ignore))]
	subsets: Vec<BTreeSet<StateId>>,
}

impl Default for DFA {
	fn default() -> Self {
		Self::new()
	}
}

impl DFA {
	/// Creates a new deterministic finite automaton with a single,
	/// non-final, initial state.
	pub fn new() -> Self {
		Self {
			initial_state: 0,
			final_states: BTreeSet::new(),
			transitions: vec![BTreeMap::new()],
			subsets: vec![BTreeSet::new()],
		}
	}

	/// Creates a new DFA from its internal representation.
	///
	/// `subsets` is resized to match the number of states. Fails with
	/// [`Error::UnknownState`] if the initial state, a final state or a
	/// transition target is not a state of the table.
	pub fn from_parts(
		initial_state: usize,
		final_states: BTreeSet<usize>,
		transitions: Vec<DetTransitions>,
		subsets: Vec<BTreeSet<StateId>>,
	) -> Result<Self, Error> {
		let n = transitions.len();
		let unknown = std::iter::once(initial_state)
			.chain(final_states.iter().copied())
			.chain(transitions.iter().flat_map(|t| t.values().copied()))
			.find(|q| *q >= n);

		match unknown {
			Some(q) => Err(Error::UnknownState(q)),
			None => Ok(Self::assemble(initial_state, final_states, transitions, subsets)),
		}
	}

	fn assemble(
		initial_state: usize,
		final_states: BTreeSet<usize>,
		transitions: Vec<DetTransitions>,
		mut subsets: Vec<BTreeSet<StateId>>,
	) -> Self {
		subsets.resize_with(transitions.len(), BTreeSet::new);
		Self {
			initial_state,
			final_states,
			transitions,
			subsets,
		}
	}

	pub(crate) fn from_subsets(
		final_states: BTreeSet<usize>,
		transitions: Vec<DetTransitions>,
		subsets: Vec<BTreeSet<StateId>>,
	) -> Self {
		Self::assemble(0, final_states, transitions, subsets)
	}

	/// Returns the initial state of the automaton.
	pub fn initial_state(&self) -> usize {
		self.initial_state
	}

	/// Returns the final states of the automaton.
	pub fn final_states(&self) -> &BTreeSet<usize> {
		&self.final_states
	}

	pub fn is_final_state(&self, q: usize) -> bool {
		self.final_states.contains(&q)
	}

	/// Makes `q` final.
	///
	/// Returns `false` if it already was.
	pub fn add_final_state(&mut self, q: usize) -> Result<bool, Error> {
		self.check_state(q)?;
		Ok(self.final_states.insert(q))
	}

	fn check_state(&self, q: usize) -> Result<(), Error> {
		if q < self.len() {
			Ok(())
		} else {
			Err(Error::UnknownState(q))
		}
	}

	/// Returns the number of states.
	pub fn len(&self) -> usize {
		self.transitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.transitions.is_empty()
	}

	/// Returns the transitions of the automaton.
	pub fn transitions(&self) -> &[DetTransitions] {
		&self.transitions
	}

	/// Returns the set of NFA states the given state was derived from.
	pub fn subset(&self, q: usize) -> Option<&BTreeSet<StateId>> {
		self.subsets.get(q)
	}

	/// Declares a new state derived from the given NFA states.
	pub fn add_state(&mut self, subset: BTreeSet<StateId>) -> usize {
		let q = self.transitions.len();
		self.transitions.push(BTreeMap::new());
		self.subsets.push(subset);
		q
	}

	/// Sets the transition of `source` on `symbol`.
	///
	/// Returns the previous target, if any. Both states must already exist.
	pub fn add(&mut self, source: usize, symbol: Symbol, target: usize) -> Result<Option<usize>, Error> {
		self.check_state(source)?;
		self.check_state(target)?;
		Ok(self.transitions[source].insert(symbol, target))
	}

	/// Returns the target of the transition of `q` on `symbol`.
	pub fn target(&self, q: usize, symbol: &str) -> Option<usize> {
		self.transitions.get(q)?.get(symbol).copied()
	}

	pub fn successors(&self, q: usize) -> DetSuccessors {
		DetSuccessors::new(self.transitions.get(q))
	}

	/// Returns the symbols used by the automaton.
	pub fn alphabet(&self) -> BTreeSet<&Symbol> {
		self.transitions.iter().flat_map(BTreeMap::keys).collect()
	}

	/// Returns an iterator over all the states reachable from the given
	/// starting state `q`.
	pub fn reachable_states_from(&self, q: usize) -> ReachableStates {
		ReachableStates::new(self, q)
	}

	/// Checks if the automaton accepts the given sequence of symbols.
	pub fn accepts(&self, word: &[&str]) -> bool {
		self.run(word.iter().copied())
	}

	/// Checks if the automaton accepts `input`, read as a sequence of
	/// single-character symbols.
	pub fn accepts_str(&self, input: &str) -> bool {
		let mut buffer = [0; 4];
		let mut q = self.initial_state;
		for c in input.chars() {
			match self.target(q, c.encode_utf8(&mut buffer)) {
				Some(r) => q = r,
				None => return false,
			}
		}

		self.is_final_state(q)
	}

	fn run<'a>(&self, word: impl IntoIterator<Item = &'a str>) -> bool {
		let mut q = self.initial_state;
		for symbol in word {
			match self.target(q, symbol) {
				Some(r) => q = r,
				None => return false,
			}
		}

		self.is_final_state(q)
	}

	/// Minimizes the automaton by table-filling.
	///
	/// Two states are distinguishable when exactly one of them is final,
	/// when exactly one of them has a transition on some symbol, or when
	/// their targets on some symbol are distinguishable. States are then
	/// grouped greedily: each state joins the first group whose
	/// representative it is not distinguishable from.
	pub fn minimize(&self) -> DFA {
		let n = self.len();
		let mut table = DistinguishabilityTable::new(n);

		for i in 0..n {
			for j in 0..i {
				if self.is_final_state(i) != self.is_final_state(j) {
					table.mark(i, j);
				}
			}
		}

		loop {
			let mut changed = false;

			for i in 0..n {
				for j in 0..i {
					if !table.get(i, j) && self.split_by_transitions(&table, i, j) {
						table.mark(i, j);
						changed = true;
					}
				}
			}

			if !changed {
				break;
			}
		}

		let mut groups: Vec<Vec<usize>> = Vec::new();
		let mut group_of = vec![0; n];
		for q in 0..n {
			match groups.iter().position(|group| !table.get(q, group[0])) {
				Some(g) => {
					groups[g].push(q);
					group_of[q] = g
				}
				None => {
					group_of[q] = groups.len();
					groups.push(vec![q])
				}
			}
		}

		let mut final_states = BTreeSet::new();
		let mut transitions = Vec::with_capacity(groups.len());
		let mut subsets = Vec::with_capacity(groups.len());
		for (g, group) in groups.iter().enumerate() {
			let representative = group[0];
			if self.is_final_state(representative) {
				final_states.insert(g);
			}

			transitions.push(
				self.transitions[representative]
					.iter()
					.map(|(symbol, target)| (symbol.clone(), group_of[*target]))
					.collect(),
			);

			subsets.push(
				group
					.iter()
					.flat_map(|q| self.subsets[*q].iter().copied())
					.collect(),
			);
		}

		log::debug!("minimization: {} states into {} groups", n, groups.len());

		DFA::assemble(
			group_of[self.initial_state],
			final_states,
			transitions,
			subsets,
		)
	}

	fn split_by_transitions(&self, table: &DistinguishabilityTable, i: usize, j: usize) -> bool {
		let ti = &self.transitions[i];
		let tj = &self.transitions[j];

		ti.keys().chain(tj.keys()).any(|symbol| {
			match (ti.get(symbol), tj.get(symbol)) {
				(Some(a), Some(b)) => table.get(*a, *b),
				(None, None) => false,
				_ => true,
			}
		})
	}

	/// Relabels the reachable states in breadth-first order from the
	/// initial state, visiting transitions in symbol order.
	///
	/// Unreachable states are dropped. Two automata with the same canonical
	/// form are equal up to state relabeling.
	pub fn canonical(&self) -> DFA {
		let mut order = vec![self.initial_state];
		let mut index = HashMap::new();
		index.insert(self.initial_state, 0usize);

		let mut queue = VecDeque::from([self.initial_state]);
		while let Some(q) = queue.pop_front() {
			for (_, r) in self.successors(q) {
				if !index.contains_key(r) {
					index.insert(*r, order.len());
					order.push(*r);
					queue.push_back(*r);
				}
			}
		}

		let transitions = order
			.iter()
			.map(|q| {
				self.transitions[*q]
					.iter()
					.map(|(symbol, r)| (symbol.clone(), index[r]))
					.collect()
			})
			.collect();

		let final_states = order
			.iter()
			.enumerate()
			.filter(|(_, q)| self.is_final_state(**q))
			.map(|(i, _)| i)
			.collect();

		let subsets = order.iter().map(|q| self.subsets[*q].clone()).collect();

		DFA::from_subsets(final_states, transitions, subsets)
	}

	/// Checks if both automata are equal up to state relabeling, ignoring
	/// unreachable states.
	pub fn is_isomorphic(&self, other: &Self) -> bool {
		self.canonical() == other.canonical()
	}

	/// Converts this automaton into an equivalent NFA, state `i` becoming
	/// NFA state `i`.
	pub fn to_nfa(&self) -> NFA {
		let mut nfa = NFA::new();

		for (q, transitions) in self.transitions.iter().enumerate() {
			nfa.add_state(q as StateId);
			for (symbol, r) in transitions {
				nfa.add(q as StateId, Some(symbol.clone()), *r as StateId);
			}
		}

		nfa.set_initial_state(self.initial_state as StateId);
		for q in &self.final_states {
			nfa.add_final_state(*q as StateId);
		}

		nfa
	}
}

/// Lower-triangular table of distinguishable state pairs.
struct DistinguishabilityTable {
	rows: Vec<Vec<bool>>,
}

impl DistinguishabilityTable {
	fn new(n: usize) -> Self {
		Self {
			rows: (0..n).map(|i| vec![false; i]).collect(),
		}
	}

	fn get(&self, a: usize, b: usize) -> bool {
		match a.cmp(&b) {
			std::cmp::Ordering::Equal => false,
			std::cmp::Ordering::Greater => self.rows[a][b],
			std::cmp::Ordering::Less => self.rows[b][a],
		}
	}

	fn mark(&mut self, a: usize, b: usize) {
		if a > b {
			self.rows[a][b] = true
		} else if b > a {
			self.rows[b][a] = true
		}
	}
}

pub struct DetSuccessors<'a> {
	inner: Option<std::collections::btree_map::Iter<'a, Symbol, usize>>,
}

impl<'a> DetSuccessors<'a> {
	pub fn new(map: Option<&'a DetTransitions>) -> Self {
		Self {
			inner: map.map(|map| map.iter()),
		}
	}
}

impl<'a> Iterator for DetSuccessors<'a> {
	type Item = (&'a Symbol, &'a usize);

	fn next(&mut self) -> Option<Self::Item> {
		self.inner.as_mut().and_then(|inner| inner.next())
	}
}

pub struct ReachableStates<'a> {
	aut: &'a DFA,
	visited: HashSet<usize>,
	stack: Vec<usize>,
}

impl<'a> ReachableStates<'a> {
	fn new(aut: &'a DFA, q: usize) -> Self {
		Self {
			aut,
			visited: HashSet::new(),
			stack: vec![q],
		}
	}
}

impl<'a> Iterator for ReachableStates<'a> {
	type Item = usize;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			match self.stack.pop() {
				Some(q) => {
					if self.visited.insert(q) {
						if let Some(q_transitions) = self.aut.transitions.get(q) {
							for target in q_transitions.values() {
								self.stack.push(*target)
							}
						}

						break Some(q);
					}
				}
				None => break None,
			}
		}
	}
}
