use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{StateId, Symbol, DFA};

mod elimination;

/// Error raised when a [`StateBuilder`] runs out of state identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("too many states (limit is {limit})")]
pub struct TooManyStates {
	pub limit: u32,
}

/// State builder.
///
/// Hands out fresh state identifiers and declares them in the automaton
/// under construction.
pub trait StateBuilder {
	type Error;

	fn next_state(&mut self, nfa: &mut NFA) -> Result<StateId, Self::Error>;
}

impl<'a, S: StateBuilder> StateBuilder for &'a mut S {
	type Error = S::Error;

	fn next_state(&mut self, nfa: &mut NFA) -> Result<StateId, Self::Error> {
		S::next_state(*self, nfa)
	}
}

/// Monotonic state identifier counter.
///
/// A counter belongs to one compilation session. Identifiers keep
/// increasing across constructions until [`IdCounter::reset`] is called.
#[derive(Debug, Clone)]
pub struct IdCounter {
	next: u32,
	limit: u32,
}

impl Default for IdCounter {
	fn default() -> Self {
		IdCounter {
			next: 0,
			limit: u32::MAX,
		}
	}
}

impl IdCounter {
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a counter refusing to allocate more than `limit` identifiers.
	pub fn with_limit(limit: u32) -> Self {
		IdCounter { next: 0, limit }
	}

	/// Restarts the counter at `0`.
	pub fn reset(&mut self) {
		self.next = 0
	}

	/// Returns the identifier the next allocation will produce.
	pub fn peek(&self) -> StateId {
		self.next
	}
}

impl StateBuilder for IdCounter {
	type Error = TooManyStates;

	fn next_state(&mut self, nfa: &mut NFA) -> Result<StateId, Self::Error> {
		if self.next >= self.limit {
			Err(TooManyStates { limit: self.limit })
		} else {
			let q = self.next;
			self.next += 1;
			nfa.add_state(q);
			Ok(q)
		}
	}
}

/// Nondeterministic state transitions.
///
/// The `None` label is the epsilon label.
pub type Transitions = BTreeMap<Option<Symbol>, BTreeSet<StateId>>;

/// Nondeterministic finite automaton.
///
/// States are stored in an arena keyed by their identifier. Every state
/// referenced by a transition is declared in the arena.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NFA {
	transitions: BTreeMap<StateId, Transitions>,
	initial_state: Option<StateId>,
	final_states: BTreeSet<StateId>,
}

impl NFA {
	/// Create a new empty nondeterministic finite automaton.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the initial state, if any.
	pub fn initial_state(&self) -> Option<StateId> {
		self.initial_state
	}

	/// Sets the initial state.
	pub fn set_initial_state(&mut self, q: StateId) {
		self.add_state(q);
		self.initial_state = Some(q)
	}

	/// Returns the set of final states.
	pub fn final_states(&self) -> &BTreeSet<StateId> {
		&self.final_states
	}

	/// Checks if the given state is a final state.
	pub fn is_final_state(&self, q: StateId) -> bool {
		self.final_states.contains(&q)
	}

	/// Adds a final state to the automaton.
	pub fn add_final_state(&mut self, q: StateId) -> bool {
		self.add_state(q);
		self.final_states.insert(q)
	}

	/// Returns an iterator over the states, in identifier order.
	pub fn states(&self) -> impl '_ + Iterator<Item = StateId> {
		self.transitions.keys().copied()
	}

	/// Returns the number of states.
	pub fn len(&self) -> usize {
		self.transitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.transitions.is_empty()
	}

	/// Checks if the given state is declared in the automaton.
	pub fn contains_state(&self, q: StateId) -> bool {
		self.transitions.contains_key(&q)
	}

	/// Returns an iterator over the transitions.
	pub fn transitions(&self) -> std::collections::btree_map::Iter<StateId, Transitions> {
		self.transitions.iter()
	}

	/// Get the successors of the given state.
	pub fn successors(&self, q: StateId) -> Successors {
		Successors::new(self.transitions.get(&q))
	}

	/// Adds the given state into the automaton, even if it is not the source
	/// or destination of any transition.
	pub fn add_state(&mut self, q: StateId) {
		self.transitions.entry(q).or_default();
	}

	/// Adds the given transition to the automaton.
	///
	/// Returns `false` if the transition was already present.
	pub fn add(&mut self, source: StateId, label: Option<Symbol>, target: StateId) -> bool {
		self.add_state(target);
		self.transitions
			.entry(source)
			.or_default()
			.entry(label)
			.or_default()
			.insert(target)
	}

	/// Computes the set of states reachable from `qs` using only epsilon
	/// transitions, `qs` included.
	pub fn epsilon_closure(&self, qs: impl IntoIterator<Item = StateId>) -> BTreeSet<StateId> {
		let mut closure = BTreeSet::new();
		let mut stack: Vec<_> = qs.into_iter().collect();

		while let Some(q) = stack.pop() {
			if closure.insert(q) {
				if let Some(targets) = self.transitions.get(&q).and_then(|t| t.get(&None)) {
					stack.extend(targets.iter().copied().filter(|r| !closure.contains(r)))
				}
			}
		}

		closure
	}

	/// Returns the union of the direct `symbol`-successors of `qs`.
	///
	/// Epsilon transitions are not followed.
	pub fn move_on<'a>(
		&self,
		qs: impl IntoIterator<Item = &'a StateId>,
		symbol: &Symbol,
	) -> BTreeSet<StateId> {
		let label = Some(symbol.clone());
		let mut result = BTreeSet::new();

		for q in qs {
			if let Some(targets) = self.transitions.get(q).and_then(|t| t.get(&label)) {
				result.extend(targets.iter().copied())
			}
		}

		result
	}

	/// Returns the states reachable from `q` following any transition.
	pub fn reachable_states_from(&self, q: StateId) -> BTreeSet<StateId> {
		let mut visited = BTreeSet::new();
		let mut stack = vec![q];

		while let Some(q) = stack.pop() {
			if visited.insert(q) {
				for (_, targets) in self.successors(q) {
					stack.extend(targets.iter().copied())
				}
			}
		}

		visited
	}

	/// Returns the non-epsilon symbols used by the states reachable from
	/// `q`.
	pub fn alphabet_from(&self, q: StateId) -> BTreeSet<&Symbol> {
		let mut alphabet = BTreeSet::new();

		for r in self.reachable_states_from(q) {
			for (label, _) in self.successors(r) {
				if let Some(symbol) = label {
					alphabet.insert(symbol);
				}
			}
		}

		alphabet
	}

	/// Checks if the automaton accepts the given sequence of symbols.
	pub fn accepts(&self, word: &[&str]) -> bool {
		self.accepts_symbols(word.iter().map(|s| Symbol::from(*s)))
	}

	/// Checks if the automaton accepts `input`, read as a sequence of
	/// single-character symbols.
	pub fn accepts_str(&self, input: &str) -> bool {
		self.accepts_symbols(input.chars().map(Symbol::from))
	}

	fn accepts_symbols(&self, word: impl IntoIterator<Item = Symbol>) -> bool {
		let Some(initial_state) = self.initial_state else {
			return false;
		};

		let mut current = self.epsilon_closure([initial_state]);
		for symbol in word {
			current = self.epsilon_closure(self.move_on(&current, &symbol));
			if current.is_empty() {
				return false;
			}
		}

		current.iter().any(|q| self.is_final_state(*q))
	}

	/// Turns this NFA into a DFA, starting from its initial state.
	pub fn determinize(&self) -> crate::Result<DFA> {
		match self.initial_state {
			Some(q) => Ok(self.determinize_from(q)),
			None => Err(crate::Error::EmptyGraph),
		}
	}

	/// Turns the part of this NFA reachable from `start` into a DFA using
	/// the subset construction.
	///
	/// Each DFA state stands for the epsilon-closed set of NFA states it was
	/// derived from. Two derivations of the same set always yield the same
	/// DFA state. Symbols leading to the empty set produce no transition.
	pub fn determinize_from(&self, start: StateId) -> DFA {
		let alphabet = self.alphabet_from(start);

		let initial = self.epsilon_closure([start]);
		let mut indexes = HashMap::new();
		indexes.insert(initial.clone(), 0usize);
		let mut subsets = vec![initial.clone()];
		let mut transitions = vec![BTreeMap::new()];

		let mut unmarked = vec![initial];
		while let Some(current) = unmarked.pop() {
			let i = indexes[&current];

			for &symbol in &alphabet {
				let next = self.epsilon_closure(self.move_on(&current, symbol));
				if next.is_empty() {
					continue;
				}

				let j = match indexes.get(&next) {
					Some(j) => *j,
					None => {
						let j = subsets.len();
						log::trace!("new DFA state {j} for NFA states {next:?}");
						indexes.insert(next.clone(), j);
						subsets.push(next.clone());
						transitions.push(BTreeMap::new());
						unmarked.push(next);
						j
					}
				};

				transitions[i].insert(symbol.clone(), j);
			}
		}

		let final_states = subsets
			.iter()
			.enumerate()
			.filter(|(_, subset)| subset.iter().any(|q| self.is_final_state(*q)))
			.map(|(i, _)| i)
			.collect();

		log::debug!(
			"subset construction: {} NFA states, {} symbols, {} DFA states",
			self.len(),
			alphabet.len(),
			subsets.len()
		);

		DFA::from_subsets(final_states, transitions, subsets)
	}
}

/// Iterator over the successors of a given state in a [`NFA`].
pub struct Successors<'a> {
	inner: Option<std::collections::btree_map::Iter<'a, Option<Symbol>, BTreeSet<StateId>>>,
}

impl<'a> Successors<'a> {
	pub fn new(map: Option<&'a Transitions>) -> Self {
		Self {
			inner: map.map(|map| map.iter()),
		}
	}
}

impl<'a> Iterator for Successors<'a> {
	type Item = (&'a Option<Symbol>, &'a BTreeSet<StateId>);

	fn next(&mut self) -> Option<Self::Item> {
		self.inner.as_mut().and_then(|inner| inner.next())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sym(s: &str) -> Option<Symbol> {
		Some(Symbol::from(s))
	}

	/// `0 -ε-> 1 -a-> 2`, `1 -ε-> 3 -ε-> 1`, `2` final.
	fn sample() -> NFA {
		let mut nfa = NFA::new();
		nfa.set_initial_state(0);
		nfa.add(0, None, 1);
		nfa.add(1, sym("a"), 2);
		nfa.add(1, None, 3);
		nfa.add(3, None, 1);
		nfa.add_final_state(2);
		nfa
	}

	#[test]
	fn counter_allocates_increasing_ids() {
		let mut nfa = NFA::new();
		let mut counter = IdCounter::new();
		assert_eq!(counter.next_state(&mut nfa), Ok(0));
		assert_eq!(counter.next_state(&mut nfa), Ok(1));
		assert_eq!(nfa.len(), 2);

		counter.reset();
		assert_eq!(counter.peek(), 0);
	}

	#[test]
	fn counter_limit() {
		let mut nfa = NFA::new();
		let mut counter = IdCounter::with_limit(1);
		assert!(counter.next_state(&mut nfa).is_ok());
		assert_eq!(
			counter.next_state(&mut nfa),
			Err(TooManyStates { limit: 1 })
		);
	}

	#[test]
	fn epsilon_closure_with_cycle() {
		let nfa = sample();
		let closure = nfa.epsilon_closure([0]);
		assert_eq!(closure, BTreeSet::from([0, 1, 3]));
	}

	#[test]
	fn epsilon_closure_is_idempotent() {
		let nfa = sample();
		for q in nfa.states() {
			let once = nfa.epsilon_closure([q]);
			let twice = nfa.epsilon_closure(once.iter().copied());
			assert_eq!(once, twice);
		}
	}

	#[test]
	fn move_ignores_epsilon() {
		let nfa = sample();
		let a = Symbol::from("a");
		assert!(nfa.move_on(&BTreeSet::from([0]), &a).is_empty());
		assert_eq!(nfa.move_on(&BTreeSet::from([0, 1]), &a), BTreeSet::from([2]));
	}

	#[test]
	fn determinize_sample() {
		let dfa = sample().determinize().unwrap();
		assert_eq!(dfa.len(), 2);
		assert!(dfa.accepts(&["a"]));
		assert!(!dfa.accepts(&[]));
		assert!(!dfa.accepts(&["a", "a"]));
		assert_eq!(dfa.subset(dfa.initial_state()), Some(&BTreeSet::from([0, 1, 3])));
	}

	#[test]
	fn determinize_merges_nondeterministic_targets() {
		// 0 -a-> 1, 0 -a-> 2, 1 -b-> 3, 2 -b-> 3, 3 final.
		let mut nfa = NFA::new();
		nfa.set_initial_state(0);
		nfa.add(0, sym("a"), 1);
		nfa.add(0, sym("a"), 2);
		nfa.add(1, sym("b"), 3);
		nfa.add(2, sym("b"), 3);
		nfa.add_final_state(3);

		let dfa = nfa.determinize().unwrap();
		assert_eq!(dfa.len(), 3);
		assert!(dfa.accepts(&["a", "b"]));
		assert!(!dfa.accepts(&["a"]));
	}

	#[test]
	fn determinize_without_initial_state() {
		assert!(NFA::new().determinize().is_err());
	}

	#[test]
	fn nfa_accepts() {
		let nfa = sample();
		assert!(nfa.accepts(&["a"]));
		assert!(!nfa.accepts(&["b"]));
		assert!(!nfa.accepts(&[]));
		assert!(nfa.accepts_str("a"));
	}
}
