use std::collections::BTreeMap;

use crate::{Error, Expr, StateId, TooManyStates, NFA};

/// Transition expression table: `table[i][j]` is the expression labeling
/// all the paths from `i` to `j` through states not yet eliminated.
type Table = BTreeMap<StateId, BTreeMap<StateId, Expr>>;

fn add_path(table: &mut Table, source: StateId, target: StateId, e: Expr) {
	let row = table.entry(source).or_default();
	let e = match row.remove(&target) {
		Some(current) => current.union(e),
		None => e,
	};

	row.insert(target, e);
}

/// Allocates a state identifier past the ones used by the automaton.
fn fresh_state(next: &mut Option<StateId>) -> Result<StateId, Error> {
	let q = next.ok_or(TooManyStates {
		limit: StateId::MAX,
	})?;
	*next = q.checked_add(1);
	Ok(q)
}

impl NFA {
	/// Converts the part of this automaton reachable from its initial state
	/// into an equivalent regular expression, by state elimination.
	///
	/// States are eliminated in identifier order. When the initial state has
	/// incoming transitions, a fresh initial state is used in its place.
	/// When there is more than one final state, or when the final state has
	/// outgoing transitions or is the initial state, the final states are
	/// joined into a fresh final state by epsilon transitions.
	///
	/// Fails with [`Error::EmptyGraph`] if no final state is reachable.
	pub fn to_expr(&self) -> Result<Expr, Error> {
		let initial_state = self.initial_state.ok_or(Error::EmptyGraph)?;
		let reachable = self.reachable_states_from(initial_state);
		let final_states: Vec<_> = reachable
			.iter()
			.copied()
			.filter(|q| self.is_final_state(*q))
			.collect();

		if final_states.is_empty() {
			return Err(Error::EmptyGraph);
		}

		let mut table = Table::new();
		for &q in &reachable {
			table.entry(q).or_default();
			for (label, targets) in self.successors(q) {
				let e = match label {
					Some(symbol) => Expr::Symbol(symbol.clone()),
					None => Expr::Empty,
				};

				for &r in targets {
					add_path(&mut table, q, r, e.clone());
				}
			}
		}

		let mut next = match self.states().last() {
			Some(q) => q.checked_add(1),
			None => Some(0),
		};

		let start = if table.values().any(|row| row.contains_key(&initial_state)) {
			let q = fresh_state(&mut next)?;
			add_path(&mut table, q, initial_state, Expr::Empty);
			q
		} else {
			initial_state
		};

		let accept = match final_states.as_slice() {
			[q] if *q != start && table.get(q).map_or(true, BTreeMap::is_empty) => *q,
			_ => {
				if final_states.len() > 1 {
					log::warn!(
						"joining {} final states into a single final state",
						final_states.len()
					);
				}

				let q = fresh_state(&mut next)?;
				for &f in &final_states {
					add_path(&mut table, f, q, Expr::Empty);
				}
				q
			}
		};

		for k in reachable {
			if k == start || k == accept {
				continue;
			}

			let mut row_k = table.remove(&k).unwrap_or_default();
			let loop_k = row_k.remove(&k).map(Expr::star).unwrap_or(Expr::Empty);

			for row in table.values_mut() {
				if let Some(ik) = row.remove(&k) {
					let prefix = ik.concat(loop_k.clone());
					for (j, kj) in &row_k {
						let path = prefix.clone().concat(kj.clone());
						let e = match row.remove(j) {
							Some(current) => current.union(path),
							None => path,
						};
						row.insert(*j, e);
					}
				}
			}

			log::trace!("eliminated state {k}");
		}

		table
			.remove(&start)
			.and_then(|mut row| row.remove(&accept))
			.ok_or(Error::EmptyGraph)
	}

	/// Converts this automaton into an equivalent regular expression string.
	///
	/// See [`NFA::to_expr`].
	pub fn to_regex(&self) -> Result<String, Error> {
		let regex = self.to_expr()?.to_string();
		log::debug!("state elimination over {} states: {regex}", self.len());
		Ok(regex)
	}
}

#[cfg(test)]
mod tests {
	use crate::{Error, StateId, Symbol, NFA};

	fn sym(s: &str) -> Option<Symbol> {
		Some(Symbol::from(s))
	}

	#[test]
	fn chain() {
		let mut nfa = NFA::new();
		nfa.set_initial_state(0);
		nfa.add(0, sym("a"), 1);
		nfa.add(1, sym("b"), 2);
		nfa.add_final_state(2);
		assert_eq!(nfa.to_regex().unwrap(), "ab");
	}

	#[test]
	fn parallel_edges() {
		let mut nfa = NFA::new();
		nfa.set_initial_state(0);
		nfa.add(0, sym("a"), 1);
		nfa.add(0, sym("b"), 1);
		nfa.add_final_state(1);
		assert_eq!(nfa.to_regex().unwrap(), "a|b");
	}

	#[test]
	fn self_loop() {
		// 0 -a-> 1, 1 -b-> 1, 1 -c-> 2
		let mut nfa = NFA::new();
		nfa.set_initial_state(0);
		nfa.add(0, sym("a"), 1);
		nfa.add(1, sym("b"), 1);
		nfa.add(1, sym("c"), 2);
		nfa.add_final_state(2);
		assert_eq!(nfa.to_regex().unwrap(), "ab*c");
	}

	#[test]
	fn looping_initial_state() {
		// 0 -a-> 0, 0 -b-> 1
		let mut nfa = NFA::new();
		nfa.set_initial_state(0);
		nfa.add(0, sym("a"), 0);
		nfa.add(0, sym("b"), 1);
		nfa.add_final_state(1);
		assert_eq!(nfa.to_regex().unwrap(), "a*b");
	}

	#[test]
	fn several_final_states() {
		// 0 -a-> 1, 0 -b-> 2, 1 and 2 final.
		let mut nfa = NFA::new();
		nfa.set_initial_state(0);
		nfa.add(0, sym("a"), 1);
		nfa.add(0, sym("b"), 2);
		nfa.add_final_state(1);
		nfa.add_final_state(2);
		assert_eq!(nfa.to_regex().unwrap(), "a|b");
	}

	#[test]
	fn final_initial_state() {
		// 0 -a-> 0, 0 final.
		let mut nfa = NFA::new();
		nfa.set_initial_state(0);
		nfa.add(0, sym("a"), 0);
		nfa.add_final_state(0);
		assert_eq!(nfa.to_regex().unwrap(), "a*");
	}

	#[test]
	fn epsilon_edges_disappear() {
		// 0 -ε-> 1 -a-> 2 -ε-> 3
		let mut nfa = NFA::new();
		nfa.set_initial_state(0);
		nfa.add(0, None, 1);
		nfa.add(1, sym("a"), 2);
		nfa.add(2, None, 3);
		nfa.add_final_state(3);
		assert_eq!(nfa.to_regex().unwrap(), "a");
	}

	#[test]
	fn unreachable_final_state() {
		let mut nfa = NFA::new();
		nfa.set_initial_state(0);
		nfa.add(1, sym("a"), 2);
		nfa.add_final_state(2);
		assert!(nfa.to_regex().is_err());
	}

	#[test]
	fn largest_identifier() {
		let mut nfa = NFA::new();
		nfa.set_initial_state(0);
		nfa.add(0, sym("a"), StateId::MAX);
		nfa.add_final_state(StateId::MAX);
		assert_eq!(nfa.to_regex().unwrap(), "a");

		// The looping initial state now needs a fresh identifier.
		nfa.add(StateId::MAX, sym("b"), 0);
		assert!(matches!(nfa.to_regex(), Err(Error::TooManyStates(_))));
	}
}
