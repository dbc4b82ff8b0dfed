use rexfa_automata::{StateBuilder, StateId, TooManyStates, NFA};

use crate::{Error, Operator, PostfixDefect, Token};

/// NFA fragment under construction.
///
/// The fragment recognizes the words leading from `start` to `accept`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
	pub start: StateId,
	pub accept: StateId,
}

fn pop(stack: &mut Vec<Fragment>, op: Operator) -> Result<Fragment, PostfixDefect> {
	stack.pop().ok_or(PostfixDefect::MissingOperand(op))
}

fn pop_pair(stack: &mut Vec<Fragment>, op: Operator) -> Result<(Fragment, Fragment), PostfixDefect> {
	let right = pop(stack, op)?;
	let left = pop(stack, op)?;
	Ok((left, right))
}

/// Builds the fragment of the given postfix token sequence into `nfa`,
/// using the Thompson construction.
///
/// An empty sequence gives a fragment recognizing only the empty word.
pub fn build_fragment<S>(postfix: &[Token], nfa: &mut NFA, states: &mut S) -> Result<Fragment, Error>
where
	S: StateBuilder<Error = TooManyStates>,
{
	let mut stack: Vec<Fragment> = Vec::new();

	for token in postfix {
		let op = match token.as_operator() {
			Some(op) => op,
			None => {
				let start = states.next_state(nfa)?;
				let accept = states.next_state(nfa)?;
				nfa.add(start, token.to_symbol(), accept);
				stack.push(Fragment { start, accept });
				continue;
			}
		};

		let fragment = match op {
			Operator::Concat => {
				let (left, right) = pop_pair(&mut stack, op)?;
				nfa.add(left.accept, None, right.start);
				Fragment {
					start: left.start,
					accept: right.accept,
				}
			}
			Operator::Alternation => {
				let (left, right) = pop_pair(&mut stack, op)?;
				let start = states.next_state(nfa)?;
				let accept = states.next_state(nfa)?;
				nfa.add(start, None, left.start);
				nfa.add(start, None, right.start);
				nfa.add(left.accept, None, accept);
				nfa.add(right.accept, None, accept);
				Fragment { start, accept }
			}
			Operator::Star => {
				let inner = pop(&mut stack, op)?;
				let start = states.next_state(nfa)?;
				let accept = states.next_state(nfa)?;
				nfa.add(start, None, inner.start);
				nfa.add(start, None, accept);
				nfa.add(inner.accept, None, inner.start);
				nfa.add(inner.accept, None, accept);
				Fragment { start, accept }
			}
			Operator::Plus => {
				let inner = pop(&mut stack, op)?;
				let accept = states.next_state(nfa)?;
				nfa.add(inner.accept, None, inner.start);
				nfa.add(inner.accept, None, accept);
				Fragment {
					start: inner.start,
					accept,
				}
			}
			Operator::Optional => {
				let inner = pop(&mut stack, op)?;
				let start = states.next_state(nfa)?;
				let accept = states.next_state(nfa)?;
				nfa.add(start, None, inner.start);
				nfa.add(start, None, accept);
				nfa.add(inner.accept, None, accept);
				Fragment { start, accept }
			}
			Operator::Repeat(repeat) => {
				return Err(PostfixDefect::UnexpandedQuantifier(repeat).into())
			}
			Operator::Open | Operator::Close => {
				log::warn!("ignoring `{op}` in postfix sequence");
				continue;
			}
		};

		stack.push(fragment)
	}

	match stack.len() {
		0 => {
			let start = states.next_state(nfa)?;
			let accept = states.next_state(nfa)?;
			nfa.add(start, None, accept);
			Ok(Fragment { start, accept })
		}
		1 => Ok(stack[0]),
		n => Err(PostfixDefect::UnconsumedOperands(n - 1).into()),
	}
}

/// Builds the NFA of the given postfix token sequence.
///
/// The NFA has the fragment start as initial state and the fragment accept
/// as unique final state.
pub fn build_nfa<S>(postfix: &[Token], states: &mut S) -> Result<NFA, Error>
where
	S: StateBuilder<Error = TooManyStates>,
{
	let mut nfa = NFA::new();
	let fragment = build_fragment(postfix, &mut nfa, states)?;
	nfa.set_initial_state(fragment.start);
	nfa.add_final_state(fragment.accept);

	log::debug!(
		"Thompson construction: {} tokens, {} states",
		postfix.len(),
		nfa.len()
	);

	Ok(nfa)
}

#[cfg(test)]
mod tests {
	use rexfa_automata::IdCounter;

	use super::*;
	use crate::{parse, Options, Repeat};

	fn compile(pattern: &str) -> NFA {
		let postfix = parse(pattern, Options::default()).unwrap();
		build_nfa(&postfix, &mut IdCounter::new()).unwrap()
	}

	const TESTS: &[(&str, &[&str], &[&str])] = &[
		("a", &["a"], &["", "b", "aa"]),
		("ab", &["ab"], &["a", "b", "ba"]),
		("a|b", &["a", "b"], &["", "ab"]),
		("a*", &["", "a", "aaa"], &["b"]),
		("a+", &["a", "aaa"], &["", "b"]),
		("a?", &["", "a"], &["aa"]),
		("(ab)*c", &["c", "abc", "ababc"], &["ab", "ac"]),
		("a(b|c)*d", &["ad", "abd", "abbcbcd"], &["a", "ab", "ac", "abc"]),
		("a{2,3}", &["aa", "aaa"], &["a", "aaaa"]),
		("(a|b){2,}", &["ab", "bab", "aaaa"], &["", "a"]),
		("", &[""], &["a"]),
	];

	#[test]
	fn languages() {
		for (pattern, accepted, rejected) in TESTS {
			let nfa = compile(pattern);

			for word in *accepted {
				assert!(nfa.accepts_str(word), "`{pattern}` should accept `{word}`")
			}

			for word in *rejected {
				assert!(!nfa.accepts_str(word), "`{pattern}` should reject `{word}`")
			}
		}
	}

	#[test]
	fn escapes_and_classes_are_opaque() {
		let nfa = compile("\\d[a-z]");
		assert!(nfa.accepts(&["\\d", "[a-z]"]));
		assert!(!nfa.accepts(&["1", "a"]));
	}

	#[test]
	fn unique_final_state() {
		let nfa = compile("(a|b)*c+");
		assert_eq!(nfa.final_states().len(), 1);
		assert_eq!(nfa.len(), 11);
	}

	#[test]
	fn plus_reuses_start() {
		let mut nfa = NFA::new();
		let mut counter = IdCounter::new();
		let postfix = [Token::Literal('a'), Token::Operator(Operator::Plus)];
		let fragment = build_fragment(&postfix, &mut nfa, &mut counter).unwrap();
		assert_eq!(fragment, Fragment { start: 0, accept: 2 });
		assert_eq!(counter.peek(), 3);
	}

	#[test]
	fn ids_continue_across_builds() {
		let mut counter = IdCounter::new();
		let postfix = parse("ab", Options::default()).unwrap();
		let first = build_nfa(&postfix, &mut counter).unwrap();
		let second = build_nfa(&postfix, &mut counter).unwrap();
		assert_eq!(first.initial_state(), Some(0));
		assert_eq!(second.initial_state(), Some(4));

		counter.reset();
		let third = build_nfa(&postfix, &mut counter).unwrap();
		assert_eq!(first, third);
	}

	#[test]
	fn malformed() {
		let mut counter = IdCounter::new();
		let star = [Token::Operator(Operator::Star)];
		assert!(matches!(
			build_nfa(&star, &mut counter),
			Err(Error::MalformedPostfix(PostfixDefect::MissingOperand(Operator::Star)))
		));

		let unconsumed = [Token::Literal('a'), Token::Literal('b')];
		assert!(matches!(
			build_nfa(&unconsumed, &mut counter),
			Err(Error::MalformedPostfix(PostfixDefect::UnconsumedOperands(1)))
		));

		let repeat = [
			Token::Literal('a'),
			Token::Operator(Operator::Repeat(Repeat::Exactly(2))),
		];
		assert!(matches!(
			build_nfa(&repeat, &mut counter),
			Err(Error::MalformedPostfix(PostfixDefect::UnexpandedQuantifier(_)))
		));

		assert!(matches!(
			build_nfa(&parse("a|", Options::default()).unwrap(), &mut counter),
			Err(Error::MalformedPostfix(PostfixDefect::MissingOperand(Operator::Alternation)))
		));
	}

	#[test]
	fn state_limit() {
		let mut counter = IdCounter::with_limit(3);
		let postfix = parse("ab", Options::default()).unwrap();
		assert!(matches!(
			build_nfa(&postfix, &mut counter),
			Err(Error::TooManyStates(TooManyStates { limit: 3 }))
		));
	}
}
