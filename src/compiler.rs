use rexfa_automata::{Graph, IdCounter, DFA, NFA};
use rexfa_syntax::{
	build_nfa, expand_quantifiers_within, insert_concat, to_postfix, tokenize_with, Token,
};

use crate::{Options, Result};

/// Compilation session.
///
/// The session owns the state identifier counter. Identifiers keep growing
/// from one compilation to the next, until [`Compiler::reset`] is called:
/// two sessions never share identifiers and a reset session reproduces the
/// same automata.
#[derive(Debug, Clone)]
pub struct Compiler {
	options: Options,
	counter: IdCounter,
}

impl Default for Compiler {
	fn default() -> Self {
		Self::new(Options::default())
	}
}

impl Compiler {
	pub fn new(options: Options) -> Self {
		let counter = match options.state_limit {
			Some(limit) => IdCounter::with_limit(limit),
			None => IdCounter::new(),
		};

		Self { options, counter }
	}

	pub fn options(&self) -> &Options {
		&self.options
	}

	/// Restarts state identifiers at `0`.
	pub fn reset(&mut self) {
		log::trace!("state identifiers reset from {}", self.counter.peek());
		self.counter.reset()
	}

	/// Splits `pattern` into tokens.
	pub fn tokens(&self, pattern: &str) -> Result<Vec<Token>> {
		Ok(tokenize_with(pattern, self.options.syntax)?)
	}

	/// Returns the tokens of `pattern` with quantifiers expanded and
	/// concatenations made explicit, in infix order.
	pub fn infix(&self, pattern: &str) -> Result<Vec<Token>> {
		let tokens = expand_quantifiers_within(self.tokens(pattern)?, self.options.state_limit)?;
		Ok(insert_concat(tokens))
	}

	/// Returns the postfix token sequence of `pattern`.
	pub fn postfix(&self, pattern: &str) -> Result<Vec<Token>> {
		Ok(to_postfix(self.infix(pattern)?))
	}

	/// Compiles `pattern` into a Thompson NFA.
	pub fn compile(&mut self, pattern: &str) -> Result<NFA> {
		let postfix = self.postfix(pattern)?;
		log::debug!("compiling `{pattern}` from {} postfix tokens", postfix.len());
		Ok(build_nfa(&postfix, &mut self.counter)?)
	}

	/// Compiles `pattern` into a DFA, minimized unless disabled by the
	/// options.
	pub fn compile_dfa(&mut self, pattern: &str) -> Result<DFA> {
		let dfa = self.compile(pattern)?.determinize()?;

		if self.options.minimize {
			let min = dfa.minimize();
			log::debug!("DFA of `{pattern}` minimized from {} to {} states", dfa.len(), min.len());
			Ok(min)
		} else {
			log::debug!("DFA of `{pattern}` left with {} states", dfa.len());
			Ok(dfa)
		}
	}

	/// Compiles `pattern` into a graph, of its minimal DFA if `deterministic`
	/// is set, or of its NFA otherwise.
	pub fn compile_graph(&mut self, pattern: &str, deterministic: bool) -> Result<Graph> {
		if deterministic {
			Ok(Graph::from_dfa(&self.compile_dfa(pattern)?))
		} else {
			Ok(Graph::from_nfa(&self.compile(pattern)?))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Error;

	#[test]
	fn sessions_are_independent() {
		let mut a = Compiler::default();
		let mut b = Compiler::default();

		let first = a.compile("ab").unwrap();
		assert_eq!(b.compile("ab").unwrap(), first);

		let second = a.compile("ab").unwrap();
		assert_ne!(second, first);
		assert_eq!(second.initial_state(), Some(4));

		a.reset();
		assert_eq!(a.compile("ab").unwrap(), first);
	}

	#[test]
	fn state_limit() {
		let mut compiler = Compiler::new(Options {
			state_limit: Some(4),
			..Options::default()
		});

		assert!(compiler.compile("ab").is_ok());
		assert!(matches!(
			compiler.compile("ab"),
			Err(Error::Syntax(rexfa_syntax::Error::TooManyStates(_)))
		));
	}

	#[test]
	fn state_limit_bounds_expansion() {
		let mut compiler = Compiler::new(Options {
			state_limit: Some(10),
			..Options::default()
		});

		assert!(matches!(
			compiler.compile("((a{1000}){1000}){1000}"),
			Err(Error::Syntax(rexfa_syntax::Error::TooManyStates(_)))
		));
		assert!(compiler.compile("a{5}").is_ok());
	}

	#[test]
	fn minimization_option() {
		let mut compiler = Compiler::new(Options {
			minimize: false,
			..Options::default()
		});
		let dfa = compiler.compile_dfa("a|b").unwrap();
		assert_eq!(dfa.len(), 3);

		let mut compiler = Compiler::default();
		let dfa = compiler.compile_dfa("a|b").unwrap();
		assert_eq!(dfa.len(), 2);
	}

	#[test]
	fn strict_classes() {
		let mut compiler = Compiler::new(Options {
			syntax: rexfa_syntax::Options {
				strict_classes: true,
			},
			..Options::default()
		});

		assert!(matches!(
			compiler.compile("[ab"),
			Err(Error::Syntax(rexfa_syntax::Error::UnterminatedCharClass(0)))
		));
		assert!(Compiler::default().compile("[ab").is_ok());
	}
}
