use rexfa_automata::TooManyStates;

use crate::{Error, Operator, Repeat, Token};

/// Regroups the literal runs spelling a brace quantifier (`{n}`, `{n,}` or
/// `{n,m}`) into [`Operator::Repeat`] tokens.
///
/// Runs that do not follow the quantifier grammar are left untouched.
pub fn group_quantifiers(tokens: Vec<Token>) -> Vec<Token> {
	let mut result = Vec::with_capacity(tokens.len());
	let mut i = 0;

	while i < tokens.len() {
		match parse_repeat(&tokens[i..]) {
			Some((repeat, len)) => {
				result.push(Token::Operator(Operator::Repeat(repeat)));
				i += len
			}
			None => {
				result.push(tokens[i].clone());
				i += 1
			}
		}
	}

	result
}

/// Parses a brace quantifier at the start of `tokens`, returning it with
/// the number of tokens it spans.
fn parse_repeat(tokens: &[Token]) -> Option<(Repeat, usize)> {
	if tokens.first() != Some(&Token::Literal('{')) {
		return None;
	}

	let mut text = String::new();
	for (i, token) in tokens.iter().enumerate().skip(1) {
		match token {
			Token::Literal('}') => {
				let repeat = match text.split_once(',') {
					None => Repeat::Exactly(parse_bound(&text)?),
					Some((min, "")) => Repeat::AtLeast(parse_bound(min)?),
					Some((min, max)) => Repeat::Between(parse_bound(min)?, parse_bound(max)?),
				};

				return Some((repeat, i + 1));
			}
			Token::Literal(c @ ('0'..='9' | ',')) => text.push(*c),
			_ => return None,
		}
	}

	None
}

fn parse_bound(s: &str) -> Option<u32> {
	if s.is_empty() || s.contains(',') {
		None
	} else {
		s.parse().ok()
	}
}

/// Returns the index at which the last atom of `tokens` starts.
///
/// An atom is a value token or a parenthesized group, possibly followed by
/// postfix operators.
fn atom_start(tokens: &[Token]) -> Option<usize> {
	let mut end = tokens.len();

	while let Some(Token::Operator(op)) = tokens[..end].last() {
		if op.is_postfix() {
			end -= 1
		} else {
			break;
		}
	}

	match tokens[..end].last()? {
		Token::Operator(Operator::Close) => {
			let mut depth = 0usize;
			for i in (0..end).rev() {
				match tokens[i] {
					Token::Operator(Operator::Close) => depth += 1,
					Token::Operator(Operator::Open) => {
						depth -= 1;
						if depth == 0 {
							return Some(i);
						}
					}
					_ => (),
				}
			}

			None
		}
		Token::Operator(_) => None,
		_ => Some(end - 1),
	}
}

/// Rewrites brace quantifiers with the primitive operators.
///
/// The quantified atom is copied: `x{n}` becomes `n` copies of `x`, `x{n,}`
/// becomes `n` copies followed by `x*` and `x{n,m}` becomes `n` copies
/// followed by `m - n` copies of `x?`.
pub fn expand_quantifiers(tokens: Vec<Token>) -> Result<Vec<Token>, Error> {
	expand_quantifiers_within(tokens, None)
}

/// Rewrites brace quantifiers like [`expand_quantifiers`], without ever
/// holding more values than `state_limit` states can build.
///
/// Each value costs two NFA states. The expansion stops with
/// [`Error::TooManyStates`] before copying an atom past the limit.
pub fn expand_quantifiers_within(
	tokens: Vec<Token>,
	state_limit: Option<u32>,
) -> Result<Vec<Token>, Error> {
	let check = |values: u64| match state_limit {
		Some(limit) if values.saturating_mul(2) > u64::from(limit) => Err(TooManyStates { limit }),
		_ => Ok(()),
	};

	let mut result: Vec<Token> = Vec::with_capacity(tokens.len());
	let mut values = 0u64;

	for token in group_quantifiers(tokens) {
		match token {
			Token::Operator(Operator::Repeat(repeat)) => {
				let start = atom_start(&result).ok_or(Error::DanglingQuantifier(repeat))?;
				let atom = result.split_off(start);

				let atom_values = atom.iter().filter(|t| t.is_value()).count() as u64;
				let copies = u64::from(repeat.min())
					+ match repeat {
						Repeat::Exactly(_) => 0,
						Repeat::AtLeast(_) => 1,
						Repeat::Between(min, max) => u64::from(max.saturating_sub(min)),
					};
				values = (values - atom_values).saturating_add(atom_values.saturating_mul(copies));
				check(values)?;

				for _ in 0..repeat.min() {
					result.extend_from_slice(&atom)
				}

				match repeat {
					Repeat::Exactly(_) => (),
					Repeat::AtLeast(_) => {
						result.extend_from_slice(&atom);
						result.push(Token::Operator(Operator::Star))
					}
					Repeat::Between(min, max) => {
						for _ in min..max {
							result.extend_from_slice(&atom);
							result.push(Token::Operator(Operator::Optional))
						}
					}
				}

				log::trace!("expanded quantifier `{repeat}` over {} tokens", atom.len());
			}
			token => {
				if token.is_value() {
					values += 1;
					check(values)?
				}

				result.push(token)
			}
		}
	}

	Ok(result)
}
