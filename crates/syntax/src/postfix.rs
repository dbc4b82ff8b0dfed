use crate::{Operator, Token};

/// Checks if a concatenation can follow `token`.
fn ends_operand(token: &Token) -> bool {
	match token {
		Token::Operator(op) => *op == Operator::Close || op.is_postfix(),
		_ => true,
	}
}

/// Checks if a concatenation can precede `token`.
fn starts_operand(token: &Token) -> bool {
	match token {
		Token::Operator(op) => *op == Operator::Open,
		_ => true,
	}
}

/// Makes implicit concatenations explicit by inserting
/// [`Operator::Concat`] between juxtaposed operands.
pub fn insert_concat(tokens: Vec<Token>) -> Vec<Token> {
	let mut result: Vec<Token> = Vec::with_capacity(tokens.len() * 2);

	for token in tokens {
		if let Some(prev) = result.last() {
			if ends_operand(prev) && starts_operand(&token) {
				result.push(Token::Operator(Operator::Concat))
			}
		}

		result.push(token)
	}

	result
}

/// Converts an infix token sequence into postfix notation.
///
/// Postfix operators bind tighter than concatenation, which binds tighter
/// than alternation. Binary operators are left associative.
///
/// Unbalanced parenthesis are tolerated: a `)` without its `(` pops the
/// whole operator stack, and an unclosed `(` is dropped.
pub fn to_postfix(tokens: Vec<Token>) -> Vec<Token> {
	let mut output = Vec::with_capacity(tokens.len());
	let mut stack: Vec<Operator> = Vec::new();

	for token in tokens {
		match token {
			Token::Operator(Operator::Open) => stack.push(Operator::Open),
			Token::Operator(Operator::Close) => loop {
				match stack.pop() {
					Some(Operator::Open) => break,
					Some(op) => output.push(Token::Operator(op)),
					None => {
						log::warn!("ignoring unbalanced `)`");
						break;
					}
				}
			},
			Token::Operator(op) => {
				while let Some(top) = stack.last() {
					if top.precedence() >= op.precedence() {
						output.push(Token::Operator(*top));
						stack.pop();
					} else {
						break;
					}
				}

				stack.push(op)
			}
			value => output.push(value),
		}
	}

	while let Some(op) = stack.pop() {
		if op == Operator::Open {
			log::warn!("ignoring unbalanced `(`")
		} else {
			output.push(Token::Operator(op))
		}
	}

	output
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{expand_quantifiers, tokenize, DisplayTokens};

	fn concat(pattern: &str) -> String {
		DisplayTokens(&insert_concat(tokenize(pattern).unwrap())).to_string()
	}

	fn postfix(pattern: &str) -> String {
		let tokens = expand_quantifiers(tokenize(pattern).unwrap()).unwrap();
		DisplayTokens(&to_postfix(insert_concat(tokens))).to_string()
	}

	const CONCAT_TESTS: &[(&str, &str)] = &[
		("ab", "a.b"),
		("a(b)", "a.(b)"),
		("(a)(b)", "(a).(b)"),
		("a*b+c?d", "a*.b+.c?.d"),
		("a|b", "a|b"),
		("\\d[a-z]x", "\\d.[a-z].x"),
		("(a|b)", "(a|b)"),
	];

	#[test]
	fn concatenations() {
		for (pattern, expected) in CONCAT_TESTS {
			assert_eq!(concat(pattern), *expected, "concat of `{pattern}`")
		}
	}

	const POSTFIX_TESTS: &[(&str, &str)] = &[
		("ab", "ab."),
		("a|b", "ab|"),
		("ab|c", "ab.c|"),
		("a|bc", "abc.|"),
		("a|b|c", "ab|c|"),
		("abc", "ab.c."),
		("a*b", "a*b."),
		("(a|b)*c", "ab|*c."),
		("a(b|c)*d", "abc|*.d."),
		("a**", "a**"),
		("a{2,3}", "aa.a?."),
		("a.b", "ab."),
	];

	#[test]
	fn postfix_conversion() {
		for (pattern, expected) in POSTFIX_TESTS {
			assert_eq!(postfix(pattern), *expected, "postfix of `{pattern}`")
		}
	}

	#[test]
	fn unbalanced_parenthesis() {
		assert_eq!(postfix("(ab"), "ab.");
		assert_eq!(postfix("ab)c"), "ab.c.");
	}
}
