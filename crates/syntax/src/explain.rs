use std::fmt;

use crate::{Operator, Repeat, Token};

/// Human readable description of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
	/// Raw token text.
	pub token: String,

	pub description: String,
}

impl fmt::Display for Explanation {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{} -> {}", self.token, self.description)
	}
}

fn describe_repeat(repeat: Repeat) -> String {
	match repeat {
		Repeat::Exactly(n) => format!("exactly {n} repetitions"),
		Repeat::AtLeast(n) => format!("{n} or more repetitions"),
		Repeat::Between(n, m) => format!("between {n} and {m} repetitions"),
	}
}

/// Describes a single token, if it is recognized.
pub fn describe(token: &Token) -> Option<String> {
	let description = match token {
		Token::Escape('d') => "digit (0-9)".to_owned(),
		Token::Escape('w') => "word character (a-z, A-Z, 0-9, _)".to_owned(),
		Token::Escape('s') => "whitespace".to_owned(),
		Token::Escape(c) => format!("literal `{c}`"),
		Token::CharClass(class) if class.starts_with("[^") => "negated character set".to_owned(),
		Token::CharClass(_) => "character set".to_owned(),
		Token::Operator(Operator::Star) => "zero or more repetitions".to_owned(),
		Token::Operator(Operator::Plus) => "one or more repetitions".to_owned(),
		Token::Operator(Operator::Optional) => "zero or one repetition".to_owned(),
		Token::Operator(Operator::Alternation) => "alternation (OR)".to_owned(),
		Token::Operator(Operator::Open) => "group".to_owned(),
		Token::Operator(Operator::Concat) => "concatenation".to_owned(),
		Token::Operator(Operator::Repeat(repeat)) => describe_repeat(*repeat),
		Token::Literal(_) | Token::Operator(Operator::Close) => return None,
	};

	Some(description)
}

/// Describes the recognized tokens of the given sequence, in order.
///
/// Brace quantifiers are only described once regrouped by
/// [`group_quantifiers`](crate::group_quantifiers).
pub fn explain(tokens: &[Token]) -> Vec<Explanation> {
	tokens
		.iter()
		.filter_map(|token| {
			describe(token).map(|description| Explanation {
				token: token.to_string(),
				description,
			})
		})
		.collect()
}
