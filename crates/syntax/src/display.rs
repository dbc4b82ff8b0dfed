use core::fmt;

use crate::{Operator, Repeat, Token, TokenKind};

impl fmt::Display for TokenKind {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Literal => f.write_str("literal"),
			Self::Escape => f.write_str("escape"),
			Self::CharClass => f.write_str("charclass"),
			Self::Operator => f.write_str("operator"),
		}
	}
}

/// Displays the raw text of the token.
impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Literal(c) => fmt::Display::fmt(c, f),
			Self::Escape(c) => write!(f, "\\{c}"),
			Self::CharClass(class) => f.write_str(class),
			Self::Operator(op) => op.fmt(f),
		}
	}
}

impl fmt::Display for Operator {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Open => f.write_str("("),
			Self::Close => f.write_str(")"),
			Self::Alternation => f.write_str("|"),
			Self::Star => f.write_str("*"),
			Self::Plus => f.write_str("+"),
			Self::Optional => f.write_str("?"),
			Self::Concat => f.write_str("."),
			Self::Repeat(r) => r.fmt(f),
		}
	}
}

impl fmt::Display for Repeat {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Exactly(n) => write!(f, "{{{n}}}"),
			Self::AtLeast(n) => write!(f, "{{{n},}}"),
			Self::Between(n, m) => write!(f, "{{{n},{m}}}"),
		}
	}
}

/// Displays a token sequence as the concatenation of the raw token texts.
pub struct DisplayTokens<'a>(pub &'a [Token]);

impl<'a> fmt::Display for DisplayTokens<'a> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		for token in self.0 {
			token.fmt(f)?
		}

		Ok(())
	}
}
