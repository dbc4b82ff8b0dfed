//! This library provides the pattern front-end of the [`rexfa`] crate.
//!
//! A pattern goes through the following stages:
//!   - [`tokenize`]: the pattern string is split into [`Token`]s;
//!   - [`expand_quantifiers`]: brace quantifiers (`{n}`, `{n,}`, `{n,m}`) are
//!     rewritten with the primitive operators `*` and `?`;
//!   - [`insert_concat`]: implicit concatenations are made explicit;
//!   - [`to_postfix`]: the infix sequence is reordered into postfix notation;
//!   - [`build_nfa`]: the postfix sequence is compiled into an
//!     [`NFA`](rexfa_automata::NFA) using the Thompson construction.
//!
//! [`rexfa`]: <https://crates.io/crates/rexfa>
use rexfa_automata::{Symbol, TooManyStates};

mod parsing;
pub use parsing::*;

mod display;
pub use display::*;

mod expand;
pub use expand::*;

mod postfix;
pub use postfix::*;

mod build;
pub use build::*;

mod explain;
pub use explain::*;

/// Front-end options.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Options {
	/// Reject character classes missing their closing `]`.
	///
	/// By default, an unterminated class extends to the end of the pattern.
	pub strict_classes: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("incomplete escape sequence at end of pattern")]
	UnterminatedEscape,

	#[error("missing closing `]` for the character class starting at offset {0}")]
	UnterminatedCharClass(usize),

	#[error("nothing to repeat for quantifier `{0}`")]
	DanglingQuantifier(Repeat),

	#[error("malformed postfix expression: {0}")]
	MalformedPostfix(PostfixDefect),

	#[error(transparent)]
	TooManyStates(#[from] TooManyStates),
}

/// Reason why a postfix sequence cannot be compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PostfixDefect {
	#[error("missing operand for `{0}`")]
	MissingOperand(Operator),

	#[error("{0} operands left unconsumed")]
	UnconsumedOperands(usize),

	#[error("unexpanded quantifier `{0}`")]
	UnexpandedQuantifier(Repeat),
}

impl From<PostfixDefect> for Error {
	fn from(value: PostfixDefect) -> Self {
		Self::MalformedPostfix(value)
	}
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Token kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
	Literal,
	Escape,
	CharClass,
	Operator,
}

/// Pattern token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
	/// Single literal character.
	Literal(char),

	/// Escape sequence, `\` followed by the given character.
	Escape(char),

	/// Character class, brackets included.
	///
	/// The class body is opaque: `[a-z]` is a single symbol.
	CharClass(String),

	/// Operator.
	Operator(Operator),
}

impl Token {
	pub fn kind(&self) -> TokenKind {
		match self {
			Self::Literal(_) => TokenKind::Literal,
			Self::Escape(_) => TokenKind::Escape,
			Self::CharClass(_) => TokenKind::CharClass,
			Self::Operator(_) => TokenKind::Operator,
		}
	}

	/// Checks if this token denotes an operand (a literal, escape sequence
	/// or character class).
	pub fn is_value(&self) -> bool {
		!matches!(self, Self::Operator(_))
	}

	pub fn as_operator(&self) -> Option<Operator> {
		match self {
			Self::Operator(op) => Some(*op),
			_ => None,
		}
	}

	/// Returns the transition symbol of a value token: its raw text.
	pub fn to_symbol(&self) -> Option<Symbol> {
		match self {
			Self::Literal(c) => Some(Symbol::from(*c)),
			Self::Escape(c) => Some(Symbol::new(format!("\\{c}"))),
			Self::CharClass(class) => Some(Symbol::new(class.as_str())),
			Self::Operator(_) => None,
		}
	}
}

impl From<Operator> for Token {
	fn from(value: Operator) -> Self {
		Self::Operator(value)
	}
}

/// Operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
	/// Group opening `(`.
	Open,

	/// Group closing `)`.
	Close,

	/// Alternation `|`.
	Alternation,

	/// Zero or more `*`.
	Star,

	/// One or more `+`.
	Plus,

	/// Zero or one `?`.
	Optional,

	/// Concatenation `.`.
	///
	/// Usually implicit, made explicit by [`insert_concat`].
	Concat,

	/// Brace quantifier.
	Repeat(Repeat),
}

impl Operator {
	pub fn from_char(c: char) -> Option<Self> {
		match c {
			'(' => Some(Self::Open),
			')' => Some(Self::Close),
			'|' => Some(Self::Alternation),
			'*' => Some(Self::Star),
			'+' => Some(Self::Plus),
			'?' => Some(Self::Optional),
			'.' => Some(Self::Concat),
			_ => None,
		}
	}

	/// Binding strength of the operator. Parenthesis have none.
	pub fn precedence(&self) -> Option<u8> {
		match self {
			Self::Star | Self::Plus | Self::Optional | Self::Repeat(_) => Some(3),
			Self::Concat => Some(2),
			Self::Alternation => Some(1),
			Self::Open | Self::Close => None,
		}
	}

	/// Checks if this is a postfix (unary) operator.
	pub fn is_postfix(&self) -> bool {
		matches!(
			self,
			Self::Star | Self::Plus | Self::Optional | Self::Repeat(_)
		)
	}
}

/// Brace quantifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repeat {
	/// `{n}`
	Exactly(u32),

	/// `{n,}`
	AtLeast(u32),

	/// `{n,m}`
	Between(u32, u32),
}

impl Repeat {
	pub fn min(&self) -> u32 {
		match self {
			Self::Exactly(n) | Self::AtLeast(n) | Self::Between(n, _) => *n,
		}
	}

	pub fn max(&self) -> Option<u32> {
		match self {
			Self::Exactly(n) | Self::Between(_, n) => Some(*n),
			Self::AtLeast(_) => None,
		}
	}
}

/// Runs the whole front-end on `pattern`, returning the postfix token
/// sequence ready for [`build_nfa`].
pub fn parse(pattern: &str, options: Options) -> Result<Vec<Token>> {
	let tokens = tokenize_with(pattern, options)?;
	let tokens = expand_quantifiers(tokens)?;
	Ok(to_postfix(insert_concat(tokens)))
}
