use core::fmt;

use crate::Symbol;

/// Regular expression produced by state elimination.
///
/// The constructors [`Expr::concat`], [`Expr::union`] and [`Expr::star`]
/// simplify as they build, so that the printed form stays readable: the
/// empty word never appears explicitly in a concatenation, alternatives are
/// not repeated and stars are not nested.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
	/// Empty word.
	Empty,

	/// Single transition symbol.
	Symbol(Symbol),

	/// Sequence.
	Concat(Vec<Self>),

	/// Alternation.
	Union(Vec<Self>),

	/// Zero or more repetitions.
	Star(Box<Self>),
}

impl Expr {
	/// Builds the sequence `self` followed by `other`.
	pub fn concat(self, other: Self) -> Self {
		match (self, other) {
			(Self::Empty, e) | (e, Self::Empty) => e,
			(Self::Concat(mut a), Self::Concat(b)) => {
				a.extend(b);
				Self::Concat(a)
			}
			(Self::Concat(mut a), e) => {
				a.push(e);
				Self::Concat(a)
			}
			(e, Self::Concat(mut b)) => {
				b.insert(0, e);
				Self::Concat(b)
			}
			(a, b) => Self::Concat(vec![a, b]),
		}
	}

	/// Builds the alternation between `self` and `other`.
	pub fn union(self, other: Self) -> Self {
		let mut items = self.into_alternatives();
		for e in other.into_alternatives() {
			if !items.contains(&e) {
				items.push(e)
			}
		}

		if items.len() > 1 && items.iter().any(|e| *e != Self::Empty && e.is_nullable()) {
			items.retain(|e| *e != Self::Empty)
		}

		if items.len() == 1 {
			items.pop().unwrap_or(Self::Empty)
		} else {
			Self::Union(items)
		}
	}

	/// Builds the repetition of `self`, zero or more times.
	pub fn star(self) -> Self {
		match self {
			Self::Empty => Self::Empty,
			Self::Star(e) => Self::Star(e),
			Self::Union(items) if items.contains(&Self::Empty) => {
				let inner = items
					.into_iter()
					.filter(|e| *e != Self::Empty)
					.fold(None, |acc: Option<Self>, e| match acc {
						Some(acc) => Some(acc.union(e)),
						None => Some(e),
					});

				match inner {
					Some(inner) => inner.star(),
					None => Self::Empty,
				}
			}
			e => Self::Star(Box::new(e)),
		}
	}

	/// Checks if this expression matches the empty word.
	pub fn is_nullable(&self) -> bool {
		match self {
			Self::Empty | Self::Star(_) => true,
			Self::Symbol(_) => false,
			Self::Concat(items) => items.iter().all(Self::is_nullable),
			Self::Union(items) => items.iter().any(Self::is_nullable),
		}
	}

	fn into_alternatives(self) -> Vec<Self> {
		match self {
			Self::Union(items) => items,
			e => vec![e],
		}
	}

	/// Checks if this expression is an alternation with an empty
	/// alternative, printed as `(...)?`.
	fn is_optional(&self) -> bool {
		matches!(self, Self::Union(items) if items.contains(&Self::Empty))
	}

	/// Checks if a postfix operator can be applied to this expression
	/// without grouping it first.
	fn is_atomic(&self) -> bool {
		match self {
			Self::Symbol(symbol) => symbol.is_atomic(),
			_ => false,
		}
	}

	/// Display this expression as the operand of a postfix operator.
	///
	/// This will enclose it between parenthesis if necessary.
	pub fn display_sub(&self) -> DisplaySub {
		DisplaySub(self)
	}
}

impl fmt::Display for Expr {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Empty => Ok(()),
			Self::Symbol(symbol) => fmt_symbol(symbol, f),
			Self::Concat(items) => {
				for (i, item) in items.iter().enumerate() {
					if matches!(item, Self::Union(_)) && !item.is_optional() {
						write!(f, "({item})")?
					} else if is_brace(item) && starts_quantifier(&items[i + 1..]) {
						// `\{` is a distinct symbol, the brace is grouped instead.
						f.write_str("({)")?
					} else {
						fmt::Display::fmt(item, f)?
					}
				}

				Ok(())
			}
			Self::Union(items) => {
				let mut alternatives = items.iter().filter(|e| **e != Self::Empty);

				if self.is_optional() {
					let first = alternatives.next();
					match (first, alternatives.next()) {
						(Some(e), None) => write!(f, "{}?", e.display_sub()),
						_ => {
							f.write_str("(")?;
							fmt_alternatives(items.iter().filter(|e| **e != Self::Empty), f)?;
							f.write_str(")?")
						}
					}
				} else {
					fmt_alternatives(alternatives, f)
				}
			}
			Self::Star(e) => write!(f, "{}*", e.display_sub()),
		}
	}
}

fn fmt_alternatives<'a>(
	items: impl Iterator<Item = &'a Expr>,
	f: &mut fmt::Formatter,
) -> fmt::Result {
	for (i, item) in items.enumerate() {
		if i > 0 {
			f.write_str("|")?
		}

		fmt::Display::fmt(item, f)?
	}

	Ok(())
}

fn is_brace(e: &Expr) -> bool {
	matches!(e, Expr::Symbol(symbol) if symbol.as_str() == "{")
}

/// Checks if the items following a `{` symbol would read back as a brace
/// quantifier (`{n}`, `{n,}` or `{n,m}`).
fn starts_quantifier(rest: &[Expr]) -> bool {
	let mut text = String::new();
	for e in rest {
		let Expr::Symbol(symbol) = e else {
			return false;
		};

		match symbol.as_str() {
			"}" => {
				let bound = |s: &str| s.parse::<u32>().is_ok();
				return match text.split_once(',') {
					None => bound(&text),
					Some((min, "")) => bound(min),
					Some((min, max)) => bound(min) && bound(max),
				};
			}
			s @ ("0" | "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9" | ",") => text.push_str(s),
			_ => return false,
		}
	}

	false
}

/// Display the inner expression as a sub expression.
///
/// This will enclose it between parenthesis if necessary.
pub struct DisplaySub<'a>(&'a Expr);

impl<'a> fmt::Display for DisplaySub<'a> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		if self.0.is_atomic() {
			fmt::Display::fmt(self.0, f)
		} else {
			write!(f, "({})", self.0)
		}
	}
}

/// Writes a symbol, escaping the single characters the tokenizer would not
/// read as a literal.
fn fmt_symbol(symbol: &Symbol, f: &mut fmt::Formatter) -> fmt::Result {
	let mut chars = symbol.as_str().chars();
	match (chars.next(), chars.next()) {
		(Some(c @ ('|' | '*' | '+' | '?' | '(' | ')' | '.' | '\\' | '[')), None) => {
			write!(f, "\\{c}")
		}
		_ => f.write_str(symbol.as_str()),
	}
}

#[cfg(test)]
mod tests {
	use super::Expr;

	fn sym(s: &str) -> Expr {
		Expr::Symbol(s.into())
	}

	#[test]
	fn concat_drops_empty() {
		let e = Expr::Empty.concat(sym("a")).concat(Expr::Empty).concat(sym("b"));
		assert_eq!(e, Expr::Concat(vec![sym("a"), sym("b")]));
		assert_eq!(e.to_string(), "ab");
	}

	#[test]
	fn union_deduplicates() {
		let e = sym("a").union(sym("b")).union(sym("a"));
		assert_eq!(e.to_string(), "a|b");
		assert_eq!(sym("a").union(sym("a")), sym("a"));
	}

	#[test]
	fn empty_alternative_prints_optional() {
		assert_eq!(Expr::Empty.union(sym("a")).to_string(), "a?");
		assert_eq!(sym("a").concat(sym("b")).union(Expr::Empty).to_string(), "(ab)?");
		assert_eq!(
			Expr::Empty.union(sym("a")).union(sym("b")).to_string(),
			"(a|b)?"
		);
	}

	#[test]
	fn nullable_alternative_absorbs_empty() {
		assert_eq!(Expr::Empty.union(sym("a").star()), sym("a").star());
	}

	#[test]
	fn star_simplifications() {
		assert_eq!(Expr::Empty.star(), Expr::Empty);
		assert_eq!(sym("a").star().star(), sym("a").star());
		assert_eq!(Expr::Empty.union(sym("a")).star(), sym("a").star());
	}

	const TESTS: &[(&str, &str)] = &[
		("a", "a"),
		("*", "\\*"),
		(".", "\\."),
		("{", "{"),
		("}", "}"),
		("]", "]"),
		("\\d", "\\d"),
		("[a-z]", "[a-z]"),
		("ab", "ab"),
	];

	#[test]
	fn symbols() {
		for (symbol, formatted) in TESTS {
			assert_eq!(sym(symbol).to_string(), *formatted);
			assert!(sym(symbol).star().to_string().ends_with('*'))
		}

		assert_eq!(sym("ab").star().to_string(), "(ab)*");
		assert_eq!(sym("\\d").star().to_string(), "\\d*");
	}

	#[test]
	fn nested_groups() {
		let e = sym("a").concat(sym("b").union(sym("c")).star()).concat(sym("d"));
		assert_eq!(e.to_string(), "a(b|c)*d");

		let e = sym("x").concat(sym("a").union(sym("b")));
		assert_eq!(e.to_string(), "x(a|b)");
	}

	fn word(s: &str) -> Expr {
		s.chars().fold(Expr::Empty, |e, c| e.concat(Expr::Symbol(c.into())))
	}

	#[test]
	fn literal_braces() {
		assert_eq!(word("a{x}").to_string(), "a{x}");
		assert_eq!(word("a}").to_string(), "a}");
		assert_eq!(word("a{2}").to_string(), "a({)2}");
		assert_eq!(word("{1,}").to_string(), "({)1,}");
		assert_eq!(word("{1,2").to_string(), "{1,2");
		assert_eq!(word("{,2}").to_string(), "{,2}");
	}

	#[test]
	fn alternatives() {
		let e = sym("a").union(sym("b").concat(sym("c"))).union(sym("d").star());
		assert_eq!(e.to_string(), "a|bc|d*");
	}
}
