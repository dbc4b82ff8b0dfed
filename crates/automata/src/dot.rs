use std::fmt;

use crate::{StateId, Symbol, DFA, EPSILON, NFA};

pub trait DotDisplay {
	fn dot(&self) -> DotDisplayed<Self> {
		DotDisplayed(self)
	}

	fn dot_fmt(&self, f: &mut fmt::Formatter) -> fmt::Result;
}

impl DotDisplay for StateId {
	fn dot_fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "q{self}")
	}
}

pub struct DotDisplayed<'a, T: ?Sized>(pub &'a T);

impl<'a, T: ?Sized + DotDisplay> fmt::Display for DotDisplayed<'a, T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.dot_fmt(f)
	}
}

pub trait DotLabelDisplay {
	fn dot_label(&self) -> DotLabelDisplayed<Self> {
		DotLabelDisplayed(self)
	}

	fn dot_label_fmt(&self, f: &mut fmt::Formatter) -> fmt::Result;
}

impl DotLabelDisplay for char {
	fn dot_label_fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			'"' => f.write_str("\\\""),
			'\\' => f.write_str("\\\\"),
			c if c.is_control() => write!(f, "\\\\u{{{:x}}}", *c as u32),
			c => fmt::Display::fmt(c, f),
		}
	}
}

impl DotLabelDisplay for Symbol {
	fn dot_label_fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		for c in self.as_str().chars() {
			c.dot_label_fmt(f)?
		}

		Ok(())
	}
}

impl DotLabelDisplay for StateId {
	fn dot_label_fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "q{self}")
	}
}

impl<'a, T: DotLabelDisplay> DotLabelDisplay for &'a T {
	fn dot_label_fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		T::dot_label_fmt(*self, f)
	}
}

impl<T: DotLabelDisplay> DotLabelDisplay for Option<T> {
	fn dot_label_fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Some(t) => t.dot_label_fmt(f),
			None => f.write_str(EPSILON),
		}
	}
}

pub struct DotLabelDisplayed<'a, T: ?Sized>(pub &'a T);

impl<'a, T: ?Sized + DotLabelDisplay> fmt::Display for DotLabelDisplayed<'a, T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.dot_label_fmt(f)
	}
}

fn shape(is_final: bool) -> &'static str {
	if is_final {
		"doublecircle"
	} else {
		"circle"
	}
}

impl DotDisplay for NFA {
	fn dot_fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		writeln!(f, "digraph {{")?;
		writeln!(f, "\trankdir = LR")?;

		for q in self.states() {
			writeln!(
				f,
				"\t{} [label = \"{}\", shape = {}]",
				q.dot(),
				q.dot_label(),
				shape(self.is_final_state(q))
			)?;
		}

		if let Some(q) = self.initial_state() {
			writeln!(f, "\tstart [shape = point]")?;
			writeln!(f, "\tstart -> {}", q.dot())?;
		}

		for (q, transitions) in self.transitions() {
			for (label, targets) in transitions {
				for r in targets {
					writeln!(
						f,
						"\t{} -> {} [label = \"{}\"]",
						q.dot(),
						r.dot(),
						label.dot_label()
					)?;
				}
			}
		}

		write!(f, "}}")
	}
}

impl DotDisplay for DFA {
	fn dot_fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		writeln!(f, "digraph {{")?;
		writeln!(f, "\trankdir = LR")?;

		for q in 0..self.len() {
			writeln!(
				f,
				"\tD{q} [label = \"D{q}\", shape = {}]",
				shape(self.is_final_state(q))
			)?;
		}

		writeln!(f, "\tstart [shape = point]")?;
		writeln!(f, "\tstart -> D{}", self.initial_state())?;

		for (q, transitions) in self.transitions().iter().enumerate() {
			for (symbol, r) in transitions {
				writeln!(f, "\tD{q} -> D{r} [label = \"{}\"]", symbol.dot_label())?;
			}
		}

		write!(f, "}}")
	}
}
