use crate::{Error, Operator, Options, Token};

/// Splits `pattern` into tokens with the default options.
pub fn tokenize(pattern: &str) -> Result<Vec<Token>, Error> {
	tokenize_with(pattern, Options::default())
}

/// Splits `pattern` into tokens.
///
/// Braces are not recognized here: `{2,3}` gives five literal tokens that
/// [`expand_quantifiers`](crate::expand_quantifiers) regroups.
pub fn tokenize_with(pattern: &str, options: Options) -> Result<Vec<Token>, Error> {
	let mut tokens = Vec::new();
	let mut chars = pattern.char_indices();

	while let Some((offset, c)) = chars.next() {
		let token = match c {
			'\\' => match chars.next() {
				Some((_, c)) => Token::Escape(c),
				None => return Err(Error::UnterminatedEscape),
			},
			'[' => {
				let mut class = String::from('[');
				let mut terminated = false;

				for (_, c) in chars.by_ref() {
					class.push(c);
					if c == ']' {
						terminated = true;
						break;
					}
				}

				if !terminated {
					if options.strict_classes {
						return Err(Error::UnterminatedCharClass(offset));
					}

					log::warn!("character class at offset {offset} extends to the end of the pattern");
				}

				Token::CharClass(class)
			}
			c => match Operator::from_char(c) {
				Some(op) => Token::Operator(op),
				None => Token::Literal(c),
			},
		};

		tokens.push(token)
	}

	log::debug!("{} tokens in `{pattern}`", tokens.len());
	Ok(tokens)
}
