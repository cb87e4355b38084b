use crate::{
	runtime::value::Value,
	symbol::Interner,
};
use super::{Cursor, Error, Source, SourcePos};


const SYMBOL_PUNCTUATION: &[u8] = b"~!@$%^&*-_=+:/?<>";


fn is_symbol_start(input: u8) -> bool {
	input.is_ascii_alphabetic() || SYMBOL_PUNCTUATION.contains(&input)
}


fn is_symbol_continuation(input: u8) -> bool {
	is_symbol_start(input) || input.is_ascii_digit()
}


/// A form produced while scanning a list: either a proper datum, or one of the
/// structural markers that are only meaningful inside parentheses.
#[derive(Debug)]
enum Form {
	Datum(Value),
	Close(SourcePos),
	Dot(SourcePos),
}


/// The S-expression reader.
/// Produces the homoiconic value tree directly: integers, symbols, pairs, nil and
/// booleans. Symbols are interned on the fly.
#[derive(Debug)]
pub struct Reader<'a, 'b> {
	cursor: Cursor<'a>,
	interner: &'b mut Interner,
}


impl<'a, 'b> Reader<'a, 'b> {
	pub fn new(source: &'a Source, interner: &'b mut Interner) -> Self {
		Self {
			cursor: Cursor::new(&source.contents),
			interner,
		}
	}


	/// Read the next datum.
	/// Returns None as the end-of-input sentinel.
	pub fn read(&mut self) -> Result<Option<Value>, Error> {
		match self.read_form()? {
			None => Ok(None),
			Some(Form::Datum(value)) => Ok(Some(value)),
			Some(Form::Close(pos)) => Err(Error::unexpected(b')', pos)),
			Some(Form::Dot(pos)) => Err(Error::unexpected(b'.', pos)),
		}
	}


	fn read_form(&mut self) -> Result<Option<Form>, Error> {
		loop {
			let pos = self.cursor.pos();

			let input = match self.cursor.take() {
				Some(input) => input,
				None => return Ok(None),
			};

			match input {
				b';' => self.skip_line(),

				input if input.is_ascii_whitespace() => (),

				b'(' => {
					let list = self.read_list(pos)?;
					return Ok(Some(Form::Datum(list)));
				}

				b')' => return Ok(Some(Form::Close(pos))),

				b'.' => return Ok(Some(Form::Dot(pos))),

				b'\'' => {
					let quote = self.read_quote(pos)?;
					return Ok(Some(Form::Datum(quote)));
				}

				b'#' => {
					let boolean = self.read_hash(pos)?;
					return Ok(Some(Form::Datum(boolean)));
				}

				input if input.is_ascii_digit() => {
					let number = self.read_number(input, false, pos)?;
					return Ok(Some(Form::Datum(number)));
				}

				// A minus sign starts a number when followed by a digit, and is an
				// ordinary symbol character otherwise.
				b'-' => {
					let datum = match self.cursor.peek() {
						Some(digit) if digit.is_ascii_digit() => {
							self.cursor.take();
							self.read_number(digit, true, pos)?
						}

						_ => self.read_symbol(b'-'),
					};

					return Ok(Some(Form::Datum(datum)));
				}

				input if is_symbol_start(input) => {
					let symbol = self.read_symbol(input);
					return Ok(Some(Form::Datum(symbol)));
				}

				input => return Err(Error::unexpected(input, pos)),
			}
		}
	}


	fn skip_line(&mut self) {
		while let Some(input) = self.cursor.take() {
			if input == b'\n' {
				return;
			}
		}
	}


	fn read_list(&mut self, open_pos: SourcePos) -> Result<Value, Error> {
		let mut items = Vec::new();

		loop {
			match self.read_form()? {
				None => return Err(Error::unexpected_eof(open_pos)),

				Some(Form::Close(_)) => return Ok(Value::list(items)),

				Some(Form::Dot(dot_pos)) => {
					if items.is_empty() {
						return Err(Error::malformed_dotted_list(dot_pos));
					}

					let tail = match self.read_form()? {
						Some(Form::Datum(value)) => value,
						Some(Form::Close(pos)) | Some(Form::Dot(pos)) => {
							return Err(Error::malformed_dotted_list(pos));
						}
						None => return Err(Error::unexpected_eof(open_pos)),
					};

					// Exactly one datum may follow the dot.
					return match self.read_form()? {
						Some(Form::Close(_)) => Ok(Value::dotted_list(items, tail)),
						Some(Form::Dot(pos)) => Err(Error::malformed_dotted_list(pos)),
						Some(Form::Datum(_)) => Err(Error::malformed_dotted_list(dot_pos)),
						None => Err(Error::unexpected_eof(open_pos)),
					};
				}

				Some(Form::Datum(value)) => items.push(value),
			}
		}
	}


	fn read_quote(&mut self, pos: SourcePos) -> Result<Value, Error> {
		let quote = self.interner.get_or_intern("quote");

		let quoted = match self.read_form()? {
			Some(Form::Datum(value)) => value,
			Some(Form::Close(pos)) => return Err(Error::unexpected(b')', pos)),
			Some(Form::Dot(pos)) => return Err(Error::unexpected(b'.', pos)),
			None => return Err(Error::unexpected_eof(pos)),
		};

		Ok(
			Value::list(
				vec![Value::Symbol(quote), quoted]
			)
		)
	}


	fn read_hash(&mut self, pos: SourcePos) -> Result<Value, Error> {
		match self.cursor.take() {
			Some(b't') => Ok(Value::Bool(true)),
			Some(b'f') => Ok(Value::Bool(false)),
			Some(input) => Err(Error::unexpected(input, pos)),
			None => Err(Error::unexpected_eof(pos)),
		}
	}


	fn read_number(&mut self, first_digit: u8, negative: bool, pos: SourcePos) -> Result<Value, Error> {
		let mut digits = String::new();

		if negative {
			digits.push('-');
		}

		digits.push(first_digit as char);
		digits.extend(
			self.cursor
				.take_while(|input| input.is_ascii_digit())
				.iter()
				.map(|&digit| digit as char)
		);

		let value: i64 = digits
			.parse()
			.map_err(|_| Error::invalid_number(&digits, pos))?;

		Ok(Value::Int(value))
	}


	fn read_symbol(&mut self, first_char: u8) -> Value {
		let mut name = String::new();

		name.push(first_char as char);
		name.extend(
			self.cursor
				.take_while(is_symbol_continuation)
				.iter()
				.map(|&input| input as char)
		);

		Value::Symbol(self.interner.get_or_intern(name))
	}
}
