use std::fmt::{self, Display};

use super::{Error, ErrorKind};


impl Display for ErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::UnexpectedEof => "unexpected end of input".fmt(f),

			Self::Unexpected(value) => write!(f, "unexpected '{}'", *value as char),

			Self::MalformedDottedList => "malformed dotted list".fmt(f),

			Self::InvalidNumber(number) => write!(f, "invalid number: {}", number),
		}
	}
}


impl Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{} - {}.", self.pos, self.kind)
	}
}
