use crate::{
	fmt::Display,
	symbol::Interner,
};
use super::Error;


impl<'a> Display<'a> for Error {
	type Context = &'a Interner;

	fn fmt(&self, f: &mut std::fmt::Formatter<'_>, context: Self::Context) -> std::fmt::Result {
		match self {
			Self::MalformedForm { form } => write!(f, "malformed {}", form),

			Self::UnboundVariable { symbol } => {
				write!(f, "unbound variable: ")?;
				symbol.fmt(f, context)
			}

			Self::DefineNotAtTopLevel => write!(f, "define is only allowed at top level"),
		}
	}
}
