use std::io;

use crate::{
	fmt::Display,
	symbol::{Interner, Symbol},
};
use super::value::Value;


/// A runtime error.
/// Panics abort the evaluation of the current top level expression only: side effects
/// of previously evaluated expressions persist.
#[derive(Debug)]
pub enum Panic {
	/// Reference to a global variable that has never been defined.
	UnboundGlobal { symbol: Symbol },
	/// Closure applied to the wrong number of arguments.
	ClosureArity {
		required: usize,
		variadic: bool,
		got: usize,
	},
	/// Primitive procedure applied to the wrong number of arguments.
	PrimitiveArity {
		name: &'static str,
		required: usize,
		rest: bool,
		got: usize,
	},
	/// Application of a value that is not a procedure.
	InvalidApplication { value: Value },
	/// Primitive procedure applied to a value outside its domain.
	InvalidOperand {
		name: &'static str,
		value: Value,
	},
	DivisionByZero,
	/// A malformed control block was popped from the stack. This indicates an
	/// inconsistency between compiler and virtual machine, not a user error.
	CorruptStack,
	StackOverflow,
	Io(io::Error),
}


impl Panic {
	pub fn unbound_global(symbol: Symbol) -> Self {
		Self::UnboundGlobal { symbol }
	}


	pub fn closure_arity(required: usize, variadic: bool, got: usize) -> Self {
		Self::ClosureArity { required, variadic, got }
	}


	pub fn primitive_arity(name: &'static str, required: usize, rest: bool, got: usize) -> Self {
		Self::PrimitiveArity { name, required, rest, got }
	}


	pub fn invalid_application(value: Value) -> Self {
		Self::InvalidApplication { value }
	}


	pub fn invalid_operand(name: &'static str, value: Value) -> Self {
		Self::InvalidOperand { name, value }
	}
}


impl From<io::Error> for Panic {
	fn from(error: io::Error) -> Self {
		Self::Io(error)
	}
}


impl<'a> Display<'a> for Panic {
	type Context = &'a Interner;

	fn fmt(&self, f: &mut std::fmt::Formatter<'_>, context: Self::Context) -> std::fmt::Result {
		match self {
			Self::UnboundGlobal { symbol } => {
				write!(f, "unbound global variable: ")?;
				symbol.fmt(f, context)
			}

			Self::ClosureArity { required, variadic: false, got } => write!(
				f,
				"closure: required {} arguments, got {}",
				required,
				got
			),

			Self::ClosureArity { required, variadic: true, got } => write!(
				f,
				"closure: required at least {} arguments, got {}",
				required,
				got
			),

			Self::PrimitiveArity { name, required, rest: false, got } => write!(
				f,
				"primitive procedure {}: required {} arguments, got {}",
				name,
				required,
				got
			),

			Self::PrimitiveArity { name, required, rest: true, got } => write!(
				f,
				"primitive procedure {}: required at least {} arguments, got {}",
				name,
				required,
				got
			),

			Self::InvalidApplication { value } => {
				write!(f, "invalid application: ")?;
				value.fmt(f, context)?;
				write!(f, " is not a procedure")
			}

			Self::InvalidOperand { name, value } => {
				write!(f, "primitive procedure {}: invalid operand ", name)?;
				value.fmt(f, context)
			}

			Self::DivisionByZero => write!(f, "division by zero"),

			Self::CorruptStack => write!(f, "corrupted stack: malformed control block"),

			Self::StackOverflow => write!(f, "stack overflow"),

			Self::Io(error) => write!(f, "io error: {}", error),
		}
	}
}
