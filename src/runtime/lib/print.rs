use std::io::{self, Write};

use gc::{Finalize, Trace};

use crate::fmt;
use super::super::{
	panic::Panic,
	value::{Arity, CallContext, NativeFun, Value},
};


/// print : write the external representation of each argument to stdout, followed by
/// a newline.
#[derive(Trace, Finalize)]
pub struct Print;

impl NativeFun for Print {
	fn name(&self) -> &'static str { "print" }

	fn arity(&self) -> Arity { Arity::at_least(0) }

	fn call(&mut self, context: CallContext) -> Result<Value, Panic> {
		let stdout = io::stdout();
		let mut stdout = stdout.lock();

		for value in context.args {
			write!(stdout, "{}", fmt::Show(value, context.interner))?;
		}

		writeln!(stdout)?;

		Ok(Value::Nil)
	}
}
