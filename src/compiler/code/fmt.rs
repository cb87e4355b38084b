use crate::{
	fmt::{Display, Indentation},
	symbol::Interner,
};
use super::Inst;


/// The context for dumping instruction chains.
#[derive(Debug, Copy, Clone)]
pub struct Context<'a> {
	pub interner: &'a Interner,
	indentation: Indentation,
}


impl<'a> Context<'a> {
	fn indented(self) -> Self {
		Self {
			interner: self.interner,
			indentation: self.indentation.increase(),
		}
	}
}


impl<'a> From<&'a Interner> for Context<'a> {
	fn from(interner: &'a Interner) -> Self {
		Self {
			interner,
			indentation: Indentation::default(),
		}
	}
}


/// One instruction per line, with branch targets and closure bodies indented.
impl<'a> Display<'a> for Inst {
	type Context = Context<'a>;

	fn fmt(&self, f: &mut std::fmt::Formatter<'_>, context: Self::Context) -> std::fmt::Result {
		let mut inst = self;

		loop {
			write!(f, "{}", context.indentation)?;

			inst = match inst {
				Self::Halt => break writeln!(f, "halt"),

				Self::ReferLocal { slot, next } => {
					writeln!(f, "refer-local {}", slot)?;
					next
				}

				Self::ReferFree { slot, next } => {
					writeln!(f, "refer-free {}", slot)?;
					next
				}

				Self::ReferGlobal { symbol, next } => {
					write!(f, "refer-global ")?;
					symbol.fmt(f, context.interner)?;
					writeln!(f)?;
					next
				}

				Self::Indirect { next } => {
					writeln!(f, "indirect")?;
					next
				}

				Self::Constant { value, next } => {
					write!(f, "constant ")?;
					value.fmt(f, context.interner)?;
					writeln!(f)?;
					next
				}

				Self::Close { params, variadic, free_count, body, next } => {
					writeln!(
						f,
						"close {}{} {}",
						params,
						if *variadic { "+" } else { "" },
						free_count
					)?;
					body.fmt(f, context.indented())?;
					next
				}

				Self::Box { slot, next } => {
					writeln!(f, "box {}", slot)?;
					next
				}

				Self::Test { then, otherwise } => {
					writeln!(f, "test")?;

					writeln!(f, "{}then:", context.indentation)?;
					then.fmt(f, context.indented())?;

					writeln!(f, "{}else:", context.indentation)?;
					break otherwise.fmt(f, context.indented());
				}

				Self::AssignLocal { slot, next } => {
					writeln!(f, "assign-local {}", slot)?;
					next
				}

				Self::AssignFree { slot, next } => {
					writeln!(f, "assign-free {}", slot)?;
					next
				}

				Self::AssignGlobal { symbol, next } => {
					write!(f, "assign-global ")?;
					symbol.fmt(f, context.interner)?;
					writeln!(f)?;
					next
				}

				Self::Conti { pop, next } => {
					writeln!(f, "conti {}", pop)?;
					next
				}

				Self::Nuate { stack, next } => {
					writeln!(f, "nuate {}", stack.len())?;
					next
				}

				Self::Frame { ret, next } => {
					writeln!(f, "frame")?;
					next.fmt(f, context.indented())?;
					ret
				}

				Self::Argument { next } => {
					writeln!(f, "argument")?;
					next
				}

				Self::Shift { count, depth, next } => {
					writeln!(f, "shift {} {}", count, depth)?;
					next
				}

				Self::Apply { count } => break writeln!(f, "apply {}", count),

				Self::Return { count } => break writeln!(f, "return {}", count),
			}
		}
	}
}
