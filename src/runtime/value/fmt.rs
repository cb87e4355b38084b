use crate::{
	fmt::Display,
	symbol::Interner,
};
use super::Value;


/// The external representation of values.
/// Procedures are rendered opaquely.
impl<'a> Display<'a> for Value {
	type Context = &'a Interner;

	fn fmt(&self, f: &mut std::fmt::Formatter<'_>, context: Self::Context) -> std::fmt::Result {
		match self {
			Self::Nil => f.write_str("()"),

			Self::Bool(true) => f.write_str("#t"),

			Self::Bool(false) => f.write_str("#f"),

			Self::Int(int) => write!(f, "{}", int),

			Self::Symbol(symbol) => symbol.fmt(f, context),

			Self::Pair(pair) => {
				f.write_str("(")?;

				let mut pair = pair;

				loop {
					pair.car.fmt(f, context)?;

					match &pair.cdr {
						Self::Nil => break f.write_str(")"),

						Self::Pair(rest) => {
							f.write_str(" ")?;
							pair = rest;
						}

						tail => {
							f.write_str(" . ")?;
							tail.fmt(f, context)?;
							break f.write_str(")");
						}
					}
				}
			}

			Self::Closure(_) => f.write_str("#<closure>"),

			Self::Primitive(_) => f.write_str("#<subr>"),

			Self::Boxed(_) => f.write_str("#<box>"),
		}
	}
}
