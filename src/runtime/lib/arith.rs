use gc::{Finalize, Trace};

use super::super::{
	panic::Panic,
	value::{Arity, CallContext, NativeFun, Value},
};


/// Check that every argument is an integer.
fn integers(name: &'static str, args: &[Value]) -> Result<Vec<i64>, Panic> {
	args
		.iter()
		.map(
			|value| match value {
				Value::Int(int) => Ok(*int),
				value => Err(Panic::invalid_operand(name, value.copy())),
			}
		)
		.collect()
}


/// + : fold addition over one or more integers.
#[derive(Trace, Finalize)]
pub struct Add;

impl NativeFun for Add {
	fn name(&self) -> &'static str { "+" }

	fn arity(&self) -> Arity { Arity::at_least(1) }

	fn call(&mut self, context: CallContext) -> Result<Value, Panic> {
		let ints = integers(self.name(), context.args)?;

		let sum = ints[1 ..]
			.iter()
			.fold(ints[0], |sum, int| sum.wrapping_add(*int));

		Ok(sum.into())
	}
}


/// - : fold subtraction over one or more integers.
#[derive(Trace, Finalize)]
pub struct Sub;

impl NativeFun for Sub {
	fn name(&self) -> &'static str { "-" }

	fn arity(&self) -> Arity { Arity::at_least(1) }

	fn call(&mut self, context: CallContext) -> Result<Value, Panic> {
		let ints = integers(self.name(), context.args)?;

		let difference = ints[1 ..]
			.iter()
			.fold(ints[0], |difference, int| difference.wrapping_sub(*int));

		Ok(difference.into())
	}
}


/// * : fold multiplication over one or more integers.
#[derive(Trace, Finalize)]
pub struct Mul;

impl NativeFun for Mul {
	fn name(&self) -> &'static str { "*" }

	fn arity(&self) -> Arity { Arity::at_least(1) }

	fn call(&mut self, context: CallContext) -> Result<Value, Panic> {
		let ints = integers(self.name(), context.args)?;

		let product = ints[1 ..]
			.iter()
			.fold(ints[0], |product, int| product.wrapping_mul(*int));

		Ok(product.into())
	}
}


/// / : fold truncating division over one or more integers.
#[derive(Trace, Finalize)]
pub struct Div;

impl NativeFun for Div {
	fn name(&self) -> &'static str { "/" }

	fn arity(&self) -> Arity { Arity::at_least(1) }

	fn call(&mut self, context: CallContext) -> Result<Value, Panic> {
		let ints = integers(self.name(), context.args)?;

		let mut quotient = ints[0];

		for int in &ints[1 ..] {
			if *int == 0 {
				return Err(Panic::DivisionByZero);
			}

			quotient = quotient.wrapping_div(*int);
		}

		Ok(quotient.into())
	}
}


/// = : integer equality.
#[derive(Trace, Finalize)]
pub struct NumEq;

impl NativeFun for NumEq {
	fn name(&self) -> &'static str { "=" }

	fn arity(&self) -> Arity { Arity::exactly(2) }

	fn call(&mut self, context: CallContext) -> Result<Value, Panic> {
		let ints = integers(self.name(), context.args)?;
		Ok((ints[0] == ints[1]).into())
	}
}


/// < : integer less-than.
#[derive(Trace, Finalize)]
pub struct Lt;

impl NativeFun for Lt {
	fn name(&self) -> &'static str { "<" }

	fn arity(&self) -> Arity { Arity::exactly(2) }

	fn call(&mut self, context: CallContext) -> Result<Value, Panic> {
		let ints = integers(self.name(), context.args)?;
		Ok((ints[0] < ints[1]).into())
	}
}


/// > : integer greater-than.
#[derive(Trace, Finalize)]
pub struct Gt;

impl NativeFun for Gt {
	fn name(&self) -> &'static str { ">" }

	fn arity(&self) -> Arity { Arity::exactly(2) }

	fn call(&mut self, context: CallContext) -> Result<Value, Panic> {
		let ints = integers(self.name(), context.args)?;
		Ok((ints[0] > ints[1]).into())
	}
}
