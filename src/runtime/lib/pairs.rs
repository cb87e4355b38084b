use gc::{Finalize, Trace};

use super::super::{
	panic::Panic,
	value::{Arity, CallContext, NativeFun, Value},
};


/// cons
#[derive(Trace, Finalize)]
pub struct Cons;

impl NativeFun for Cons {
	fn name(&self) -> &'static str { "cons" }

	fn arity(&self) -> Arity { Arity::exactly(2) }

	fn call(&mut self, context: CallContext) -> Result<Value, Panic> {
		Ok(
			Value::cons(
				context.args[0].copy(),
				context.args[1].copy()
			)
		)
	}
}


/// car
#[derive(Trace, Finalize)]
pub struct Car;

impl NativeFun for Car {
	fn name(&self) -> &'static str { "car" }

	fn arity(&self) -> Arity { Arity::exactly(1) }

	fn call(&mut self, context: CallContext) -> Result<Value, Panic> {
		match &context.args[0] {
			Value::Pair(pair) => Ok(pair.car.copy()),
			value => Err(Panic::invalid_operand(self.name(), value.copy())),
		}
	}
}


/// cdr
#[derive(Trace, Finalize)]
pub struct Cdr;

impl NativeFun for Cdr {
	fn name(&self) -> &'static str { "cdr" }

	fn arity(&self) -> Arity { Arity::exactly(1) }

	fn call(&mut self, context: CallContext) -> Result<Value, Panic> {
		match &context.args[0] {
			Value::Pair(pair) => Ok(pair.cdr.copy()),
			value => Err(Panic::invalid_operand(self.name(), value.copy())),
		}
	}
}


/// list
#[derive(Trace, Finalize)]
pub struct List;

impl NativeFun for List {
	fn name(&self) -> &'static str { "list" }

	fn arity(&self) -> Arity { Arity::at_least(0) }

	fn call(&mut self, context: CallContext) -> Result<Value, Panic> {
		let items: Vec<Value> = context.args
			.iter()
			.map(Value::copy)
			.collect();

		Ok(Value::list(items))
	}
}


/// pair?
#[derive(Trace, Finalize)]
pub struct IsPair;

impl NativeFun for IsPair {
	fn name(&self) -> &'static str { "pair?" }

	fn arity(&self) -> Arity { Arity::exactly(1) }

	fn call(&mut self, context: CallContext) -> Result<Value, Panic> {
		Ok(
			matches!(context.args[0], Value::Pair(_)).into()
		)
	}
}


/// null?
#[derive(Trace, Finalize)]
pub struct IsNull;

impl NativeFun for IsNull {
	fn name(&self) -> &'static str { "null?" }

	fn arity(&self) -> Arity { Arity::exactly(1) }

	fn call(&mut self, context: CallContext) -> Result<Value, Panic> {
		Ok(
			matches!(context.args[0], Value::Nil).into()
		)
	}
}


/// list?
#[derive(Trace, Finalize)]
pub struct IsList;

impl NativeFun for IsList {
	fn name(&self) -> &'static str { "list?" }

	fn arity(&self) -> Arity { Arity::exactly(1) }

	fn call(&mut self, context: CallContext) -> Result<Value, Panic> {
		let mut tail = context.args[0].copy();

		loop {
			match tail {
				Value::Nil => return Ok(true.into()),
				Value::Pair(ref pair) => tail = pair.cdr.copy(),
				_ => return Ok(false.into()),
			}
		}
	}
}


/// eq?
#[derive(Trace, Finalize)]
pub struct IsEq;

impl NativeFun for IsEq {
	fn name(&self) -> &'static str { "eq?" }

	fn arity(&self) -> Arity { Arity::exactly(2) }

	fn call(&mut self, context: CallContext) -> Result<Value, Panic> {
		Ok(
			(context.args[0] == context.args[1]).into()
		)
	}
}
