use std::{
	fmt::{self, Debug},
	ops::Deref,
};

use gc::{Finalize, Gc, GcCell, Trace};

use crate::{
	compiler::code::Inst,
	symbol::Interner,
};
use super::super::panic::Panic;
use super::Value;


/// A compiled procedure together with its captured free variables.
#[derive(Debug)]
#[derive(Trace, Finalize)]
pub struct Closure {
	/// Entry point of the compiled body.
	pub body: Gc<Inst>,
	/// How many parameters the procedure binds, the rest parameter included.
	pub params: usize,
	/// Whether the last parameter collects the remaining arguments as a list.
	pub variadic: bool,
	/// Captured free variables. Slots of assigned variables hold boxes.
	pub free: Box<[Value]>,
}


/// The number of arguments a primitive procedure accepts.
#[derive(Debug, Clone, Copy)]
pub struct Arity {
	/// How many arguments are required.
	pub required: usize,
	/// Whether further arguments are accepted.
	pub rest: bool,
}


impl Arity {
	pub fn exactly(required: usize) -> Self {
		Self { required, rest: false }
	}


	pub fn at_least(required: usize) -> Self {
		Self { required, rest: true }
	}
}


/// Context for a native procedure call.
#[derive(Debug)]
pub struct CallContext<'a> {
	/// The arguments, in application order.
	pub args: &'a [Value],
	/// The symbol interner, required to render values in error messages.
	pub interner: &'a Interner,
}


/// A native procedure implementation.
pub trait NativeFun: Trace + Finalize + 'static {
	/// The name under which the procedure is registered in the global table.
	/// This is also used for equality, and therefore must be globally unique.
	fn name(&self) -> &'static str;
	/// The declared argument count, checked by the virtual machine before invocation.
	fn arity(&self) -> Arity;
	/// Invoke the procedure.
	fn call(&mut self, context: CallContext) -> Result<Value, Panic>;
}


/// A garbage collected native procedure.
#[derive(Trace, Finalize)]
pub struct RustFun(Gc<GcCell<Box<dyn NativeFun>>>);


impl RustFun {
	/// Shallow copy.
	pub fn copy(&self) -> Self {
		Self(self.0.clone())
	}


	/// The procedure's global name.
	pub fn name(&self) -> &'static str {
		self.0.deref().borrow().name()
	}


	/// The procedure's declared argument count.
	pub fn arity(&self) -> Arity {
		self.0.deref().borrow().arity()
	}


	/// Invoke the procedure.
	pub fn call(&self, context: CallContext) -> Result<Value, Panic> {
		self.0.deref().borrow_mut().call(context)
	}
}


impl Debug for RustFun {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", self.name())
	}
}


impl<T: NativeFun> From<T> for RustFun {
	fn from(fun: T) -> Self {
		Self(Gc::new(GcCell::new(Box::new(fun))))
	}
}


impl PartialEq for RustFun {
	fn eq(&self, other: &Self) -> bool {
		self.0.deref().borrow().name() == other.0.deref().borrow().name()
	}
}


impl Eq for RustFun { }
