pub mod global;
pub mod mem;
pub mod value;
mod lib;
mod panic;
#[cfg(test)]
mod tests;

use gc::Gc;

use crate::{
	compiler::{self, code::Inst, Compiler},
	fmt::Display,
	symbol::Interner,
};
use global::Globals;
use mem::{Slot, Stack};
use value::{CallContext, Closure, Value};
pub use panic::Panic;


/// An evaluation error: compilation failed, or execution panicked.
#[derive(Debug)]
pub enum Error {
	Compile(compiler::Error),
	Panic(Panic),
}


impl From<compiler::Error> for Error {
	fn from(error: compiler::Error) -> Self {
		Self::Compile(error)
	}
}


impl From<Panic> for Error {
	fn from(panic: Panic) -> Self {
		Self::Panic(panic)
	}
}


impl<'a> Display<'a> for Error {
	type Context = &'a Interner;

	fn fmt(&self, f: &mut std::fmt::Formatter<'_>, context: Self::Context) -> std::fmt::Result {
		match self {
			Self::Compile(error) => error.fmt(f, context),
			Self::Panic(panic) => panic.fmt(f, context),
		}
	}
}


/// An interpreter instance: the virtual machine stack and registers, the global
/// table, the compiler and the symbol interner. Instances are fully isolated from
/// each other.
pub struct Runtime {
	stack: Stack,
	globals: Globals,
	compiler: Compiler,
	interner: Interner,
}


impl Runtime {
	pub fn new() -> Self {
		let mut interner = Interner::new();
		let compiler = Compiler::new(&mut interner);

		let mut globals = Globals::new();
		lib::register(&mut globals, &mut interner);

		Self {
			stack: Stack::default(),
			globals,
			compiler,
			interner,
		}
	}


	pub fn interner(&self) -> &Interner {
		&self.interner
	}


	pub fn interner_mut(&mut self) -> &mut Interner {
		&mut self.interner
	}


	/// Compile one top level datum.
	pub fn compile(&mut self, datum: &Value) -> Result<Gc<Inst>, compiler::Error> {
		self.compiler.compile(datum, &mut self.globals)
	}


	/// Evaluate one top level datum: compile, then execute.
	pub fn evaluate(&mut self, datum: &Value) -> Result<Value, Error> {
		let code = self.compile(datum)?;
		let value = self.exec(code)?;
		Ok(value)
	}


	/// Run an instruction chain to completion, yielding the accumulator.
	pub fn exec(&mut self, code: Gc<Inst>) -> Result<Value, Panic> {
		// The five registers: accumulator, instruction pointer, frame pointer, current
		// closure and stack pointer.
		let mut acc = Value::Nil;
		let mut inst = code;
		let mut frame = 0;
		let mut closure = Value::Nil;
		let mut sp = 0;

		loop {
			let current = inst.clone();

			match &*current {
				Inst::Halt => return Ok(acc),

				Inst::ReferLocal { slot, next } => {
					acc = self.fetch(frame, *slot)?;
					inst = next.clone();
				}

				Inst::ReferFree { slot, next } => {
					acc = free_slot(&closure, *slot)?;
					inst = next.clone();
				}

				Inst::ReferGlobal { symbol, next } => {
					acc = self.globals.get(*symbol)?;
					inst = next.clone();
				}

				Inst::Indirect { next } => {
					acc = unbox(&acc)?;
					inst = next.clone();
				}

				Inst::Constant { value, next } => {
					acc = value.copy();
					inst = next.clone();
				}

				Inst::Close { params, variadic, free_count, body, next } => {
					let mut free = Vec::with_capacity(*free_count);

					for offset in 0 .. *free_count {
						free.push(self.fetch(sp, offset)?);
					}

					acc = Closure {
						body: body.clone(),
						params: *params,
						variadic: *variadic,
						free: free.into(),
					}.into();

					sp -= *free_count;
					inst = next.clone();
				}

				Inst::Box { slot, next } => {
					let value = self.fetch(frame, *slot)?;
					self.stack.index_set(frame, *slot, Slot::Value(Value::boxed(value)));
					inst = next.clone();
				}

				Inst::Test { then, otherwise } => {
					inst =
						if acc.is_false() {
							otherwise.clone()
						} else {
							then.clone()
						};
				}

				Inst::AssignLocal { slot, next } => {
					let target = self.fetch(frame, *slot)?;
					assign(&target, acc.copy())?;
					inst = next.clone();
				}

				Inst::AssignFree { slot, next } => {
					let target = free_slot(&closure, *slot)?;
					assign(&target, acc.copy())?;
					inst = next.clone();
				}

				Inst::AssignGlobal { symbol, next } => {
					self.globals.put(*symbol, acc.copy());
					inst = next.clone();
				}

				Inst::Conti { pop, next } => {
					acc = self.continuation(sp, *pop);
					inst = next.clone();
				}

				Inst::Nuate { stack, next } => {
					let saved: &[Slot] = stack;
					sp = self.stack.restore(saved);
					inst = next.clone();
				}

				Inst::Frame { ret, next } => {
					sp = self.push(Slot::Value(closure.copy()), sp)?;
					sp = self.push(Slot::Frame(frame), sp)?;
					sp = self.push(Slot::Code(ret.clone()), sp)?;
					inst = next.clone();
				}

				Inst::Argument { next } => {
					sp = self.push(Slot::Value(acc.copy()), sp)?;
					inst = next.clone();
				}

				Inst::Shift { count, depth, next } => {
					sp = self.stack.shift(*count, *depth, sp);
					inst = next.clone();
				}

				Inst::Apply { count } => {
					match acc.copy() {
						Value::Closure(ref applied) => {
							check_arity(applied.params, applied.variadic, *count)?;

							if applied.variadic {
								sp = self.collect_rest(applied.params, *count, sp)?;
							}

							inst = applied.body.clone();
							frame = sp;
							closure = Value::Closure(applied.clone());
						}

						Value::Primitive(ref fun) => {
							let arity = fun.arity();

							let matched =
								if arity.rest {
									*count >= arity.required
								} else {
									*count == arity.required
								};

							if !matched {
								return Err(Panic::primitive_arity(
									fun.name(),
									arity.required,
									arity.rest,
									*count
								));
							}

							// Arguments in application order: the first one is deepest.
							let mut args = Vec::with_capacity(*count);

							for offset in (0 .. *count).rev() {
								args.push(self.fetch(sp, offset)?);
							}

							acc = fun.call(CallContext {
								args: &args,
								interner: &self.interner,
							})?;

							// Pop the arguments and the control block beneath them,
							// resuming the caller without frame growth.
							let s = sp
								.checked_sub(*count)
								.filter(|s| *s >= 3)
								.ok_or(Panic::CorruptStack)?;
							inst = self.code_at(s, 0)?;
							frame = self.frame_at(s, 1)?;
							closure = self.fetch(s, 2)?;
							sp = s - 3;
						}

						value => return Err(Panic::invalid_application(value)),
					}
				}

				Inst::Return { count } => {
					let s = sp
						.checked_sub(*count)
						.filter(|s| *s >= 3)
						.ok_or(Panic::CorruptStack)?;
					inst = self.code_at(s, 0)?;
					frame = self.frame_at(s, 1)?;
					closure = self.fetch(s, 2)?;
					sp = s - 3;
				}
			}
		}
	}


	fn push(&mut self, slot: Slot, sp: usize) -> Result<usize, Panic> {
		self.stack
			.push(slot, sp)
			.map_err(|_| Panic::StackOverflow)
	}


	fn fetch(&self, pointer: usize, offset: usize) -> Result<Value, Panic> {
		self.stack
			.index(pointer, offset)
			.as_value()
			.map(Value::copy)
			.ok_or(Panic::CorruptStack)
	}


	fn code_at(&self, pointer: usize, offset: usize) -> Result<Gc<Inst>, Panic> {
		self.stack
			.index(pointer, offset)
			.as_code()
			.cloned()
			.ok_or(Panic::CorruptStack)
	}


	fn frame_at(&self, pointer: usize, offset: usize) -> Result<usize, Panic> {
		self.stack
			.index(pointer, offset)
			.as_frame()
			.ok_or(Panic::CorruptStack)
	}


	/// Reify the current stack as a callable continuation: a closure of one parameter
	/// whose body restores the snapshot, pops the locals the snapshot still carries
	/// above the saved control block, and returns that parameter.
	fn continuation(&self, sp: usize, pop: usize) -> Value {
		let body = Gc::new(Inst::ReferLocal {
			slot: 0,
			next: Gc::new(Inst::Nuate {
				stack: Gc::new(self.stack.save(sp)),
				next: Gc::new(Inst::Return { count: pop }),
			}),
		});

		Closure {
			body,
			params: 1,
			variadic: false,
			free: Box::new([]),
		}.into()
	}


	/// Collect the excess arguments of a variadic application into a list, leaving
	/// exactly `params` values on the frame. The rest parameter is the last one, and
	/// therefore ends up on top.
	fn collect_rest(&mut self, params: usize, got: usize, sp: usize) -> Result<usize, Panic> {
		let required = params - 1;
		let excess = got - required;

		if excess == 0 {
			return self.push(Slot::Value(Value::Nil), sp);
		}

		let mut list = Value::Nil;

		for offset in 0 .. excess {
			list = Value::cons(self.fetch(sp, offset)?, list);
		}

		self.stack.index_set(sp, excess - 1, Slot::Value(list));

		Ok(sp - excess + 1)
	}
}


fn check_arity(params: usize, variadic: bool, got: usize) -> Result<(), Panic> {
	if variadic {
		if got < params - 1 {
			return Err(Panic::closure_arity(params - 1, true, got));
		}
	} else if got != params {
		return Err(Panic::closure_arity(params, false, got));
	}

	Ok(())
}


fn free_slot(closure: &Value, slot: usize) -> Result<Value, Panic> {
	match closure {
		Value::Closure(closure) => closure.free
			.get(slot)
			.map(Value::copy)
			.ok_or(Panic::CorruptStack),

		_ => Err(Panic::CorruptStack),
	}
}


fn unbox(value: &Value) -> Result<Value, Panic> {
	match value {
		Value::Boxed(cell) => Ok(cell.borrow().copy()),
		_ => Err(Panic::CorruptStack),
	}
}


fn assign(target: &Value, value: Value) -> Result<(), Panic> {
	match target {
		Value::Boxed(cell) => {
			*cell.borrow_mut() = value;
			Ok(())
		}

		_ => Err(Panic::CorruptStack),
	}
}
