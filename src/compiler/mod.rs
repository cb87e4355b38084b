mod analysis;
pub mod code;
mod error;

use std::collections::HashSet;

use gc::Gc;

use crate::{
	runtime::global::Globals,
	runtime::value::Value,
	symbol::{Interner, Symbol},
};
use analysis::{binary_form, find_free, find_sets, parse_parameters, ternary_form, unary_form};
use code::Inst;
pub use error::Error;


/// The special form names, interned once per compiler.
#[derive(Debug)]
pub struct Keywords {
	pub quote: Symbol,
	pub lambda: Symbol,
	pub if_: Symbol,
	pub set: Symbol,
	pub begin: Symbol,
	pub define: Symbol,
	pub call_cc: Symbol,
}


impl Keywords {
	pub fn new(interner: &mut Interner) -> Self {
		Self {
			quote: interner.get_or_intern("quote"),
			lambda: interner.get_or_intern("lambda"),
			if_: interner.get_or_intern("if"),
			set: interner.get_or_intern("set!"),
			begin: interner.get_or_intern("begin"),
			define: interner.get_or_intern("define"),
			call_cc: interner.get_or_intern("call/cc"),
		}
	}
}


/// The compile time environment of one lexical scope.
#[derive(Debug, Default)]
struct Scope {
	/// Bound variables, ordered by frame slot: the last parameter is pushed last and
	/// therefore occupies slot 0.
	locals: Vec<Symbol>,
	/// Captured variables, ordered by capture slot.
	free: Vec<Symbol>,
}


impl Scope {
	/// Whether the symbol is bound in this scope, as opposed to globally or not at all.
	fn binds(&self, symbol: Symbol) -> bool {
		self.locals.contains(&symbol) || self.free.contains(&symbol)
	}
}


/// The address a symbol resolves to.
#[derive(Debug, Clone, Copy)]
enum Resolved {
	Local(usize),
	Free(usize),
	Global,
}


/// The code generator.
/// Recursively turns a datum into an instruction chain, resolving identifiers to
/// local, free or global addresses, deciding tail position, and inserting boxing for
/// assigned variables.
#[derive(Debug)]
pub struct Compiler {
	keywords: Keywords,
}


impl Compiler {
	pub fn new(interner: &mut Interner) -> Self {
		Self {
			keywords: Keywords::new(interner),
		}
	}


	/// Compile one top level datum into an instruction chain ending in `halt`.
	/// This is the only place a define form is legal.
	pub fn compile(&self, datum: &Value, globals: &mut Globals) -> Result<Gc<Inst>, Error> {
		let halt = Gc::new(Inst::Halt);

		if let Value::Pair(pair) = datum {
			if pair.car.as_symbol() == Some(self.keywords.define) {
				let (target, value) = binary_form(&pair.cdr, "define")?;
				let symbol = target
					.as_symbol()
					.ok_or(Error::malformed_form("define"))?;

				// Pre-register the variable, so the value expression can refer to it.
				globals.declare(symbol);

				let assign = Gc::new(Inst::AssignGlobal { symbol, next: halt });
				return self.compile_expr(&value, &Scope::default(), &HashSet::new(), globals, assign);
			}
		}

		self.compile_expr(datum, &Scope::default(), &HashSet::new(), globals, halt)
	}


	fn compile_expr(
		&self,
		exp: &Value,
		scope: &Scope,
		boxed: &HashSet<Symbol>,
		globals: &Globals,
		next: Gc<Inst>,
	) -> Result<Gc<Inst>, Error> {
		let pair = match exp {
			Value::Symbol(symbol) => {
				// Boxed variables are dereferenced right after the fetch.
				let next =
					if boxed.contains(symbol) {
						Gc::new(Inst::Indirect { next })
					} else {
						next
					};

				return self.compile_refer(*symbol, scope, globals, next);
			}

			Value::Pair(pair) => pair,

			// Integers, booleans and nil are self evaluating.
			value => return Ok(Gc::new(Inst::Constant { value: value.copy(), next })),
		};

		match pair.car.as_symbol() {
			Some(symbol) if symbol == self.keywords.quote => {
				let datum = unary_form(&pair.cdr, "quote")?;
				Ok(Gc::new(Inst::Constant { value: datum, next }))
			}

			Some(symbol) if symbol == self.keywords.lambda => {
				let (spec, body) = binary_form(&pair.cdr, "lambda")?;
				self.compile_lambda(&spec, &body, scope, boxed, globals, next)
			}

			Some(symbol) if symbol == self.keywords.if_ => {
				let (test, then, otherwise) = ternary_form(&pair.cdr, "if")?;

				let then = self.compile_expr(&then, scope, boxed, globals, next.clone())?;
				let otherwise = self.compile_expr(&otherwise, scope, boxed, globals, next)?;

				self.compile_expr(
					&test,
					scope,
					boxed,
					globals,
					Gc::new(Inst::Test { then, otherwise })
				)
			}

			Some(symbol) if symbol == self.keywords.set => {
				let (target, value) = binary_form(&pair.cdr, "set!")?;
				let target = target
					.as_symbol()
					.ok_or(Error::malformed_form("set!"))?;

				let assign = match self.lookup(target, scope, globals)? {
					Resolved::Local(slot) => Inst::AssignLocal { slot, next },
					Resolved::Free(slot) => Inst::AssignFree { slot, next },
					Resolved::Global => Inst::AssignGlobal { symbol: target, next },
				};

				self.compile_expr(&value, scope, boxed, globals, Gc::new(assign))
			}

			Some(symbol) if symbol == self.keywords.begin => {
				let forms = pair.cdr
					.proper_list()
					.ok_or(Error::malformed_form("begin"))?;

				if forms.is_empty() {
					return Err(Error::malformed_form("begin"));
				}

				// Thread right to left, so that only the last form's continuation is the
				// caller's.
				let mut code = next;

				for form in forms.iter().rev() {
					code = self.compile_expr(form, scope, boxed, globals, code)?;
				}

				Ok(code)
			}

			Some(symbol) if symbol == self.keywords.define => Err(Error::DefineNotAtTopLevel),

			Some(symbol) if symbol == self.keywords.call_cc => {
				let receiver = unary_form(&pair.cdr, "call/cc")?;
				self.compile_call_cc(&receiver, scope, boxed, globals, next)
			}

			_ => {
				let args = pair.cdr
					.proper_list()
					.ok_or(Error::malformed_form("application"))?;

				self.compile_application(&pair.car, &args, scope, boxed, globals, next)
			}
		}
	}


	/// Emit the fetch instruction for a resolved identifier, without unboxing.
	/// Also used when capturing free variables, where the box itself must be pushed.
	fn compile_refer(
		&self,
		symbol: Symbol,
		scope: &Scope,
		globals: &Globals,
		next: Gc<Inst>,
	) -> Result<Gc<Inst>, Error> {
		let refer = match self.lookup(symbol, scope, globals)? {
			Resolved::Local(slot) => Inst::ReferLocal { slot, next },
			Resolved::Free(slot) => Inst::ReferFree { slot, next },
			Resolved::Global => Inst::ReferGlobal { symbol, next },
		};

		Ok(Gc::new(refer))
	}


	/// Resolve an identifier: locals first, then captures, then the global table.
	fn lookup(&self, symbol: Symbol, scope: &Scope, globals: &Globals) -> Result<Resolved, Error> {
		if let Some(slot) = scope.locals.iter().position(|&local| local == symbol) {
			Ok(Resolved::Local(slot))
		} else if let Some(slot) = scope.free.iter().position(|&free| free == symbol) {
			Ok(Resolved::Free(slot))
		} else if globals.is_defined(symbol) {
			Ok(Resolved::Global)
		} else {
			Err(Error::unbound_variable(symbol))
		}
	}


	fn compile_lambda(
		&self,
		spec: &Value,
		body: &Value,
		scope: &Scope,
		boxed: &HashSet<Symbol>,
		globals: &Globals,
		next: Gc<Inst>,
	) -> Result<Gc<Inst>, Error> {
		let (params, variadic) = parse_parameters(spec)?;
		let bound: HashSet<Symbol> = params.iter().copied().collect();

		// Free variables that are bound in the enclosing scope are captured; the rest
		// must resolve globally, which compiling the body will check.
		let free: Vec<Symbol> = find_free(body, &bound, &self.keywords)?
			.into_iter()
			.filter(|&symbol| scope.binds(symbol))
			.collect();

		let assigned = find_sets(body, &bound, &self.keywords)?;

		// The body sees its own assigned parameters as boxed, plus captured variables
		// that were already boxed in the enclosing scope.
		let mut body_boxed = assigned.clone();
		body_boxed.extend(
			free.iter()
				.copied()
				.filter(|symbol| boxed.contains(symbol))
		);

		let body_scope = Scope {
			// The last parameter is pushed last, and therefore occupies slot 0.
			locals: params.iter().rev().copied().collect(),
			free: free.clone(),
		};

		let ret = Gc::new(Inst::Return { count: params.len() });
		let body_code = self.compile_expr(body, &body_scope, &body_boxed, globals, ret)?;
		let body_code = make_boxes(&assigned, &body_scope.locals, body_code);

		let close = Gc::new(Inst::Close {
			params: params.len(),
			variadic,
			free_count: free.len(),
			body: body_code,
			next,
		});

		// Push each captured variable's current value or box. The first free variable
		// is pushed last, ending up in capture slot 0.
		let mut code = close;

		for &symbol in &free {
			code = self.compile_refer(
				symbol,
				scope,
				globals,
				Gc::new(Inst::Argument { next: code })
			)?;
		}

		Ok(code)
	}


	fn compile_call_cc(
		&self,
		receiver: &Value,
		scope: &Scope,
		boxed: &HashSet<Symbol>,
		globals: &Globals,
		next: Gc<Inst>,
	) -> Result<Gc<Inst>, Error> {
		let tail = matches!(&*next, Inst::Return { .. });

		let apply = Gc::new(Inst::Apply { count: 1 });

		// In tail position the caller's frame is collapsed under the continuation
		// argument, and reentering the continuation must pop the frame's locals that
		// the snapshot still carries.
		let (call, pop) =
			if let Inst::Return { count } = &*next {
				(Gc::new(Inst::Shift { count: 1, depth: *count, next: apply }), *count)
			} else {
				(apply, 0)
			};

		// The receiver is applied to the freshly captured continuation.
		let receiver_code = self.compile_expr(receiver, scope, boxed, globals, call)?;
		let code = Gc::new(Inst::Conti {
			pop,
			next: Gc::new(Inst::Argument { next: receiver_code }),
		});

		Ok(
			if tail {
				code
			} else {
				Gc::new(Inst::Frame { ret: next, next: code })
			}
		)
	}


	fn compile_application(
		&self,
		operator: &Value,
		args: &[Value],
		scope: &Scope,
		boxed: &HashSet<Symbol>,
		globals: &Globals,
		next: Gc<Inst>,
	) -> Result<Gc<Inst>, Error> {
		let tail = matches!(&*next, Inst::Return { .. });

		let apply = Gc::new(Inst::Apply { count: args.len() });

		// A tail call collapses the caller's frame instead of pushing a new one.
		let call =
			if let Inst::Return { count } = &*next {
				Gc::new(Inst::Shift { count: args.len(), depth: *count, next: apply })
			} else {
				apply
			};

		let mut code = self.compile_expr(operator, scope, boxed, globals, call)?;

		// Operands evaluate left to right: the first argument's code is outermost, and
		// its value is pushed first, landing deepest in the new frame.
		for arg in args.iter().rev() {
			code = self.compile_expr(
				arg,
				scope,
				boxed,
				globals,
				Gc::new(Inst::Argument { next: code })
			)?;
		}

		Ok(
			if tail {
				code
			} else {
				Gc::new(Inst::Frame { ret: next, next: code })
			}
		)
	}
}


/// Wrap the body with box instructions for every assigned parameter.
fn make_boxes(assigned: &HashSet<Symbol>, locals: &[Symbol], body: Gc<Inst>) -> Gc<Inst> {
	let mut code = body;

	for (slot, symbol) in locals.iter().enumerate().rev() {
		if assigned.contains(symbol) {
			code = Gc::new(Inst::Box { slot, next: code });
		}
	}

	code
}
