use std::collections::HashSet;

use crate::{
	runtime::value::Value,
	symbol::Symbol,
};
use super::{Error, Keywords};


/// Parse a lambda parameter spec into the parameter list and the variadic flag.
/// A trailing dotted symbol or a bare symbol makes the procedure variadic, with the
/// last parameter collecting the excess arguments as a list.
pub fn parse_parameters(spec: &Value) -> Result<(Vec<Symbol>, bool), Error> {
	let mut params = Vec::new();
	let mut tail = spec.copy();

	loop {
		match tail {
			Value::Nil => return Ok((params, false)),

			Value::Symbol(symbol) => {
				params.push(symbol);
				return Ok((params, true));
			}

			Value::Pair(ref pair) => {
				match pair.car.as_symbol() {
					Some(symbol) => params.push(symbol),
					None => return Err(Error::malformed_form("lambda")),
				}

				tail = pair.cdr.copy();
			}

			_ => return Err(Error::malformed_form("lambda")),
		}
	}
}


/// Free variable analysis: the symbols referenced by the expression but not contained
/// in `bound`, in first-reference order. The order is significant, as it numbers the
/// capture slots of the enclosing closure.
pub fn find_free(
	exp: &Value,
	bound: &HashSet<Symbol>,
	keywords: &Keywords,
) -> Result<Vec<Symbol>, Error> {
	let mut free = Vec::new();
	let mut seen = HashSet::new();

	collect_free(exp, bound, keywords, &mut free, &mut seen)?;

	Ok(free)
}


fn collect_free(
	exp: &Value,
	bound: &HashSet<Symbol>,
	keywords: &Keywords,
	free: &mut Vec<Symbol>,
	seen: &mut HashSet<Symbol>,
) -> Result<(), Error> {
	let pair = match exp {
		Value::Symbol(symbol) => {
			if !bound.contains(symbol) && seen.insert(*symbol) {
				free.push(*symbol);
			}

			return Ok(());
		}

		Value::Pair(pair) => pair,

		_ => return Ok(()),
	};

	match pair.car.as_symbol() {
		Some(symbol) if symbol == keywords.quote => Ok(()),

		Some(symbol) if symbol == keywords.lambda => {
			let (spec, body) = binary_form(&pair.cdr, "lambda")?;
			let (params, _) = parse_parameters(&spec)?;

			let mut bound = bound.clone();
			bound.extend(params);

			collect_free(&body, &bound, keywords, free, seen)
		}

		Some(symbol) if symbol == keywords.if_ => {
			let (test, then, otherwise) = ternary_form(&pair.cdr, "if")?;

			collect_free(&test, bound, keywords, free, seen)?;
			collect_free(&then, bound, keywords, free, seen)?;
			collect_free(&otherwise, bound, keywords, free, seen)
		}

		Some(symbol) if symbol == keywords.set => {
			let (target, value) = binary_form(&pair.cdr, "set!")?;
			let target = target
				.as_symbol()
				.ok_or(Error::malformed_form("set!"))?;

			// The assignment target counts as a reference.
			if !bound.contains(&target) && seen.insert(target) {
				free.push(target);
			}

			collect_free(&value, bound, keywords, free, seen)
		}

		Some(symbol) if symbol == keywords.call_cc => {
			let receiver = unary_form(&pair.cdr, "call/cc")?;
			collect_free(&receiver, bound, keywords, free, seen)
		}

		Some(symbol) if symbol == keywords.begin => {
			let forms = pair.cdr
				.proper_list()
				.ok_or(Error::malformed_form("begin"))?;

			for form in &forms {
				collect_free(form, bound, keywords, free, seen)?;
			}

			Ok(())
		}

		Some(symbol) if symbol == keywords.define => Err(Error::DefineNotAtTopLevel),

		// Application: the operator position is an expression like any other.
		_ => {
			let mut exp = exp.copy();

			loop {
				match exp {
					Value::Nil => return Ok(()),

					Value::Pair(ref pair) => {
						collect_free(&pair.car, bound, keywords, free, seen)?;
						exp = pair.cdr.copy();
					}

					ref tail => return collect_free(tail, bound, keywords, free, seen),
				}
			}
		}
	}
}


/// Assignment analysis: the subset of `tracked` that appears as a `set!` target in the
/// expression, excluding names re-bound by a nested lambda.
pub fn find_sets(
	exp: &Value,
	tracked: &HashSet<Symbol>,
	keywords: &Keywords,
) -> Result<HashSet<Symbol>, Error> {
	let mut sets = HashSet::new();

	collect_sets(exp, tracked, keywords, &mut sets)?;

	Ok(sets)
}


fn collect_sets(
	exp: &Value,
	tracked: &HashSet<Symbol>,
	keywords: &Keywords,
	sets: &mut HashSet<Symbol>,
) -> Result<(), Error> {
	let pair = match exp {
		Value::Pair(pair) => pair,
		_ => return Ok(()),
	};

	match pair.car.as_symbol() {
		Some(symbol) if symbol == keywords.quote => Ok(()),

		Some(symbol) if symbol == keywords.lambda => {
			let (spec, body) = binary_form(&pair.cdr, "lambda")?;
			let (params, _) = parse_parameters(&spec)?;

			let tracked: HashSet<Symbol> = tracked
				.iter()
				.copied()
				.filter(|symbol| !params.contains(symbol))
				.collect();

			collect_sets(&body, &tracked, keywords, sets)
		}

		Some(symbol) if symbol == keywords.if_ => {
			let (test, then, otherwise) = ternary_form(&pair.cdr, "if")?;

			collect_sets(&test, tracked, keywords, sets)?;
			collect_sets(&then, tracked, keywords, sets)?;
			collect_sets(&otherwise, tracked, keywords, sets)
		}

		Some(symbol) if symbol == keywords.set => {
			let (target, value) = binary_form(&pair.cdr, "set!")?;
			let target = target
				.as_symbol()
				.ok_or(Error::malformed_form("set!"))?;

			if tracked.contains(&target) {
				sets.insert(target);
			}

			collect_sets(&value, tracked, keywords, sets)
		}

		Some(symbol) if symbol == keywords.call_cc => {
			let receiver = unary_form(&pair.cdr, "call/cc")?;
			collect_sets(&receiver, tracked, keywords, sets)
		}

		Some(symbol) if symbol == keywords.begin => {
			let forms = pair.cdr
				.proper_list()
				.ok_or(Error::malformed_form("begin"))?;

			for form in &forms {
				collect_sets(form, tracked, keywords, sets)?;
			}

			Ok(())
		}

		Some(symbol) if symbol == keywords.define => Err(Error::DefineNotAtTopLevel),

		_ => {
			let mut exp = exp.copy();

			loop {
				match exp {
					Value::Nil => return Ok(()),

					Value::Pair(ref pair) => {
						collect_sets(&pair.car, tracked, keywords, sets)?;
						exp = pair.cdr.copy();
					}

					ref tail => return collect_sets(tail, tracked, keywords, sets),
				}
			}
		}
	}
}


/// Split a form's argument list into exactly one part.
pub fn unary_form(args: &Value, form: &'static str) -> Result<Value, Error> {
	let items = args
		.proper_list()
		.ok_or(Error::malformed_form(form))?;

	match items.as_slice() {
		[first] => Ok(first.copy()),
		_ => Err(Error::malformed_form(form)),
	}
}


/// Split a form's argument list into exactly two parts.
pub fn binary_form(args: &Value, form: &'static str) -> Result<(Value, Value), Error> {
	let items = args
		.proper_list()
		.ok_or(Error::malformed_form(form))?;

	match items.as_slice() {
		[first, second] => Ok((first.copy(), second.copy())),
		_ => Err(Error::malformed_form(form)),
	}
}


/// Split a form's argument list into exactly three parts.
pub fn ternary_form(args: &Value, form: &'static str) -> Result<(Value, Value, Value), Error> {
	let items = args
		.proper_list()
		.ok_or(Error::malformed_form(form))?;

	match items.as_slice() {
		[first, second, third] => Ok((first.copy(), second.copy(), third.copy())),
		_ => Err(Error::malformed_form(form)),
	}
}
