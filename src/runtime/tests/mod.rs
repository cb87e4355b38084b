use std::path::Path;

use assert_matches::assert_matches;
use serial_test::serial;

use crate::{
	compiler,
	fmt::FmtString,
	syntax::{Reader, Source},
};
use super::{
	mem::{Slot, Stack},
	value::Value,
	Error,
	Panic,
	Runtime,
};


/// Evaluate every expression in the source, yielding the last value.
fn eval(runtime: &mut Runtime, input: &str) -> Result<Value, Error> {
	let source = Source::from_str(Path::new("<test>"), input);

	let data = {
		let mut reader = Reader::new(&source, runtime.interner_mut());
		let mut data = Vec::new();

		loop {
			match reader.read().expect("read error") {
				Some(datum) => data.push(datum),
				None => break data,
			}
		}
	};

	let mut value = Value::Nil;

	for datum in &data {
		value = runtime.evaluate(datum)?;
	}

	Ok(value)
}


fn eval_shown(runtime: &mut Runtime, input: &str) -> String {
	let value = eval(runtime, input).expect("evaluation error");
	value.fmt_string(runtime.interner())
}


// As our garbage collector is not thread safe, we must *not* run the following tests
// in parallel.


#[test]
#[serial]
fn test_basics() {
	let mut runtime = Runtime::new();

	assert_matches!(eval(&mut runtime, "42"), Ok(Value::Int(42)));
	assert_matches!(eval(&mut runtime, "#t"), Ok(Value::Bool(true)));
	assert_matches!(eval(&mut runtime, "((lambda (x) x) 1)"), Ok(Value::Int(1)));
	assert_matches!(eval(&mut runtime, "(if #f 1 2)"), Ok(Value::Int(2)));
	assert_matches!(eval(&mut runtime, "(if 0 1 2)"), Ok(Value::Int(1)));
	assert_eq!(eval_shown(&mut runtime, "'(1 2)"), "(1 2)");
	assert_eq!(eval_shown(&mut runtime, "(lambda (x) x)"), "#<closure>");
	assert_eq!(eval_shown(&mut runtime, "car"), "#<subr>");
}


#[test]
#[serial]
fn test_lexical_scope() {
	let mut runtime = Runtime::new();

	assert_matches!(
		eval(&mut runtime, "((lambda (a b) ((lambda (x y) x) b 3)) 4 5)"),
		Ok(Value::Int(5))
	);

	// The captured variable wins over the later binding of the same name.
	assert_matches!(
		eval(
			&mut runtime,
			"(((lambda (x) (lambda (y) x)) 1) 2)"
		),
		Ok(Value::Int(1))
	);
}


#[test]
#[serial]
fn test_arithmetic() {
	let mut runtime = Runtime::new();

	assert_matches!(eval(&mut runtime, "(+ 2 3 (* 4 5))"), Ok(Value::Int(25)));
	assert_matches!(eval(&mut runtime, "(- 10 3 2)"), Ok(Value::Int(5)));
	assert_matches!(eval(&mut runtime, "(/ 10 3)"), Ok(Value::Int(3)));
	assert_matches!(eval(&mut runtime, "(= 2 2)"), Ok(Value::Bool(true)));
	assert_matches!(eval(&mut runtime, "(< 2 1)"), Ok(Value::Bool(false)));
	assert_matches!(eval(&mut runtime, "(> 2 1)"), Ok(Value::Bool(true)));

	assert_matches!(
		eval(&mut runtime, "(/ 1 0)"),
		Err(Error::Panic(Panic::DivisionByZero))
	);

	assert_matches!(
		eval(&mut runtime, "(+ 1 #t)"),
		Err(Error::Panic(Panic::InvalidOperand { name: "+", .. }))
	);
}


#[test]
#[serial]
fn test_mutation() {
	let mut runtime = Runtime::new();

	assert_matches!(
		eval(&mut runtime, "((lambda (x) ((lambda (a b) (set! x 10)) 1 x)) 100)"),
		Ok(Value::Int(10))
	);
}


#[test]
#[serial]
fn test_capture_shares_mutation() {
	let mut runtime = Runtime::new();

	// Both closures alias the same box: mutation through one is visible through the
	// other.
	let program = "
		(define bump #f)
		(define peek #f)
		((lambda (n)
		   (begin
		     (set! bump (lambda () (set! n (+ n 1))))
		     (set! peek (lambda () n))))
		 0)
		(bump)
		(bump)
		(peek)
	";

	assert_matches!(eval(&mut runtime, program), Ok(Value::Int(2)));
}


#[test]
#[serial]
fn test_variadic() {
	let mut runtime = Runtime::new();

	assert_eq!(eval_shown(&mut runtime, "((lambda (a . rest) rest) 1 2 3)"), "(2 3)");
	assert_eq!(eval_shown(&mut runtime, "((lambda (a . rest) rest) 1)"), "()");
	assert_eq!(eval_shown(&mut runtime, "((lambda (a . rest) a) 1 2 3)"), "1");
	assert_eq!(eval_shown(&mut runtime, "((lambda args args) 1 2)"), "(1 2)");
	assert_eq!(eval_shown(&mut runtime, "((lambda args args))"), "()");
}


#[test]
#[serial]
fn test_closure_arity() {
	let mut runtime = Runtime::new();

	let panic = assert_matches!(
		eval(&mut runtime, "((lambda (x y) 1) 2)"),
		Err(Error::Panic(panic)) => panic
	);
	assert_eq!(
		panic.fmt_string(runtime.interner()),
		"closure: required 2 arguments, got 1"
	);

	let panic = assert_matches!(
		eval(&mut runtime, "((lambda (x . rest) 1))"),
		Err(Error::Panic(panic)) => panic
	);
	assert_eq!(
		panic.fmt_string(runtime.interner()),
		"closure: required at least 1 arguments, got 0"
	);
}


#[test]
#[serial]
fn test_primitive_arity() {
	let mut runtime = Runtime::new();

	let panic = assert_matches!(
		eval(&mut runtime, "(cons 1)"),
		Err(Error::Panic(panic)) => panic
	);
	assert_eq!(
		panic.fmt_string(runtime.interner()),
		"primitive procedure cons: required 2 arguments, got 1"
	);

	let panic = assert_matches!(
		eval(&mut runtime, "(+)"),
		Err(Error::Panic(panic)) => panic
	);
	assert_eq!(
		panic.fmt_string(runtime.interner()),
		"primitive procedure +: required at least 1 arguments, got 0"
	);
}


#[test]
#[serial]
fn test_define_and_assign() {
	let mut runtime = Runtime::new();

	assert_matches!(
		eval(&mut runtime, "(define v 1) (set! v (+ v 1)) v"),
		Ok(Value::Int(2))
	);
}


#[test]
#[serial]
fn test_definitions_persist_after_panic() {
	let mut runtime = Runtime::new();

	assert_matches!(eval(&mut runtime, "(define v 5)"), Ok(_));
	assert_matches!(eval(&mut runtime, "(car '())"), Err(Error::Panic(_)));
	assert_matches!(eval(&mut runtime, "v"), Ok(Value::Int(5)));
}


#[test]
#[serial]
fn test_pairs() {
	let mut runtime = Runtime::new();

	assert_matches!(eval(&mut runtime, "(car '(1 2))"), Ok(Value::Int(1)));
	assert_eq!(eval_shown(&mut runtime, "(cdr '(1 2))"), "(2)");
	assert_eq!(eval_shown(&mut runtime, "(cons 1 2)"), "(1 . 2)");
	assert_eq!(eval_shown(&mut runtime, "(cons 3 (cons 1 2))"), "(3 1 . 2)");
	assert_eq!(eval_shown(&mut runtime, "(list 1 2 3)"), "(1 2 3)");
	assert_eq!(eval_shown(&mut runtime, "(list)"), "()");

	assert_matches!(eval(&mut runtime, "(pair? '(1))"), Ok(Value::Bool(true)));
	assert_matches!(eval(&mut runtime, "(pair? '())"), Ok(Value::Bool(false)));
	assert_matches!(eval(&mut runtime, "(null? '())"), Ok(Value::Bool(true)));
	assert_matches!(eval(&mut runtime, "(null? 1)"), Ok(Value::Bool(false)));
	assert_matches!(eval(&mut runtime, "(list? '(1 2))"), Ok(Value::Bool(true)));
	assert_matches!(eval(&mut runtime, "(list? (cons 1 2))"), Ok(Value::Bool(false)));

	assert_matches!(
		eval(&mut runtime, "(car 5)"),
		Err(Error::Panic(Panic::InvalidOperand { name: "car", .. }))
	);
}


#[test]
#[serial]
fn test_eq() {
	let mut runtime = Runtime::new();

	assert_matches!(eval(&mut runtime, "(eq? 'a 'a)"), Ok(Value::Bool(true)));
	assert_matches!(eval(&mut runtime, "(eq? 'a 'b)"), Ok(Value::Bool(false)));
	assert_matches!(eval(&mut runtime, "(eq? 1 1)"), Ok(Value::Bool(true)));
	assert_matches!(eval(&mut runtime, "(eq? '() '())"), Ok(Value::Bool(true)));

	// Two distinct pairs are not identical, but a pair is identical to itself.
	assert_matches!(eval(&mut runtime, "(eq? (list 1) (list 1))"), Ok(Value::Bool(false)));
	assert_matches!(
		eval(&mut runtime, "((lambda (x) (eq? x x)) (list 1))"),
		Ok(Value::Bool(true))
	);
}


#[test]
#[serial]
fn test_operands_evaluate_left_to_right() {
	let mut runtime = Runtime::new();

	let program = "
		(define order '())
		(define note (lambda (x) (begin (set! order (cons x order)) x)))
		(+ (note 1) (note 2))
	";

	assert_matches!(eval(&mut runtime, program), Ok(Value::Int(3)));
	assert_eq!(eval_shown(&mut runtime, "order"), "(2 1)");
}


#[test]
#[serial]
fn test_tail_call_is_constant_space() {
	let mut runtime = Runtime::new();

	// Well beyond what non-collapsed frames would allow.
	let program = "
		(define loop (lambda (n) (if (= n 0) 0 (loop (- n 1)))))
		(loop 100000)
	";

	assert_matches!(eval(&mut runtime, program), Ok(Value::Int(0)));
}


#[test]
#[serial]
fn test_mutual_tail_calls() {
	let mut runtime = Runtime::new();

	let program = "
		(define odd? #f)
		(define even? (lambda (n) (if (= n 0) #t (odd? (- n 1)))))
		(set! odd? (lambda (n) (if (= n 0) #f (even? (- n 1)))))
		(even? 100001)
	";

	assert_matches!(eval(&mut runtime, program), Ok(Value::Bool(false)));
}


#[test]
#[serial]
fn test_deep_recursion_overflows() {
	let mut runtime = Runtime::new();

	// Non-tail recursion grows a frame per call, and must hit the stack limit
	// instead of crashing the host.
	let program = "
		(define f (lambda (n) (if (= n 0) 0 (+ 1 (f (- n 1))))))
		(f 10000000)
	";

	assert_matches!(
		eval(&mut runtime, program),
		Err(Error::Panic(Panic::StackOverflow))
	);
}


#[test]
#[serial]
fn test_call_cc_returns_its_value() {
	let mut runtime = Runtime::new();

	assert_matches!(
		eval(&mut runtime, "(call/cc (lambda (k) 7))"),
		Ok(Value::Int(7))
	);

	// Escaping: the rest of the receiver body is discarded.
	assert_matches!(
		eval(&mut runtime, "(+ 1 (call/cc (lambda (k) (begin (k 10) 999))))"),
		Ok(Value::Int(11))
	);
}


#[test]
#[serial]
fn test_call_cc_multi_shot() {
	let mut runtime = Runtime::new();

	let program = "
		(define saved-k #f)
		(+ 1 (call/cc (lambda (k) (begin (set! saved-k k) 1))))
	";

	assert_matches!(eval(&mut runtime, program), Ok(Value::Int(2)));

	// The continuation is re-entrant after its capturing frame has returned, any
	// number of times.
	assert_matches!(eval(&mut runtime, "(saved-k 10)"), Ok(Value::Int(11)));
	assert_matches!(eval(&mut runtime, "(saved-k 100)"), Ok(Value::Int(101)));
}


#[test]
#[serial]
fn test_call_cc_in_tail_position() {
	let mut runtime = Runtime::new();

	assert_matches!(
		eval(&mut runtime, "((lambda (x) (call/cc (lambda (k) (k x)))) 42)"),
		Ok(Value::Int(42))
	);

	// A continuation captured in tail position resumes the enclosing procedure's
	// caller.
	let program = "
		(define saved #f)
		(define f (lambda (x) (call/cc (lambda (k) (begin (set! saved k) x)))))
		(f 5)
	";

	assert_matches!(eval(&mut runtime, program), Ok(Value::Int(5)));
	assert_matches!(eval(&mut runtime, "(saved 9)"), Ok(Value::Int(9)));
}


#[test]
#[serial]
fn test_invalid_application() {
	let mut runtime = Runtime::new();

	assert_matches!(
		eval(&mut runtime, "(1 2)"),
		Err(Error::Panic(Panic::InvalidApplication { .. }))
	);
}


#[test]
#[serial]
fn test_compile_errors_surface() {
	let mut runtime = Runtime::new();

	assert_matches!(
		eval(&mut runtime, "nope"),
		Err(Error::Compile(compiler::Error::UnboundVariable { .. }))
	);

	assert_matches!(
		eval(&mut runtime, "(+ 1 (define x 2))"),
		Err(Error::Compile(compiler::Error::DefineNotAtTopLevel))
	);

	assert_matches!(
		eval(&mut runtime, "(quote)"),
		Err(Error::Compile(compiler::Error::MalformedForm { form: "quote" }))
	);
}


#[test]
#[serial]
fn test_runtimes_are_isolated() {
	let mut first = Runtime::new();
	let mut second = Runtime::new();

	assert_matches!(eval(&mut first, "(define shared 1)"), Ok(_));

	// The other instance has its own global table.
	assert_matches!(
		eval(&mut second, "shared"),
		Err(Error::Compile(compiler::Error::UnboundVariable { .. }))
	);
}


#[test]
#[serial]
fn test_unbound_global_panic() {
	let symbol = crate::symbol::Interner::new().get_or_intern("ghost");

	assert_matches!(
		super::global::Globals::new().get(symbol),
		Err(Panic::UnboundGlobal { .. })
	);
}


#[test]
#[serial]
fn test_corrupt_control_block() {
	use gc::Gc;
	use crate::compiler::code::Inst;

	let mut runtime = Runtime::new();

	// Returning without a control block on the stack is an internal inconsistency.
	assert_matches!(
		runtime.exec(Gc::new(Inst::Return { count: 0 })),
		Err(Panic::CorruptStack)
	);
}


#[test]
#[serial]
fn test_stack_snapshots_are_multi_shot() {
	let mut stack = Stack::default();
	let mut sp = 0;

	sp = stack.push(Slot::Value(Value::Int(1)), sp).unwrap();
	sp = stack.push(Slot::Value(Value::Int(2)), sp).unwrap();

	let saved = stack.save(sp);

	sp = stack.push(Slot::Value(Value::Int(3)), sp).unwrap();
	assert_matches!(stack.index(sp, 0).as_value(), Some(Value::Int(3)));

	// Restoring replaces the prefix wholesale, and can be repeated.
	for _ in 0 .. 2 {
		let restored = stack.restore(&saved);
		assert_eq!(restored, 2);
		assert_matches!(stack.index(restored, 0).as_value(), Some(Value::Int(2)));
		assert_matches!(stack.index(restored, 1).as_value(), Some(Value::Int(1)));
	}
}


#[test]
#[serial]
fn test_stack_shift() {
	let mut stack = Stack::default();
	let mut sp = 0;

	for int in 1 ..= 4 {
		sp = stack.push(Slot::Value(Value::Int(int)), sp).unwrap();
	}

	// Relocate the top one slot down by two, dropping the slots in between.
	sp = stack.shift(1, 2, sp);

	assert_eq!(sp, 2);
	assert_matches!(stack.index(sp, 0).as_value(), Some(Value::Int(4)));
	assert_matches!(stack.index(sp, 1).as_value(), Some(Value::Int(1)));
}


#[test]
#[serial]
fn test_stack_overflow() {
	let mut stack = Stack::new(4);
	let mut sp = 0;

	for int in 1 ..= 4 {
		sp = stack.push(Slot::Value(Value::Int(int)), sp).unwrap();
	}

	assert!(stack.push(Slot::Value(Value::Int(5)), sp).is_err());
}
