mod arith;
mod pairs;
mod print;

use crate::symbol::Interner;
use super::{
	global::Globals,
	value::{NativeFun, RustFun},
};


/// Register every primitive procedure in the global table.
pub fn register(globals: &mut Globals, interner: &mut Interner) {
	put(globals, interner, pairs::Cons);
	put(globals, interner, pairs::Car);
	put(globals, interner, pairs::Cdr);
	put(globals, interner, pairs::List);
	put(globals, interner, pairs::IsPair);
	put(globals, interner, pairs::IsNull);
	put(globals, interner, pairs::IsList);
	put(globals, interner, pairs::IsEq);
	put(globals, interner, arith::Add);
	put(globals, interner, arith::Sub);
	put(globals, interner, arith::Mul);
	put(globals, interner, arith::Div);
	put(globals, interner, arith::NumEq);
	put(globals, interner, arith::Lt);
	put(globals, interner, arith::Gt);
	put(globals, interner, print::Print);
}


fn put<T: NativeFun>(globals: &mut Globals, interner: &mut Interner, fun: T) {
	let symbol = interner.get_or_intern(fun.name());
	globals.put(symbol, RustFun::from(fun).into());
}
