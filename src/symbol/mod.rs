mod fmt;

use gc::{Finalize, Trace};
use intaglio::{Symbol as SymbolInner, SymbolTable};


/// A symbol is a reference to a name stored in the symbol interner.
/// Equality is identity: two symbols are equal iff they intern the same name.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Symbol(SymbolInner);


/// The default symbol is a dummy symbol, which will yield "<invalid symbol>" when
/// resolved.
impl Default for Symbol {
	fn default() -> Self {
		Self(SymbolInner::new(0))
	}
}


impl Finalize for Symbol { }


/// Symbols are plain indexes into the interner, and contain no garbage collected fields.
unsafe impl Trace for Symbol {
	gc::unsafe_empty_trace!();
}


impl From<Symbol> for usize {
	fn from(symbol: Symbol) -> usize {
		symbol.0.id() as usize
	}
}


/// A symbol interner, used to store identifiers and special form names.
#[derive(Debug)]
pub struct Interner(SymbolTable);


impl Interner {
	/// Create a new interner. Please note that this allocates memory even if no symbols are
	/// inserted.
	pub fn new() -> Self {
		let mut interner = SymbolTable::new();
		interner
			.intern("<invalid symbol>")
			.expect("failed to intern symbol");
		Self(interner)
	}


	/// Get the symbol for a name, if it has been interned.
	#[cfg(test)]
	pub fn get<T>(&self, name: T) -> Option<Symbol>
	where
		T: AsRef<str>,
	{
		self.0
			.check_interned(name.as_ref())
			.map(Symbol)
	}


	/// Get the symbol for a name. The name is interned if needed.
	pub fn get_or_intern<T>(&mut self, name: T) -> Symbol
	where
		T: AsRef<str>,
	{
		let name = name.as_ref().to_owned();

		Symbol(
			self.0
				.intern(name)
				.expect("failed to intern symbol")
		)
	}


	/// Resolve the name for a symbol.
	pub fn resolve(&self, symbol: Symbol) -> Option<&str> {
		self.0.get(symbol.0)
	}


	/// Get the number of interned names.
	/// This does not include the dummy symbol.
	#[cfg(test)]
	pub fn len(&self) -> usize {
		self.0.len() - 1
	}
}
