pub mod fmt;

use gc::{Finalize, Gc, Trace};

use crate::{
	runtime::mem::Slot,
	runtime::value::Value,
	symbol::Symbol,
};


/// A virtual machine instruction.
/// Instructions form a forward chain through their `next` links, terminated by `Halt`,
/// `Apply` or `Return`. Chains may be shared and re-entered: closures reference a body
/// node, and saved control blocks reference return nodes.
#[derive(Debug)]
#[derive(Trace, Finalize)]
pub enum Inst {
	/// Stop execution, yielding the accumulator.
	Halt,
	/// Load a frame slot into the accumulator.
	ReferLocal { slot: usize, next: Gc<Inst> },
	/// Load a closure capture slot into the accumulator.
	ReferFree { slot: usize, next: Gc<Inst> },
	/// Load a global variable into the accumulator.
	ReferGlobal { symbol: Symbol, next: Gc<Inst> },
	/// Unwrap the box just loaded into the accumulator.
	Indirect { next: Gc<Inst> },
	/// Load a literal into the accumulator.
	Constant { value: Value, next: Gc<Inst> },
	/// Build a closure capturing the top `free_count` stack slots, shrinking the stack
	/// by as much.
	Close {
		params: usize,
		variadic: bool,
		free_count: usize,
		body: Gc<Inst>,
		next: Gc<Inst>,
	},
	/// Replace a frame slot's raw value with a box wrapping it.
	Box { slot: usize, next: Gc<Inst> },
	/// Branch on the accumulator being anything but `#f`.
	Test { then: Gc<Inst>, otherwise: Gc<Inst> },
	/// Store the accumulator through the box in a frame slot.
	AssignLocal { slot: usize, next: Gc<Inst> },
	/// Store the accumulator through the box in a closure capture slot.
	AssignFree { slot: usize, next: Gc<Inst> },
	/// Store the accumulator into a global variable.
	AssignGlobal { symbol: Symbol, next: Gc<Inst> },
	/// Load a continuation closure reifying the current stack into the accumulator.
	/// On reentry the continuation pops `pop` locals before resuming: zero under a
	/// fresh frame, the enclosing body's local count when captured in tail position.
	Conti { pop: usize, next: Gc<Inst> },
	/// Overwrite the live stack with the saved snapshot.
	Nuate { stack: Gc<Box<[Slot]>>, next: Gc<Inst> },
	/// Push a call control block: return instruction, frame pointer and closure.
	Frame { ret: Gc<Inst>, next: Gc<Inst> },
	/// Push the accumulator onto the stack.
	Argument { next: Gc<Inst> },
	/// Relocate the top `count` stack slots down by `depth`, collapsing the caller's
	/// frame for a tail call.
	Shift { count: usize, depth: usize, next: Gc<Inst> },
	/// Apply the procedure in the accumulator to the top `count` stack slots.
	Apply { count: usize },
	/// Pop `count` locals and resume from the control block beneath them.
	Return { count: usize },
}
