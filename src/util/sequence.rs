use std::{cell::Cell, rc::Rc};

/// Hands out increasing tickets so that only the response to the most recent
/// request is applied. Earlier responses that arrive late are discarded.
#[derive(Clone, Default)]
pub struct RequestSequence(Rc<Cell<u64>>);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

impl PartialEq for RequestSequence {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl RequestSequence {
	pub fn next(&self) -> Ticket {
		let id = self.0.get() + 1;
		self.0.set(id);
		Ticket(id)
	}

	pub fn is_current(&self, ticket: Ticket) -> bool {
		self.0.get() == ticket.0
	}

	/// Invalidate every outstanding ticket.
	pub fn cancel(&self) {
		self.next();
	}
}
