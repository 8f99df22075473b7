use crate::error::DomError;
use hashbrown::HashMap;
use tracing::{trace, warn};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Event, EventTarget};

/// Event handlers bound to one [`EventTarget`], listed per event type.
///
/// Handlers are independent of each other, so registration order doesn't matter.
/// All of them are removed from the target when this instance is dropped.
pub struct EventListeners {
	target: EventTarget,
	handlers: HashMap<&'static str, Vec<Closure<dyn Fn(Event)>>>,
}

impl EventListeners {
	#[must_use]
	pub fn new(target: EventTarget) -> Self {
		Self {
			target,
			handlers: HashMap::new(),
		}
	}

	/// Adds `handler` as listener for `event_type` events.
	///
	/// # Errors
	///
	/// Iff `addEventListener` throws.
	pub fn on(&mut self, event_type: &'static str, handler: impl Fn(Event) + 'static) -> Result<(), DomError> {
		let closure = Closure::wrap(Box::new(handler) as Box<dyn Fn(Event)>);
		self.target
			.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())
			.map_err(DomError::during("addEventListener"))?;
		self.handlers.entry(event_type).or_default().push(closure);
		trace!(event_type, "Created Closure.");
		Ok(())
	}

	#[must_use]
	pub fn len(&self, event_type: &str) -> usize {
		self.handlers.get(event_type).map_or(0, Vec::len)
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.handlers.values().all(Vec::is_empty)
	}
}

impl Drop for EventListeners {
	fn drop(&mut self) {
		for (event_type, closures) in self.handlers.drain() {
			for closure in closures {
				if let Err(error) = self.target.remove_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref()) {
					warn!(event_type, "Could not remove event listener: {:?}", error);
				}
			}
			trace!(event_type, "Destroyed Closures.");
		}
	}
}

impl core::fmt::Debug for EventListeners {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("EventListeners")
			.field("target", &self.target)
			.field("handlers", &self.handlers.iter().map(|(event_type, closures)| (*event_type, closures.len())).collect::<Vec<_>>())
			.finish()
	}
}
