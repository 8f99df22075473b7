//! The pending edit set.
//!
//! Records are keyed by the [`Address`] their element had when it was first entered into edit mode,
//! so there is at most one record per logical element. The live element handle is kept alongside
//! only to route input events back to their record.

use crate::{address::Address, error::DomError};
use hashbrown::{hash_map::Entry, HashMap};
use std::cmp::Reverse;
use tracing::{debug, instrument, trace, warn};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, Node};

#[derive(Debug, Clone)]
pub struct EditRecord {
	/// `innerHTML` when the element was first entered into edit mode.
	pub original: String,
	/// `innerHTML` as of the last input event, if there was one.
	pub current: Option<String>,
	element: HtmlElement,
	sequence: u64,
}

impl EditRecord {
	#[must_use]
	pub fn element(&self) -> &HtmlElement {
		&self.element
	}

	/// Whether there is edited content that differs from the original.
	#[must_use]
	pub fn is_changed(&self) -> bool {
		self.current.as_ref().map_or(false, |current| *current != self.original)
	}
}

#[derive(Debug)]
struct Active {
	element: HtmlElement,
	had_class_attribute: bool,
}

#[derive(Debug)]
pub struct EditTracker {
	records: HashMap<Address, EditRecord>,
	active: Option<Active>,
	highlight_class: String,
	sequence: u64,
}

impl EditTracker {
	#[must_use]
	pub fn new(highlight_class: impl Into<String>) -> Self {
		Self {
			records: HashMap::new(),
			active: None,
			highlight_class: highlight_class.into(),
			sequence: 0,
		}
	}

	/// Makes `element` the one active editor, tracking it first if necessary.
	///
	/// The previously active element is deactivated before `element`'s content is snapshotted,
	/// so that the snapshot of an ancestor never contains editing markers.
	///
	/// Returns whether a new record was created.
	///
	/// # Errors
	///
	/// Iff the highlight class can't be added or removed, which happens only for invalid class names.
	#[instrument(skip_all)]
	pub fn begin_edit(&mut self, element: &HtmlElement) -> Result<bool, DomError> {
		if let Some(active) = &self.active {
			if active.element.is_same_node(Some::<&Node>(element)) {
				trace!("Already active.");
				return Ok(false);
			}
		}
		self.deactivate()?;

		let created = if self.record_for(element).is_some() {
			false
		} else {
			let address = Address::of(element);
			self.sequence += 1;
			match self.records.entry(address) {
				Entry::Occupied(mut occupied) => {
					warn!(address = %occupied.key(), "A different element now has this address. Rebinding its record.");
					occupied.get_mut().element = element.clone();
					false
				}
				Entry::Vacant(vacant) => {
					debug!(address = %vacant.key(), "Tracking element.");
					let original = element.inner_html();
					if cfg!(feature = "dangerous-logging") {
						trace!(%original, "Snapshotted original content.");
					}
					vacant.insert(EditRecord {
						original,
						current: None,
						element: element.clone(),
						sequence: self.sequence,
					});
					true
				}
			}
		};

		self.activate(element)?;
		Ok(created)
	}

	/// Records the live content of the tracked element containing `target`.
	///
	/// Tracked elements inside it are refreshed too, since typing into an ancestor can change them.
	/// Returns whether anything was recorded.
	#[instrument(skip_all)]
	pub fn on_input(&mut self, target: &Node) -> bool {
		if self.records.is_empty() {
			return false;
		}

		let mut element = match target.dyn_ref::<Element>() {
			Some(element) => Some(element.clone()),
			None => target.parent_element(),
		};
		while let Some(current) = element {
			if self.record_for(&current).is_some() {
				self.sequence += 1;
				let sequence = self.sequence;
				let host: &Node = current.as_ref();
				for (address, record) in &mut self.records {
					if host.contains(Some::<&Node>(&record.element)) {
						let content = record.element.inner_html();
						if cfg!(feature = "dangerous-logging") {
							trace!(%address, %content, "Recorded input.");
						} else {
							trace!(%address, "Recorded input.");
						}
						record.current = Some(content);
						record.sequence = sequence;
					}
				}
				return true;
			}
			element = current.parent_element();
		}
		false
	}

	fn record_for(&self, element: &Element) -> Option<&EditRecord> {
		self.records.values().find(|record| record.element.is_same_node(Some::<&Node>(element)))
	}

	#[must_use]
	pub fn is_tracked(&self, element: &Element) -> bool {
		self.record_for(element).is_some()
	}

	#[must_use]
	pub fn active(&self) -> Option<&HtmlElement> {
		self.active.as_ref().map(|active| &active.element)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.records.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	#[must_use]
	pub fn get(&self, address: &Address) -> Option<&EditRecord> {
		self.records.get(address)
	}

	/// Changed records, least recently edited first, so that applying them in order lets the latest edit win.
	///
	/// Records refreshed by the same input come deepest first: the ancestor that received the input
	/// already contains their content and must be applied after them.
	#[must_use]
	pub fn changed(&self) -> Vec<(&Address, &EditRecord)> {
		let mut changed: Vec<_> = self.records.iter().filter(|(_, record)| record.is_changed()).collect();
		changed.sort_by_key(|(address, record)| (record.sequence, Reverse(address.segments().len())));
		changed
	}

	/// Position in the edit history. Creating a record and recording input both advance it.
	#[must_use]
	pub fn revision(&self) -> u64 {
		self.sequence
	}

	/// Forgets the records last touched at or before `revision` and removes their highlight.
	/// The active element is deactivated if it is one of them.
	///
	/// # Errors
	///
	/// See [`EditTracker::begin_edit`]. The records are forgotten regardless.
	#[instrument(skip_all, fields(revision))]
	pub fn forget_through(&mut self, revision: u64) -> Result<(), DomError> {
		let active_is_forgotten = self.active.as_ref().map_or(false, |active| {
			self.records
				.values()
				.any(|record| record.sequence <= revision && record.element.is_same_node(Some::<&Node>(&active.element)))
		});
		let mut result = if active_is_forgotten { self.deactivate() } else { Ok(()) };

		let highlight_class = &self.highlight_class;
		self.records.retain(|address, record| {
			if record.sequence > revision {
				debug!(%address, "Keeping later edit.");
				return true;
			}
			if let Err(error) = record.element.class_list().remove_1(highlight_class) {
				result = Err(DomError::new("classList.remove", error));
			}
			false
		});
		result
	}

	/// Deactivates the active element, removes all highlights and forgets every record.
	///
	/// # Errors
	///
	/// See [`EditTracker::begin_edit`]. Records are forgotten regardless.
	#[instrument(skip_all, fields(records = self.records.len()))]
	pub fn clear(&mut self) -> Result<(), DomError> {
		let deactivated = self.deactivate();
		let mut result = Ok(());
		for record in self.records.values() {
			if let Err(error) = record.element.class_list().remove_1(&self.highlight_class) {
				result = Err(DomError::new("classList.remove", error));
			}
		}
		self.records.clear();
		deactivated.and(result)
	}

	fn activate(&mut self, element: &HtmlElement) -> Result<(), DomError> {
		let had_class_attribute = element.has_attribute("class");
		element.set_content_editable("true");
		element.class_list().add_1(&self.highlight_class).map_err(DomError::during("classList.add"))?;
		self.active = Some(Active {
			element: element.clone(),
			had_class_attribute,
		});
		Ok(())
	}

	fn deactivate(&mut self) -> Result<(), DomError> {
		if let Some(Active { element, had_class_attribute }) = self.active.take() {
			// Removes the attribute, so that no `contenteditable="false"` ends up in an ancestor's snapshot.
			element.set_content_editable("inherit");
			let class_list = element.class_list();
			class_list.remove_1(&self.highlight_class).map_err(DomError::during("classList.remove"))?;
			if !had_class_attribute && class_list.length() == 0 {
				element.remove_attribute("class").map_err(DomError::during("removeAttribute"))?;
			}
		}
		Ok(())
	}
}
