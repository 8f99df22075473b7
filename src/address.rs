//! Structural addresses: where an element sits in its document, as a path of tag names and same-tag sibling positions.
//!
//! An [`Address`] is computed against the live page and then evaluated against an independently parsed copy of the
//! original markup, so it must only depend on structure that both documents share. Recomputing it for the same
//! structural position in a structurally identical document yields an equal value (and an identical string).
//!
//! The string form is the XPath subset `/html/body/div/p[2]`:
//! A segment without a position selects every child with that tag, a segment with `[n]` only the `n`th such child (1-based).
//! [`Address::of`] omits the position for the first child with a given tag and includes it for all later ones.

use core::{fmt, num::NonZeroUsize, str::FromStr};
use thiserror::Error;
use tracing::{instrument, trace};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Node};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
	/// Lower-case tag name.
	pub tag: String,
	/// 1-based position among preceding siblings with the same tag, if not the first.
	pub position: Option<NonZeroUsize>,
}

impl Segment {
	fn accepts(&self, tag: &str, same_tag_index: usize) -> bool {
		self.tag == tag && self.position.map_or(true, |position| position.get() == same_tag_index)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(Vec<Segment>);

impl Address {
	#[must_use]
	pub fn segments(&self) -> &[Segment] {
		&self.0
	}

	/// Computes the address of `element` relative to the root of whatever tree it is currently part of.
	#[must_use]
	#[instrument(skip(element))]
	pub fn of(element: &Element) -> Self {
		let mut segments = Vec::new();
		let mut current = Some(element.clone());
		while let Some(element) = current {
			let tag = tag_of(&element);
			let mut preceding = 0;
			let mut sibling = element.previous_element_sibling();
			while let Some(previous) = sibling {
				if tag_of(&previous) == tag {
					preceding += 1;
				}
				sibling = previous.previous_element_sibling();
			}
			segments.push(Segment {
				tag,
				position: if preceding == 0 { None } else { NonZeroUsize::new(preceding + 1) },
			});
			current = element.parent_element();
		}
		segments.reverse();
		let address = Self(segments);
		trace!(%address, "Computed address.");
		address
	}

	/// Like [`Address::of`], but accepts any node. Non-elements have no address.
	#[must_use]
	pub fn of_node(node: Option<&Node>) -> Option<Self> {
		node.and_then(|node| node.dyn_ref::<Element>()).map(Self::of)
	}

	/// Evaluates this address against `document` and returns the first match in document order.
	#[must_use]
	#[instrument(skip_all, fields(address = %self))]
	pub fn resolve(&self, document: &Document) -> Option<Element> {
		let found = first_match(document.first_element_child(), &self.0);
		if found.is_none() {
			trace!("No match.");
		}
		found
	}
}

fn first_match(first_child: Option<Element>, segments: &[Segment]) -> Option<Element> {
	let (segment, rest) = segments.split_first()?;
	let mut same_tag_index = 0;
	let mut child = first_child;
	while let Some(candidate) = child {
		child = candidate.next_element_sibling();
		let tag = tag_of(&candidate);
		if tag != segment.tag {
			continue;
		}
		same_tag_index += 1;
		if !segment.accepts(&tag, same_tag_index) {
			continue;
		}
		if rest.is_empty() {
			return Some(candidate);
		}
		if let Some(found) = first_match(candidate.first_element_child(), rest) {
			return Some(found);
		}
		if segment.position.is_some() {
			// Positions are unique among siblings.
			return None;
		}
	}
	None
}

pub(crate) fn tag_of(element: &Element) -> String {
	element.tag_name().to_ascii_lowercase()
}

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for Segment { tag, position } in &self.0 {
			write!(f, "/{}", tag)?;
			if let Some(position) = position {
				write!(f, "[{}]", position)?;
			}
		}
		Ok(())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAddressError {
	#[error("addresses must start with `/`")]
	Relative,
	#[error("empty segment at {0}")]
	EmptySegment(usize),
	#[error("invalid position in segment {0:?}")]
	InvalidPosition(String),
}

impl FromStr for Address {
	type Err = ParseAddressError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let rest = s.strip_prefix('/').ok_or(ParseAddressError::Relative)?;
		rest.split('/')
			.enumerate()
			.map(|(i, segment)| {
				let (tag, position) = match segment.find('[') {
					None => (segment, None),
					Some(open) => {
						let digits = segment[open + 1..]
							.strip_suffix(']')
							.ok_or_else(|| ParseAddressError::InvalidPosition(segment.to_owned()))?;
						let position = digits.parse::<NonZeroUsize>().map_err(|_| ParseAddressError::InvalidPosition(segment.to_owned()))?;
						(&segment[..open], Some(position))
					}
				};
				if tag.is_empty() {
					return Err(ParseAddressError::EmptySegment(i));
				}
				Ok(Segment {
					tag: tag.to_ascii_lowercase(),
					position,
				})
			})
			.collect::<Result<_, _>>()
			.map(Self)
	}
}
