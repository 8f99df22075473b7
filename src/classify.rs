use crate::{address::tag_of, config::EditorConfig};
use tracing::trace;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, Node};

/// Resolves an event target to the block that should be edited.
///
/// Starting at `node` (or its parent element, for text and other non-element nodes), walks up to the nearest
/// HTML element whose tag is in [`EditorConfig::editable_tags`]. That element is returned only if its trimmed text content is non-empty.
#[must_use]
pub fn editable_element(node: &Node, config: &EditorConfig) -> Option<HtmlElement> {
	let mut element = match node.dyn_ref::<Element>() {
		Some(element) => Some(element.clone()),
		None => node.parent_element(),
	};
	while let Some(current) = element {
		if config.is_editable_tag(&tag_of(&current)) {
			if let Some(html_element) = current.dyn_ref::<HtmlElement>() {
				return if html_element.text_content().map_or(false, |text| !text.trim().is_empty()) {
					Some(html_element.clone())
				} else {
					trace!("Nearest editable element is blank.");
					None
				};
			}
		}
		element = current.parent_element();
	}
	None
}
