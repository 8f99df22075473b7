//! Rebuilding the document file from its original text and a set of edits.
//!
//! The original text is parsed into a fresh, detached [`Document`], so that anything the editing session did to the
//! live page (highlight classes, `contenteditable`, script-generated nodes) never ends up in the file.
//! Only the children of addressed elements are replaced. Everything else is whatever the parser made of the original.

use crate::{
	address::Address,
	config::{EditorConfig, Serialization},
	error::DomError,
};
use tracing::{debug, instrument, trace, trace_span, warn};
use wasm_bindgen::JsValue;
use web_sys::{Document, DomParser, Element, SupportedType, XmlSerializer};

/// The new file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
	pub text: String,
	/// Number of edits that were spliced in.
	pub applied: usize,
	/// Number of edits whose address had no match in the original document.
	pub missed: usize,
}

/// Applies `edits` in order to a fresh parse of `original` and serializes the result, DOCTYPE line included.
///
/// Each edit is an address and the new inner HTML for the first element it resolves to.
/// Edits that don't resolve are skipped.
///
/// # Errors
///
/// Iff the browser refuses to parse or serialize, which would be a bug in the browser or in this function.
#[instrument(skip_all, fields(original.len = original.len()))]
pub fn reconcile<'a>(original: &str, edits: impl IntoIterator<Item = (&'a Address, &'a str)>, config: &EditorConfig) -> Result<Rendered, DomError> {
	let document = DomParser::new()
		.map_err(DomError::during("new DOMParser"))?
		.parse_from_string(original, SupportedType::TextHtml)
		.map_err(DomError::during("DOMParser.parseFromString"))?;

	let mut applied = 0;
	let mut missed = 0;
	for (address, content) in edits {
		let span = trace_span!("Applying edit", %address);
		let _enter = span.enter();
		match address.resolve(&document) {
			Some(target) => {
				replace_children(&document, &target, content)?;
				if cfg!(feature = "dangerous-logging") {
					trace!(%content, "Replaced content.");
				}
				applied += 1;
			}
			None => {
				warn!("No matching element in the original document. Skipping this edit.");
				missed += 1;
			}
		}
	}

	let root = document
		.document_element()
		.ok_or_else(|| DomError::new("documentElement", JsValue::from_str("The parsed document has no root element.")))?;
	let serialized = match config.serialization {
		Serialization::Html => root.outer_html(),
		Serialization::Xml => XmlSerializer::new()
			.map_err(DomError::during("new XMLSerializer"))?
			.serialize_to_string(&root)
			.map_err(DomError::during("XMLSerializer.serializeToString"))?,
	};

	debug!(applied, missed, "Rebuilt document.");
	Ok(Rendered {
		text: format!("{}{}", config.doctype, serialized),
		applied,
		missed,
	})
}

/// Replaces all children of `target` with the nodes parsed from `content`.
///
/// `content` is parsed in a scratch `<div>` owned by `document`, so the new nodes are adopted without copying.
fn replace_children(document: &Document, target: &Element, content: &str) -> Result<(), DomError> {
	let scratch = document.create_element("div").map_err(DomError::during("createElement"))?;
	scratch.set_inner_html(content);
	while let Some(child) = target.first_child() {
		target.remove_child(&child).map_err(DomError::during("removeChild"))?;
	}
	while let Some(child) = scratch.first_child() {
		target.append_child(&child).map_err(DomError::during("appendChild"))?;
	}
	Ok(())
}
