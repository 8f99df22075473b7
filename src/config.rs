/// How the rebuilt document is turned back into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Serialization {
	/// [***outerHTML***](https://developer.mozilla.org/en-US/docs/Web/API/Element/outerHTML) of the document element.
	Html,
	/// [***XMLSerializer***](https://developer.mozilla.org/en-US/docs/Web/API/XMLSerializer), which adds an XHTML namespace declaration to `<html>`.
	Xml,
}

impl Default for Serialization {
	fn default() -> Self {
		Self::Html
	}
}

#[derive(Debug, Clone)]
pub struct EditorConfig {
	/// Lower-case tag names that can be entered into edit mode.
	pub editable_tags: Vec<String>,
	/// Class added to the element that is currently being edited.
	pub highlight_class: String,
	/// Written verbatim before the serialized document element.
	pub doctype: String,
	pub serialization: Serialization,
	pub picker_description: String,
	/// Extensions accepted by the file picker, with leading dot.
	pub picker_extensions: Vec<String>,
	pub open_label: String,
	pub save_label: String,
	/// Reload the page after saving, so that it shows what was written.
	pub reload_after_save: bool,
}

impl Default for EditorConfig {
	fn default() -> Self {
		Self {
			editable_tags: ["p", "div", "span", "h1", "h2", "h3", "li"].iter().map(|&tag| tag.to_owned()).collect(),
			highlight_class: "editable-highlight".to_owned(),
			doctype: "<!DOCTYPE html>\n".to_owned(),
			serialization: Serialization::default(),
			picker_description: "HTML document".to_owned(),
			picker_extensions: vec![".html".to_owned(), ".htm".to_owned()],
			open_label: "📂 Open local HTML file".to_owned(),
			save_label: "💾 Save changes".to_owned(),
			reload_after_save: true,
		}
	}
}

impl EditorConfig {
	#[must_use]
	pub fn is_editable_tag(&self, tag: &str) -> bool {
		self.editable_tags.iter().any(|editable| editable.eq_ignore_ascii_case(tag))
	}
}
