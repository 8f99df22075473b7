//! Error types.
//!
//! JavaScript exceptions are kept as the [`JsValue`] they were thrown with,
//! since that is what ends up most useful in the browser console.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// A DOM operation threw.
#[derive(Debug, Error)]
#[error("{operation} failed: {error:?}")]
pub struct DomError {
	pub operation: &'static str,
	pub error: JsValue,
}

impl DomError {
	#[must_use]
	pub fn new(operation: &'static str, error: JsValue) -> Self {
		Self { operation, error }
	}

	/// Adapter for [`Result::map_err`].
	pub fn during(operation: &'static str) -> impl FnOnce(JsValue) -> Self {
		move |error| Self::new(operation, error)
	}
}

#[derive(Debug, Error)]
pub enum FileError {
	#[error("file picker failed: {0:?}")]
	Picker(JsValue),
	#[error("could not read file: {0:?}")]
	Read(JsValue),
	#[error("file content is not text")]
	NotText,
	#[error("could not write file: {0:?}")]
	Write(JsValue),
	#[error("could not commit file: {0:?}")]
	Close(JsValue),
}

#[derive(Debug, Error)]
pub enum OpenError {
	#[error("this browser does not expose `showOpenFilePicker`")]
	Unsupported,
	#[error(transparent)]
	File(#[from] FileError),
}

#[derive(Debug, Error)]
pub enum SaveError {
	#[error("could not rebuild the document: {0}")]
	Dom(#[from] DomError),
	#[error(transparent)]
	Write(#[from] FileError),
}
