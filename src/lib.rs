#![doc(html_root_url = "https://docs.rs/html-inplace-editor/0.1.0")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod address;
pub mod classify;
pub mod config;
pub mod error;
pub mod file;
pub mod listeners;
pub mod reconcile;
pub mod session;
pub mod shell;
pub mod tracker;

pub use address::Address;
pub use config::EditorConfig;
pub use session::{SaveOutcome, Session};
pub use shell::Shell;

/// Content script entry point: installs the open and save buttons into the current page.
#[cfg(feature = "content-script")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
	// Fails only if a subscriber is installed already, which is fine.
	let _ = tracing_wasm::try_set_as_global_default();

	let document = match web_sys::window().and_then(|window| window.document()) {
		Some(document) => document,
		None => return tracing::error!("Not running in a page."),
	};
	match Shell::<file::FileHandle>::install_with_picker(document, std::rc::Rc::new(EditorConfig::default())) {
		// The shell lives as long as the page.
		Ok(shell) => core::mem::forget(shell),
		Err(error) => tracing::error!("Could not install the editor: {}", error),
	}
}
