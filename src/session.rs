use crate::{
	classify::editable_element,
	config::EditorConfig,
	error::{DomError, OpenError, SaveError},
	file::SourceFile,
	reconcile::{reconcile, Rendered},
	tracker::EditTracker,
};
use std::rc::Rc;
use tracing::{debug, info, instrument, warn};
use web_sys::{HtmlElement, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
	/// There were no changed edits, so nothing was written.
	Skipped,
	Written { applied: usize, missed: usize },
}

/// File content rendered from a session's edits, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
	pub rendered: Rendered,
	revision: u64,
}

/// One editing session on one file, from opening it until its edits are saved.
///
/// The snapshot of the file's original text is taken in [`Session::open`]. Edits never change it.
/// Only a successful save replaces it, with exactly the text that was written.
#[derive(Debug)]
pub struct Session<F> {
	file: F,
	original: String,
	tracker: EditTracker,
	config: Rc<EditorConfig>,
}

impl<F: SourceFile> Session<F> {
	/// Reads `file` and starts a session on its content.
	///
	/// # Errors
	///
	/// Iff the file can't be read as text.
	#[instrument(skip_all, fields(file = %file.name()))]
	pub async fn open(file: F, config: Rc<EditorConfig>) -> Result<Self, OpenError> {
		let original = file.read_text().await?;
		info!(length = original.len(), "Session started.");
		Ok(Self::new(file, original, config))
	}

	#[must_use]
	pub fn new(file: F, original: String, config: Rc<EditorConfig>) -> Self {
		Self {
			file,
			original,
			tracker: EditTracker::new(config.highlight_class.clone()),
			config,
		}
	}

	#[must_use]
	pub fn file(&self) -> &F {
		&self.file
	}

	#[must_use]
	pub fn original(&self) -> &str {
		&self.original
	}

	#[must_use]
	pub fn tracker(&self) -> &EditTracker {
		&self.tracker
	}

	#[must_use]
	pub fn config(&self) -> &EditorConfig {
		&self.config
	}

	/// Enters the editable block around `target` into edit mode. Returns it, or `None` if there is none.
	///
	/// # Errors
	///
	/// See [`EditTracker::begin_edit`].
	pub fn begin_edit(&mut self, target: &Node) -> Result<Option<HtmlElement>, DomError> {
		match editable_element(target, &self.config) {
			Some(element) => {
				self.tracker.begin_edit(&element)?;
				Ok(Some(element))
			}
			None => Ok(None),
		}
	}

	pub fn on_input(&mut self, target: &Node) -> bool {
		self.tracker.on_input(target)
	}

	/// Produces the new file content, or `None` if no tracked element has changed.
	///
	/// # Errors
	///
	/// See [`reconcile`].
	#[instrument(skip_all, fields(tracked = self.tracker.len()))]
	pub fn render(&self) -> Result<Option<Draft>, SaveError> {
		let changed = self.tracker.changed();
		if changed.is_empty() {
			debug!("Nothing to save.");
			return Ok(None);
		}
		let edits = changed.into_iter().filter_map(|(address, record)| record.current.as_deref().map(|current| (address, current)));
		Ok(Some(Draft {
			rendered: reconcile(&self.original, edits, &self.config)?,
			revision: self.tracker.revision(),
		}))
	}

	/// Call once `draft` was written: its text becomes the new original and the edits it contains are forgotten.
	///
	/// Elements entered or typed into after `draft` was rendered stay tracked.
	///
	/// # Errors
	///
	/// See [`EditTracker::forget_through`]. The written edits are forgotten regardless.
	#[instrument(skip_all, fields(revision = draft.revision))]
	pub fn commit(&mut self, draft: Draft) -> Result<(), DomError> {
		self.original = draft.rendered.text;
		self.tracker.forget_through(draft.revision)
	}

	/// Forgets all edits, for example after their result was written.
	///
	/// # Errors
	///
	/// See [`EditTracker::clear`]. The edits are forgotten regardless.
	pub fn clear_edits(&mut self) -> Result<(), DomError> {
		self.tracker.clear()
	}

	/// Writes all changed edits into the file.
	///
	/// If writing fails, all edits are kept so that saving can be retried.
	///
	/// # Errors
	///
	/// Iff rebuilding the document or writing the file fails.
	#[instrument(skip_all, fields(file = %self.file.name()))]
	pub async fn save(&mut self) -> Result<SaveOutcome, SaveError> {
		let draft = match self.render()? {
			Some(draft) => draft,
			None => return Ok(SaveOutcome::Skipped),
		};
		self.file.write_text(&draft.rendered.text).await?;
		let (applied, missed) = (draft.rendered.applied, draft.rendered.missed);
		if let Err(error) = self.commit(draft) {
			warn!("Saved, but could not reset the page: {}", error);
		}
		info!(applied, missed, "Saved.");
		Ok(SaveOutcome::Written { applied, missed })
	}
}
