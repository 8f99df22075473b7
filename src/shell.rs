//! The page-facing part: style sheet, buttons and event wiring.

use crate::{
	config::EditorConfig,
	error::DomError,
	file::{pick_html_file, FileHandle, SourceFile},
	listeners::EventListeners,
	session::{Draft, Session},
};
use core::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::{debug, error, info, instrument, trace, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, HtmlElement, Node};

pub const OPEN_BUTTON_ID: &str = "editorOpenBtn";
pub const SAVE_BUTTON_ID: &str = "editorSaveBtn";

struct ActiveSession<F> {
	session: Session<F>,
	// Unbinds the document-wide handlers when the session ends.
	_listeners: EventListeners,
}

/// Installed once per page. Holds at most one [`Session`] at a time.
pub struct Shell<F = FileHandle> {
	document: Document,
	config: Rc<EditorConfig>,
	save_button: HtmlElement,
	active: RefCell<Option<ActiveSession<F>>>,
	saving: Cell<bool>,
	// Bumped by every `start`, so a finished write can tell whether its session is still current.
	generation: Cell<u64>,
	button_listeners: RefCell<Vec<EventListeners>>,
}

impl<F: SourceFile + 'static> Shell<F> {
	/// Adds the style sheet and save button to `document`.
	///
	/// # Errors
	///
	/// Iff `document` has no body or an element can't be created or inserted.
	#[instrument(skip_all)]
	pub fn install(document: Document, config: Rc<EditorConfig>) -> Result<Rc<Self>, DomError> {
		let body = document.body().ok_or_else(|| DomError::new("document.body", JsValue::from_str("The page has no body.")))?;

		let style = document.create_element("style").map_err(DomError::during("createElement"))?;
		style.set_text_content(Some(&style_sheet(&config)));
		match document.head() {
			Some(head) => head.append_child(&style),
			None => body.append_child(&style),
		}
		.map_err(DomError::during("appendChild"))?;

		let save_button = create_button(&document, SAVE_BUTTON_ID, &config.save_label)?;
		body.append_child(&save_button).map_err(DomError::during("appendChild"))?;

		let shell = Rc::new(Self {
			document,
			config,
			save_button: save_button.clone(),
			active: RefCell::new(None),
			saving: Cell::new(false),
			generation: Cell::new(0),
			button_listeners: RefCell::new(Vec::new()),
		});

		let mut listeners = EventListeners::new(save_button.into());
		let weak = Rc::downgrade(&shell);
		listeners.on("click", move |_| with_shell(&weak, Self::save))?;
		shell.button_listeners.borrow_mut().push(listeners);

		debug!("Installed.");
		Ok(shell)
	}

	#[must_use]
	pub fn config(&self) -> &EditorConfig {
		&self.config
	}

	#[must_use]
	pub fn save_button(&self) -> &HtmlElement {
		&self.save_button
	}

	#[must_use]
	pub fn has_session(&self) -> bool {
		self.active.borrow().is_some()
	}

	/// Number of tracked elements in the current session.
	#[must_use]
	pub fn pending(&self) -> usize {
		self.active.borrow().as_ref().map_or(0, |active| active.session.tracker().len())
	}

	/// Makes `session` the current one and starts listening for double-clicks and input on the page.
	///
	/// A previous session is discarded together with its unsaved edits.
	///
	/// # Errors
	///
	/// Iff the event listeners can't be added.
	#[instrument(skip_all)]
	pub fn start(self: &Rc<Self>, session: Session<F>) -> Result<(), DomError> {
		let mut listeners = EventListeners::new(self.document.clone().into());
		let weak = Rc::downgrade(self);
		listeners.on("dblclick", move |event| with_shell(&weak, |shell| shell.on_double_click(&event)))?;
		let weak = Rc::downgrade(self);
		listeners.on("input", move |event| with_shell(&weak, |shell| shell.on_input(&event)))?;

		self.generation.set(self.generation.get() + 1);
		let previous = self.active.replace(Some(ActiveSession { session, _listeners: listeners }));
		if let Some(mut previous) = previous {
			warn!(discarded = previous.session.tracker().len(), "Replacing the previous session.");
			if let Err(error) = previous.session.clear_edits() {
				warn!("Could not reset the previous session's elements: {}", error);
			}
		}
		self.set_save_visible(false);
		info!("Editing enabled. Double-click a text block to edit it.");
		Ok(())
	}

	fn on_double_click(&self, event: &Event) {
		let target = match event_node(event) {
			Some(target) => target,
			None => return,
		};
		let mut active = self.active.borrow_mut();
		let active = match active.as_mut() {
			Some(active) => active,
			None => return,
		};
		match active.session.begin_edit(&target) {
			Ok(Some(_)) => self.set_save_visible(true),
			Ok(None) => trace!("Nothing editable was double-clicked."),
			Err(error) => error!("Could not start editing: {}", error),
		}
	}

	fn on_input(&self, event: &Event) {
		if let (Some(target), Some(active)) = (event_node(event), self.active.borrow_mut().as_mut()) {
			active.session.on_input(&target);
		}
	}

	/// Rebuilds the file from the current session's edits and writes it.
	///
	/// Does nothing without a session, without changes, or while a save is in flight.
	/// On success, the saved edits are reset and (if so configured) the page is reloaded.
	/// Edits made while the write was in flight stay pending. On failure, all edits are kept.
	#[instrument(skip_all)]
	pub fn save(self: &Rc<Self>) {
		if self.saving.get() {
			return debug!("Already saving.");
		}

		let (file, draft) = {
			let active = self.active.borrow();
			let session = match active.as_ref() {
				Some(active) => &active.session,
				None => return debug!("No file is open."),
			};
			match session.render() {
				Ok(Some(draft)) => (session.file().clone(), draft),
				Ok(None) => return debug!("Nothing to save."),
				Err(error) => {
					error!("Could not save: {}", error);
					return self.alert(&format!("Could not save: {}", error));
				}
			}
		};

		self.saving.set(true);
		let generation = self.generation.get();
		let shell = Rc::clone(self);
		spawn_local(async move {
			let written = file.write_text(&draft.rendered.text).await;
			shell.saving.set(false);
			match written {
				Ok(()) => shell.after_save(generation, draft),
				Err(error) => {
					error!("Changes were not saved: {}", error);
					shell.alert(&format!("Changes were not saved: {}", error));
				}
			}
		});
	}

	fn after_save(&self, generation: u64, draft: Draft) {
		let (applied, missed) = (draft.rendered.applied, draft.rendered.missed);
		match self.active.borrow_mut().as_mut() {
			Some(active) if self.generation.get() == generation => {
				if let Err(error) = active.session.commit(draft) {
					warn!("Could not reset the edited elements: {}", error);
				}
			}
			_ => debug!("The session was replaced during the write."),
		}
		info!(applied, missed, "Saved.");

		let pending = self.pending();
		if pending > 0 {
			return info!(pending, "Edits made during the write are still unsaved.");
		}
		self.remove_highlights();
		self.set_save_visible(false);

		if self.config.reload_after_save {
			match web_sys::window().map(|window| window.location().reload()) {
				Some(Ok(())) => (),
				Some(Err(error)) => error!("Could not reload the page: {:?}", error),
				None => error!("No window to reload."),
			}
		}
	}

	/// Removes the highlight class from every element on the page.
	fn remove_highlights(&self) {
		let highlighted = match self.document.query_selector_all(&format!(".{}", self.config.highlight_class)) {
			Ok(highlighted) => highlighted,
			Err(error) => return warn!("Could not query highlighted elements: {:?}", error),
		};
		for i in 0..highlighted.length() {
			if let Some(element) = highlighted.get(i).and_then(|node| node.dyn_into::<Element>().ok()) {
				if let Err(error) = element.class_list().remove_1(&self.config.highlight_class) {
					warn!("Could not remove highlight: {:?}", error);
				}
			}
		}
	}

	fn set_save_visible(&self, visible: bool) {
		if let Err(error) = self.save_button.style().set_property("display", if visible { "block" } else { "none" }) {
			warn!("Could not toggle the save button: {:?}", error);
		}
	}

	fn alert(&self, message: &str) {
		if let Some(Err(error)) = web_sys::window().map(|window| window.alert_with_message(message)) {
			warn!("Could not show alert: {:?}", error);
		}
	}
}

impl Shell<FileHandle> {
	/// Additionally adds the open button, which lets the user pick a file and starts a session on it.
	///
	/// # Errors
	///
	/// See [`Shell::install`].
	#[instrument(skip_all)]
	pub fn install_with_picker(document: Document, config: Rc<EditorConfig>) -> Result<Rc<Self>, DomError> {
		let shell = Self::install(document, config)?;

		let open_button = create_button(&shell.document, OPEN_BUTTON_ID, &shell.config.open_label)?;
		shell
			.document
			.body()
			.ok_or_else(|| DomError::new("document.body", JsValue::from_str("The page has no body.")))?
			.append_child(&open_button)
			.map_err(DomError::during("appendChild"))?;

		let mut listeners = EventListeners::new(open_button.into());
		let weak = Rc::downgrade(&shell);
		listeners.on("click", move |_| with_shell(&weak, Self::open))?;
		shell.button_listeners.borrow_mut().push(listeners);
		Ok(shell)
	}

	/// Shows the file picker and starts a session on the chosen file.
	///
	/// Cancelling leaves everything as it was.
	pub fn open(self: &Rc<Self>) {
		let shell = Rc::clone(self);
		spawn_local(async move {
			let file = match pick_html_file(&shell.config).await {
				Ok(Some(file)) => file,
				Ok(None) => return,
				Err(error) => {
					error!("Could not open a file: {}", error);
					return shell.alert(&format!("Could not open a file: {}", error));
				}
			};
			let session = match Session::open(file, Rc::clone(&shell.config)).await {
				Ok(session) => session,
				Err(error) => return error!("Could not read the file: {}", error),
			};
			if let Err(error) = shell.start(session) {
				error!("Could not enable editing: {}", error);
			}
		});
	}
}

fn with_shell<F>(weak: &Weak<Shell<F>>, f: impl FnOnce(&Rc<Shell<F>>)) {
	match weak.upgrade() {
		Some(shell) => f(&shell),
		None => trace!("Event after the shell was dropped."),
	}
}

fn event_node(event: &Event) -> Option<Node> {
	event.target().and_then(|target| target.dyn_into::<Node>().ok())
}

fn create_button(document: &Document, id: &str, label: &str) -> Result<HtmlElement, DomError> {
	let button = document
		.create_element("button")
		.map_err(DomError::during("createElement"))?
		.dyn_into::<HtmlElement>()
		.map_err(|element| DomError::new("createElement", element.into()))?;
	button.set_id(id);
	button.set_text_content(Some(label));
	Ok(button)
}

fn style_sheet(config: &EditorConfig) -> String {
	format!(
		"\
.{highlight} {{
	background: #fff3cd !important;
	outline: 2px solid #ffc107 !important;
}}
#{open}, #{save} {{
	position: fixed;
	right: 20px;
	z-index: 99999;
	padding: 12px 24px;
	color: white;
	border: none;
	border-radius: 4px;
	cursor: pointer;
	box-shadow: 0 4px 8px rgba(0, 0, 0, 0.2);
}}
#{open} {{
	top: 20px;
	background: #2196f3;
}}
#{save} {{
	bottom: 20px;
	background: #4caf50;
	display: none;
}}
",
		highlight = config.highlight_class,
		open = OPEN_BUTTON_ID,
		save = SAVE_BUTTON_ID,
	)
}
