use html_inplace_editor::{EditorConfig, Session, Shell};
use std::rc::Rc;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{Event, EventInit, EventTarget};

wasm_bindgen_test_configure!(run_in_browser);

use web_support_::{init_log, next_tick, page, Fixture, MemoryFile};

#[allow(deprecated)] // `set_bubbles` needs a newer `web-sys`.
fn dispatch(target: &EventTarget, event_type: &str) {
	let mut init = EventInit::new();
	init.bubbles(true);
	let event = Event::new_with_event_init_dict(event_type, &init).unwrap();
	target.dispatch_event(&event).unwrap();
}

fn shell() -> Rc<Shell<MemoryFile>> {
	let config = EditorConfig {
		reload_after_save: false,
		..EditorConfig::default()
	};
	Shell::install(page(), Rc::new(config)).unwrap()
}

/// The live page's current markup, standing in for the file it was loaded from.
fn page_source() -> String {
	format!("<!DOCTYPE html>\n{}", page().document_element().unwrap().outer_html())
}

#[wasm_bindgen_test]
async fn double_click_edit_and_save() {
	init_log();
	let fixture = Fixture::new("<p>Hello</p><p>World</p>");
	let file = MemoryFile::new(&page_source());
	let shell = shell();
	assert!(!shell.has_session());
	shell.start(Session::new(file.clone(), file.text(), Rc::new(shell.config().clone()))).unwrap();
	assert!(shell.has_session());

	let second = fixture.select("p:nth-of-type(2)");
	dispatch(&second, "dblclick");
	assert_eq!(shell.pending(), 1);
	assert_eq!(second.content_editable(), "true");
	assert_eq!(shell.save_button().style().get_property_value("display").unwrap(), "block");

	second.set_inner_html("Bye");
	dispatch(&second, "input");

	shell.save();
	next_tick().await;

	assert_eq!(file.writes(), 1);
	assert!(file.text().contains("<p>Hello</p><p>Bye</p>"), "{}", file.text());
	assert!(!file.text().contains("World"));
	assert_eq!(shell.pending(), 0);
	assert_eq!(shell.save_button().style().get_property_value("display").unwrap(), "none");
	assert!(!second.class_list().contains("editable-highlight"));
	assert_ne!(second.content_editable(), "true");
}

#[wasm_bindgen_test]
async fn saving_without_edits_does_nothing() {
	init_log();
	let fixture = Fixture::new("<p>Hello</p>");
	let file = MemoryFile::new(&page_source());
	let shell = shell();

	shell.save();
	next_tick().await;
	assert_eq!(file.writes(), 0);

	shell.start(Session::new(file.clone(), file.text(), Rc::new(shell.config().clone()))).unwrap();
	dispatch(&fixture.select("p"), "dblclick");
	shell.save();
	next_tick().await;
	assert_eq!(file.writes(), 0);
	assert_eq!(shell.pending(), 1);
}

#[wasm_bindgen_test]
async fn failed_save_keeps_edits() {
	init_log();
	let fixture = Fixture::new("<h2>Title</h2>");
	let file = MemoryFile::new(&page_source());
	let shell = shell();
	shell.start(Session::new(file.clone(), file.text(), Rc::new(shell.config().clone()))).unwrap();

	let heading = fixture.select("h2");
	dispatch(&heading.first_child().unwrap(), "dblclick");
	heading.set_inner_html("Subtitle");
	dispatch(&heading, "input");

	file.set_failing(true);
	// Stub out the alert so the test doesn't block on it.
	js_sys::Reflect::set(&web_sys::window().unwrap(), &"alert".into(), &js_sys::Function::new_no_args("")).unwrap();
	shell.save();
	next_tick().await;
	assert_eq!(file.writes(), 0);
	assert_eq!(shell.pending(), 1);
	assert_eq!(shell.save_button().style().get_property_value("display").unwrap(), "block");

	file.set_failing(false);
	shell.save();
	next_tick().await;
	assert_eq!(file.writes(), 1);
	assert!(file.text().contains("<h2>Subtitle</h2>"));
}

#[wasm_bindgen_test]
async fn starting_again_discards_the_previous_session() {
	init_log();
	let fixture = Fixture::new("<li>one</li>");
	let file = MemoryFile::new(&page_source());
	let shell = shell();
	shell.start(Session::new(file.clone(), file.text(), Rc::new(shell.config().clone()))).unwrap();

	let item = fixture.select("li");
	dispatch(&item, "dblclick");
	assert_eq!(shell.pending(), 1);

	shell.start(Session::new(file.clone(), file.text(), Rc::new(shell.config().clone()))).unwrap();
	assert_eq!(shell.pending(), 0);
	assert!(!item.class_list().contains("editable-highlight"));

	// Only the new session's listeners are bound.
	dispatch(&item, "dblclick");
	assert_eq!(shell.pending(), 1);
}

#[wasm_bindgen_test]
async fn input_during_the_write_stays_pending() {
	init_log();
	let fixture = Fixture::new("<p>Hello</p><p>World</p>");
	let file = MemoryFile::new(&page_source());
	let shell = shell();
	shell.start(Session::new(file.clone(), file.text(), Rc::new(shell.config().clone()))).unwrap();

	let first = fixture.select("p");
	let second = fixture.select("p:nth-of-type(2)");
	dispatch(&first, "dblclick");
	first.set_inner_html("Hi");
	dispatch(&first, "input");

	// The file is rendered right away, but written only once this test yields.
	shell.save();
	dispatch(&second, "dblclick");
	second.set_inner_html("Late");
	dispatch(&second, "input");
	next_tick().await;

	assert_eq!(file.writes(), 1);
	assert!(file.text().contains("<p>Hi</p><p>World</p>"), "{}", file.text());
	assert_eq!(shell.pending(), 1);
	assert!(second.class_list().contains("editable-highlight"));
	assert!(!first.class_list().contains("editable-highlight"));
	assert_eq!(shell.save_button().style().get_property_value("display").unwrap(), "block");

	shell.save();
	next_tick().await;
	assert_eq!(file.writes(), 2);
	assert!(file.text().contains("<p>Hi</p><p>Late</p>"), "{}", file.text());
	assert_eq!(shell.pending(), 0);
	assert_eq!(shell.save_button().style().get_property_value("display").unwrap(), "none");
}
