use html_inplace_editor::{
	config::Serialization,
	reconcile::{reconcile, Rendered},
	Address, EditorConfig,
};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

use web_support_::{init_log, parse, select, select_all};

const ORIGINAL: &str = "<!DOCTYPE html>\n<html><head><title>Notes</title></head><body><div><p>Hello</p><p>World</p></div></body></html>";

fn address(s: &str) -> Address {
	s.parse().unwrap()
}

#[wasm_bindgen_test]
fn second_paragraph() {
	init_log();
	let target = address("/html/body/div/p[2]");
	let rendered = reconcile(ORIGINAL, [(&target, "Bye")], &EditorConfig::default()).unwrap();
	assert_eq!(
		rendered,
		Rendered {
			text: "<!DOCTYPE html>\n<html><head><title>Notes</title></head><body><div><p>Hello</p><p>Bye</p></div></body></html>".to_owned(),
			applied: 1,
			missed: 0,
		}
	);
}

#[wasm_bindgen_test]
fn untouched_markup_survives() {
	init_log();
	let original = r#"<!DOCTYPE html>
<html lang="en"><head><meta charset="utf-8"><style>p { color: red; }</style></head>
<body>
	<h1 class="title" data-x="1">Title</h1>
	<ul>
		<li><a href="a.html">A</a></li>
		<li>B</li>
	</ul>
	<script>document.body.className = "scripted";</script>
</body></html>"#;
	let target = address("/html/body/ul/li[2]");
	let rendered = reconcile(original, [(&target, "<em>b</em>")], &EditorConfig::default()).unwrap();

	let before = parse(original);
	let after = parse(&rendered.text);
	assert_eq!(select(&after, "li:nth-of-type(2)").inner_html(), "<em>b</em>");
	assert_eq!(select(&after, "h1").outer_html(), select(&before, "h1").outer_html());
	assert_eq!(select(&after, "li").outer_html(), select(&before, "li").outer_html());
	assert_eq!(select(&after, "head").outer_html(), select(&before, "head").outer_html());
	assert_eq!(select(&after, "script").outer_html(), select(&before, "script").outer_html());
	assert!(!rendered.text.contains("class=\"scripted\""), "Scripts must not run.");
	assert!(rendered.text.starts_with("<!DOCTYPE html>\n<html lang=\"en\">"));
}

#[wasm_bindgen_test]
fn content_is_parsed_into_nodes() {
	init_log();
	let target = address("/html/body/div/p");
	let rendered = reconcile(ORIGINAL, [(&target, "a <b>bold</b> <i>move</i>")], &EditorConfig::default()).unwrap();
	let document = parse(&rendered.text);
	let paragraph = select(&document, "p");
	assert_eq!(paragraph.child_element_count(), 2);
	assert_eq!(paragraph.text_content().unwrap(), "a bold move");
}

#[wasm_bindgen_test]
fn misses_are_skipped() {
	init_log();
	let missing = address("/html/body/div/p[5]");
	let present = address("/html/body/div/p");
	let rendered = reconcile(ORIGINAL, [(&missing, "lost"), (&present, "Hi")], &EditorConfig::default()).unwrap();
	assert_eq!(rendered.applied, 1);
	assert_eq!(rendered.missed, 1);
	assert!(rendered.text.contains("<p>Hi</p><p>World</p>"));
	assert!(!rendered.text.contains("lost"));
}

#[wasm_bindgen_test]
fn later_edits_win() {
	init_log();
	let div = address("/html/body/div");
	let paragraph = address("/html/body/div/p[2]");
	let rendered = reconcile(ORIGINAL, [(&div, "<p>Hello</p><p>Old</p>"), (&paragraph, "New")], &EditorConfig::default()).unwrap();
	assert!(rendered.text.contains("<div><p>Hello</p><p>New</p></div>"));
	assert_eq!(rendered.applied, 2);
}

#[wasm_bindgen_test]
fn no_edits() {
	init_log();
	let rendered = reconcile(ORIGINAL, Vec::<(&Address, &str)>::new(), &EditorConfig::default()).unwrap();
	assert_eq!(rendered.text, ORIGINAL);
	assert_eq!((rendered.applied, rendered.missed), (0, 0));
}

#[wasm_bindgen_test]
fn xml_serialization() {
	init_log();
	let config = EditorConfig {
		serialization: Serialization::Xml,
		..EditorConfig::default()
	};
	let target = address("/html/body/div/p[2]");
	let rendered = reconcile(ORIGINAL, [(&target, "Bye<br>")], &config).unwrap();
	assert!(rendered.text.starts_with("<!DOCTYPE html>\n<html xmlns=\"http://www.w3.org/1999/xhtml\">"), "{}", rendered.text);
	assert!(rendered.text.contains("<p>Bye<br /></p>"), "{}", rendered.text);
}

#[wasm_bindgen_test]
fn custom_doctype() {
	init_log();
	let config = EditorConfig {
		doctype: "<!doctype html>\r\n".to_owned(),
		..EditorConfig::default()
	};
	let rendered = reconcile("<p>x</p>", Vec::<(&Address, &str)>::new(), &config).unwrap();
	assert_eq!(rendered.text, "<!doctype html>\r\n<html><head></head><body><p>x</p></body></html>");
	assert_eq!(select_all(&parse(&rendered.text), "p").len(), 1);
}
