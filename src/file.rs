//! Access to the document file.
//!
//! [`FileHandle`] wraps a [***FileSystemFileHandle***](https://developer.mozilla.org/en-US/docs/Web/API/FileSystemFileHandle)
//! obtained from [***showOpenFilePicker***](https://developer.mozilla.org/en-US/docs/Web/API/Window/showOpenFilePicker).
//! The picker isn't part of the stable `web-sys` surface, so the few members used here are bound directly.

use crate::{
	config::EditorConfig,
	error::{FileError, OpenError},
};
use js_sys::{Array, Object, Promise, Reflect};
use tracing::{info, instrument, trace, warn};
use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, DomException};

#[wasm_bindgen]
extern "C" {
	#[wasm_bindgen(catch, js_name = showOpenFilePicker)]
	fn show_open_file_picker(options: &Object) -> Result<Promise, JsValue>;

	#[derive(Debug, Clone)]
	#[wasm_bindgen(js_name = FileSystemFileHandle)]
	type RawFileHandle;

	#[wasm_bindgen(method, getter)]
	fn name(this: &RawFileHandle) -> String;

	#[wasm_bindgen(catch, method, js_name = getFile)]
	fn get_file(this: &RawFileHandle) -> Result<Promise, JsValue>;

	#[wasm_bindgen(catch, method, js_name = createWritable)]
	fn create_writable(this: &RawFileHandle) -> Result<Promise, JsValue>;

	#[derive(Debug)]
	#[wasm_bindgen(js_name = FileSystemWritableFileStream)]
	type WritableFileStream;

	#[wasm_bindgen(catch, method)]
	fn write(this: &WritableFileStream, data: &str) -> Result<Promise, JsValue>;

	#[wasm_bindgen(catch, method)]
	fn close(this: &WritableFileStream) -> Result<Promise, JsValue>;

	#[wasm_bindgen(catch, method)]
	fn abort(this: &WritableFileStream) -> Result<Promise, JsValue>;
}

/// The file a session reads its snapshot from and writes its result to.
///
/// Implementations must make [`SourceFile::write_text`] all-or-nothing: Either the whole text replaces the file's content, or the file is left as it was.
#[allow(async_fn_in_trait)] // Single-threaded.
pub trait SourceFile: Clone {
	/// A name for log messages.
	fn name(&self) -> String;

	/// # Errors
	async fn read_text(&self) -> Result<String, FileError>;

	/// # Errors
	async fn write_text(&self, text: &str) -> Result<(), FileError>;
}

#[derive(Debug, Clone)]
pub struct FileHandle(RawFileHandle);

impl SourceFile for FileHandle {
	fn name(&self) -> String {
		self.0.name()
	}

	#[instrument(skip(self), fields(name = %self.0.name()))]
	async fn read_text(&self) -> Result<String, FileError> {
		let file = settle(self.0.get_file()).await.map_err(FileError::Read)?;
		let text = settle(Ok(file.unchecked_into::<Blob>().text())).await.map_err(FileError::Read)?;
		let text = text.as_string().ok_or(FileError::NotText)?;
		trace!(length = text.len(), "Read file.");
		Ok(text)
	}

	/// Writes into a swap file that replaces the original only once the stream closes.
	#[instrument(skip(self, text), fields(name = %self.0.name(), length = text.len()))]
	async fn write_text(&self, text: &str) -> Result<(), FileError> {
		let stream: WritableFileStream = settle(self.0.create_writable()).await.map_err(FileError::Write)?.unchecked_into();
		if let Err(error) = settle(stream.write(text)).await {
			if let Err(abort_error) = settle(stream.abort()).await {
				warn!("Could not abort the failed write: {:?}", abort_error);
			}
			return Err(FileError::Write(error));
		}
		settle(stream.close()).await.map_err(FileError::Close)?;
		trace!("Wrote file.");
		Ok(())
	}
}

async fn settle(promise: Result<Promise, JsValue>) -> Result<JsValue, JsValue> {
	JsFuture::from(promise?).await
}

/// Asks the user for one HTML file.
///
/// Cancelling the picker is not an error and resolves to `Ok(None)`.
///
/// # Errors
///
/// Iff the browser has no file picker, or it fails for any reason other than being dismissed.
#[instrument(skip(config))]
pub async fn pick_html_file(config: &EditorConfig) -> Result<Option<FileHandle>, OpenError> {
	let global = js_sys::global();
	if !Reflect::has(&global, &"showOpenFilePicker".into()).unwrap_or(false) {
		return Err(OpenError::Unsupported);
	}

	let options = picker_options(config).map_err(FileError::Picker)?;
	let handles = match settle(show_open_file_picker(&options)).await {
		Ok(handles) => handles,
		Err(error) if is_abort(&error) => {
			info!("File selection was cancelled.");
			return Ok(None);
		}
		Err(error) => return Err(FileError::Picker(error).into()),
	};

	let handle = handles.unchecked_into::<Array>().get(0);
	if handle.is_undefined() {
		info!("No file was selected.");
		return Ok(None);
	}
	let handle = FileHandle(handle.unchecked_into());
	info!(name = %handle.name(), "Opened file.");
	Ok(Some(handle))
}

fn is_abort(error: &JsValue) -> bool {
	error.dyn_ref::<DomException>().map_or(false, |exception| exception.name() == "AbortError")
}

fn picker_options(config: &EditorConfig) -> Result<Object, JsValue> {
	let extensions: Array = config.picker_extensions.iter().map(|extension| JsValue::from_str(extension)).collect();
	let accept = Object::new();
	Reflect::set(&accept, &"text/html".into(), &extensions)?;

	let file_type = Object::new();
	Reflect::set(&file_type, &"description".into(), &config.picker_description.as_str().into())?;
	Reflect::set(&file_type, &"accept".into(), &accept)?;

	let options = Object::new();
	Reflect::set(&options, &"types".into(), &Array::of1(&file_type))?;
	Reflect::set(&options, &"multiple".into(), &JsValue::FALSE)?;
	Ok(options)
}
