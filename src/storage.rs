use std::{cell::RefCell, collections::HashMap, rc::Rc};

pub static KEY_PREFIX: &str = "watchwith";

/// String key-value persistence. The browser implementation is local storage,
/// tests and the host build use [`MemoryStore`].
pub trait KeyValueStore {
	fn get_raw(&self, key: &str) -> Option<String>;
	fn set_raw(&self, key: &str, value: String) -> Result<(), StorageError>;
	fn delete(&self, key: &str);
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StorageError {
	#[error("storage is unavailable: {0}")]
	Unavailable(String),
	#[error("failed to encode {key}: {reason}")]
	Encoding { key: String, reason: String },
}

pub fn scoped_key(id: &str) -> String {
	format!("{KEY_PREFIX}.{id}")
}

#[derive(Clone, Default)]
pub struct MemoryStore(Rc<RefCell<HashMap<String, String>>>);

impl KeyValueStore for MemoryStore {
	fn get_raw(&self, key: &str) -> Option<String> {
		self.0.borrow().get(key).cloned()
	}

	fn set_raw(&self, key: &str, value: String) -> Result<(), StorageError> {
		self.0.borrow_mut().insert(key.to_owned(), value);
		Ok(())
	}

	fn delete(&self, key: &str) {
		self.0.borrow_mut().remove(key);
	}
}

#[cfg(target_family = "wasm")]
pub use browser::BrowserStore;

#[cfg(target_family = "wasm")]
mod browser {
	use super::{KeyValueStore, StorageError};
	use gloo_storage::{LocalStorage, Storage};

	#[derive(Clone, Copy, Default)]
	pub struct BrowserStore;

	impl KeyValueStore for BrowserStore {
		fn get_raw(&self, key: &str) -> Option<String> {
			LocalStorage::get::<String>(key).ok()
		}

		fn set_raw(&self, key: &str, value: String) -> Result<(), StorageError> {
			LocalStorage::set(key, value).map_err(|err| StorageError::Unavailable(format!("{err:?}")))
		}

		fn delete(&self, key: &str) {
			LocalStorage::delete(key);
		}
	}
}

/// The store the app persists into on the current platform.
pub fn default_store() -> Rc<dyn KeyValueStore> {
	#[cfg(target_family = "wasm")]
	{
		Rc::new(BrowserStore)
	}
	#[cfg(not(target_family = "wasm"))]
	{
		Rc::new(MemoryStore::default())
	}
}
