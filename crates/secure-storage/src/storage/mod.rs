//! Storage backends and the encrypting facade
//!
//! Backends implement [`KeyValueStore`] and only ever see ciphertext:
//! 1. In-memory store (browser-style local storage, optional quota)
//! 2. JSON file store (persistent, atomic rewrites)
//!
//! [`SecureLocalStorage`] sits on top of any backend.

mod traits;
mod memory;
mod file;
mod secure;

pub use traits::KeyValueStore;
pub use memory::MemoryStore;
pub use file::FileStore;
pub use secure::SecureLocalStorage;
