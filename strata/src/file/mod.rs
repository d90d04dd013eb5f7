//! Helpers for reading layer files into documents.

mod loader;
mod path;
mod write;

pub use loader::{Layer, Parent, load_chain, load_layer};
pub use path::{canonicalise, find_layer};
pub use write::write_atomic;

#[cfg(test)]
mod tests;
