pub mod document;
pub mod loader;
