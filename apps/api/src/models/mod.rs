pub mod module;
pub mod progress;
