pub mod generator;
pub mod handlers;
pub mod progress;
pub mod prompts;
pub mod quiz;
pub mod store;
