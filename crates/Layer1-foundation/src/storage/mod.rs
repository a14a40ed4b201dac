//! Storage module for Shadow
//!
//! - `json`: JSON file store for settings

mod json;

pub use json::JsonStore;
