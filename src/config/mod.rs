//! Configuration management: user settings and input documents

mod document;
mod settings;

pub use document::Document;
pub use settings::Settings;
