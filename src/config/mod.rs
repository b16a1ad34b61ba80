pub mod settings;

pub use settings::{ApiSettings, PollingSettings, Settings};
