pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod notify;
pub mod parity;
pub mod reminder;
pub mod resolve;
pub mod settings;
pub mod store;
pub mod tip;

pub use error::{Result, TipError};
pub use tip::TomorrowTip;
