//! Type definitions

pub mod export;
pub mod import;
pub mod notification;
pub mod service;

pub use export::*;
pub use import::*;
pub use notification::*;
pub use service::*;
