//! Catalogue API clients

pub mod api_client;
pub mod export_client;
pub mod export_poller;
pub mod import_client;
pub mod service_client;
