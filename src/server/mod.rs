//! HTTP integration: extractor, envelope responses and list route state

pub mod extract;
pub mod response;
pub mod route;

pub use extract::ListParams;
pub use route::ListRoute;
