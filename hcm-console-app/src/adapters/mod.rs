//! 传输层适配器

#[cfg(feature = "http-transport")]
mod http_transport;

#[cfg(feature = "http-transport")]
pub use http_transport::HttpTransport;
