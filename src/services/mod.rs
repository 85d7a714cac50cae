// Service exports
pub mod resolver;
pub mod upstream;

pub use resolver::{ResolveError, ResourceResolver, ResourceSource};
pub use upstream::{InvokeError, UpstreamClient};

use crate::config::UpstreamSettings;
use reqwest::Client;

/// Build the HTTP client shared by every outbound call
pub fn http_client(settings: &UpstreamSettings) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(settings.connect_timeout())
        .build()
}
