//! One module per subcommand.

pub mod batch;
pub mod convert;
pub mod doctor;
pub mod files;
pub mod manifest;
pub mod pages;
pub mod probe;
pub mod tiles;
pub mod users;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use tilectl_config::ApiConfig;
use tilectl_probe::{ApiClient, ClientOptions};

/// Build an HTTP client from the `[api]` configuration section.
pub fn api_client(api: &ApiConfig) -> Result<ApiClient> {
    let options = ClientOptions {
        timeout: std::time::Duration::from_secs(api.timeout_secs),
        accept_invalid_certs: api.accept_invalid_certs,
        token: api.token.clone(),
    };
    ApiClient::new(&api.base_url, &options).or_raise(|| ErrorKind::Api)
}
