pub mod api_server;
pub mod http_fetcher;

pub use api_server::start_api_server;
pub use http_fetcher::{HttpFetcher, PageFetcher};
