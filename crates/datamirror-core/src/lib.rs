pub mod config;
pub mod logging;

pub mod checksum;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod materialize;
pub mod progress;
pub mod registry;
pub mod url_model;
pub mod workdir;

pub use error::{MirrorError, MirrorResult};
pub use fetch::{CurlFetcher, FetchOptions, Fetcher};
pub use materialize::{materialize, render_tree, Materialized};
pub use registry::{DatasetDescriptor, Registry};
