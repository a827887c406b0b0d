//! REST API endpoint implementations.

mod exports;
mod request;
pub mod url_encoding;

pub use exports::{cancel_export, create_export, download_export, get_export_status};
pub use request::{REQUEST_ID_HEADER, send_request_with_retry};
pub use url_encoding::encode_path_segment;
