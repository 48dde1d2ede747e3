pub mod endpoints;
pub mod envelope;

pub use endpoints::{EndpointError, Endpoints};
pub use envelope::{normalize_page, normalize_record, saved_record, Page};
