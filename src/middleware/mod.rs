pub mod auth;
pub mod request_counter;
pub mod security_headers;

pub use request_counter::RequestCounter;
pub use security_headers::SecurityHeaders;
