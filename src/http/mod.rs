//! Transport seam.
//!
//! # Data Flow
//! ```text
//! external transport
//!     → request.rs (path, parameters, attributes)
//!     → [router dispatches to a handler]
//!     → response.rs (status, body) or a returned forward
//! ```

pub mod request;
pub mod response;

pub use request::{Request, SimpleRequest, MODULE_ATTRIBUTE};
pub use response::{Response, SimpleResponse};
