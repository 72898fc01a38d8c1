//! REST API access for the task tracker.
//!
//! - `transport`: request/response types and the reqwest-backed `Transport`
//! - `pipeline`: `AuthPipeline`, which attaches bearer credentials and
//!   performs one silent renewal per expired request
//! - `client`: `ApiClient`, typed task/user/login calls on top of the pipeline
//!
//! The API uses JWT bearer credentials issued by the login endpoint and
//! renewed through the token refresh endpoint.

pub mod client;
pub mod error;
pub mod pipeline;
pub mod transport;

pub use client::ApiClient;
pub use error::ApiError;
pub use pipeline::{AuthEndpoints, AuthPipeline};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, RetryState, Transport};
