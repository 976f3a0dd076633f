//! Client for the MockServer REST API.
//!
//! Register expectations, verify which requests a running MockServer has
//! received, retrieve recorded traffic, and control the server's lifecycle.
//!
//! ```no_run
//! use mockserver_client::{HttpRequest, HttpResponse, MockServerClient, Times, VerificationTimes};
//!
//! # async fn run() -> mockserver_client::Result<()> {
//! let client = MockServerClient::new("localhost", 1080)?;
//!
//! client
//!     .when(HttpRequest::get("/hello").with_header("Accept", "text/plain"))
//!     .times(Times::exactly(2))
//!     .respond(HttpResponse::ok().with_body("hello"))
//!     .await?;
//!
//! // ... exercise the system under test ...
//!
//! client
//!     .verify(&HttpRequest::get("/hello"), VerificationTimes::exactly(2))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! Synchronous callers use [`blocking::MockServerClient`], which has the same
//! operations.

// ===== Wire model and encoding =====
pub mod codec;
pub mod model;

// ===== Client =====
pub mod blocking;
pub mod config;
pub mod path;

mod chain;
mod client;
mod error;

pub use chain::ForwardChainExpectation;
pub use client::{MockServerClient, ServerResponse};
pub use config::{ClientConfig, PollPolicy};
pub use error::{ClientError, Result};
pub use model::{
    Action, Body, BodyContent, ClearType, Delay, Expectation, HttpError, HttpForward, HttpRequest,
    HttpResponse, HttpTemplate, Ports, RetrieveType, Scheme, TemplateType, TimeToLive, TimeUnit,
    Times, Verification, VerificationSequence, VerificationTimes,
};
