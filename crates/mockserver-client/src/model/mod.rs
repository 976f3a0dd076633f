//! Data model of the MockServer REST API.
//!
//! Every type serializes to the JSON shape the server expects, omitting unset
//! optional fields, and accepts the shorthand forms the server itself emits.

mod action;
mod body;
mod collections;
mod control;
mod expectation;
mod request;
mod timing;

pub use action::{HttpError, HttpForward, HttpResponse, HttpTemplate, Scheme, TemplateType};
pub use body::{Body, BodyContent, BodyKind, BodyType, MatchType};
pub use collections::{Cookies, KeyToMultiValue, KeyToValue, MultiValueMap};
pub use control::{ClearType, Ports, RetrieveType};
pub use expectation::{Action, Expectation, Verification, VerificationSequence};
pub use request::HttpRequest;
pub use timing::{Delay, TimeToLive, TimeUnit, Times, VerificationTimes};
