/// External API clients
///
/// `client` holds the transport and retry plumbing; `stonfi` is the typed
/// STON.fi REST client built on top of it.
pub mod client;
pub mod stonfi;

pub use client::{
    ApiRequest, HttpMethod, QueryParams, RawResponse, ReqwestTransport, RetryPolicy, Transport,
    TransportFailure,
};
pub use stonfi::StonfiClient;
