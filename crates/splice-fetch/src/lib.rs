//! Splice Fragment Fetching
//!
//! The navigation core issues requests through the [`Fetcher`] trait and
//! receives each outcome later as a [`Completion`]. Every request can be
//! aborted through its [`RequestHandle`]; an aborted request completes with
//! [`FetchError::Aborted`] so callers can tell self-inflicted cancellation
//! apart from a real network failure.

mod error;
mod fetcher;
mod http;

pub use error::FetchError;
pub use fetcher::{
    Completion, FetchRequest, FetchResponse, Fetcher, Method, RequestHandle, RequestId,
};
pub use http::ReqwestFetcher;

pub type Result<T> = std::result::Result<T, FetchError>;
