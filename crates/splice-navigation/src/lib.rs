//! Splice Navigation Primitives
//!
//! Logical navigation state lives in the document hash:
//! - `https://app.example/#/documents/?page=2` shows `/documents/?page=2`
//! - the real document path and query never change
//!
//! This crate holds the pure pieces of the navigation core: location
//! normalization, hash history URLs, form action merging, the request
//! throttle window and the per-attempt state machine.

mod error;
mod history;
mod location;
mod state;
mod throttle;

pub use error::NavigationError;
pub use history::{hash_location, hash_url, merge_form_action, request_location, FormTarget};
pub use location::{normalize_location, path_and_query};
pub use state::NavigationState;
pub use throttle::{Admission, RequestWindow};

pub type Result<T> = std::result::Result<T, NavigationError>;
