//! Splice DOM Layer
//!
//! Everything the navigation core needs from a page goes through the
//! [`DomBridge`] trait: reading and replacing the content region, history,
//! cursor, toasts and the refresh spinner. Browser bindings and the
//! in-memory [`HeadlessDom`] both implement it.
//!
//! Interaction is delegated: hosts describe each click or submission as a
//! snapshot ([`AnchorClick`], [`FormSubmission`]) and the [`Interceptor`]
//! decides whether the navigation core takes it over.

mod bridge;
mod error;
mod headless;
mod interceptor;
mod refresh;
mod renderer;

pub use bridge::{ContentEvent, Cursor, DomBridge, WarningToast};
pub use error::DomError;
pub use headless::{HeadlessDom, HeadlessState, HistoryEntry};
pub use interceptor::{
    AnchorAction, AnchorClick, FormMethod, FormSubmission, Interceptor, Modifiers,
};
pub use refresh::RefreshLock;
pub use renderer::ContentRenderer;

pub type Result<T> = std::result::Result<T, DomError>;
