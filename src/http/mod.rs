//! HTTP adapter
//!
//! Decodes requests, calls into the stores and encodes responses. All
//! transport concerns (content types, status codes, redirects, basic auth)
//! live here; the stores never see raw payloads.

pub mod admin;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
