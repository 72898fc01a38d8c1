//! Client session management.
//!
//! `SessionStore` holds the access credential, the renewal credential and the
//! signed-in identity. It is populated at login, read by every outgoing
//! request, updated on silent renewal and cleared on logout or when renewal
//! fails.

pub mod session;

pub use session::{Identity, Session, SessionStore};
