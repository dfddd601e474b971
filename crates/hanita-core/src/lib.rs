//! # Hanita Core
//!
//! Event model and wire decoder for the Hanita session-history service.
//!
//! Clients report when a user enters or quits a shared space by sending one
//! JSON object per TCP chunk:
//!
//! ```text
//! { "user_id": 355, "action": "enter", "timestamp": 34523.23322 }
//! ```
//!
//! ## Key Types
//!
//! - [`SessionEvent`]: A decoded event that has not been stored yet
//! - [`EventRecord`]: A stored event with its assigned [`EventId`]
//! - [`Action`]: The closed set of session transitions
//! - [`RejectionReason`]: Why a payload could not be decoded
//!
//! ## Example
//!
//! ```rust
//! use hanita_core::{decode, RejectionReason};
//!
//! let event = decode(br#"{"user_id":355,"action":"enter","timestamp":34523.23322}"#).unwrap();
//! assert_eq!(event.user_id, 355);
//! assert_eq!(event.action, "enter");
//!
//! assert!(matches!(decode(b"not json at all"), Err(RejectionReason::MalformedJson(_))));
//! ```

pub mod decoder;
pub mod error;
pub mod event;

pub use decoder::{decode, REQUIRED_FIELDS};
pub use error::{RejectionReason, UnknownAction};
pub use event::{Action, EventId, EventRecord, SessionEvent};
