//! Madang line chat server library.
//!
//! A multi-client TCP chat server speaking newline-delimited UTF-8. Every line a client sends
//! after its display name is relayed verbatim to all connected clients, together with a roster
//! control line (`[USER_LIST] ...`) whenever membership changes.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
