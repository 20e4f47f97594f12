//! Domain model for the quote collection.
//!
//! # Responsibility
//! - Define the canonical quote record shared by storage, transfer and sync.
//! - Own the category labels every layer agrees on.
//!
//! # Invariants
//! - Every stored quote has non-empty `text` and `category`.
//! - Quote ids are unique within one local collection.

pub mod quote;
