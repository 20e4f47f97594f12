//! Repository layer over key-value persistence.
//!
//! # Responsibility
//! - Map typed quote state onto the fixed store keys.
//! - Isolate JSON encoding details from services and sync orchestration.
//!
//! # Invariants
//! - Write paths validate every quote before persisting.
//! - Read paths reject corrupt persisted state instead of masking it.

pub mod quote_repo;
