//! Common types and utilities for the Lyra runtime.
//!
//! This crate provides foundational pieces used across the workspace:
//! - Symbol interning (`Atom`, `Interner`)
//! - Decimal formatting for floating-point payloads (`numeric`)

// Symbol interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, Interner};

// Decimal formatting helpers for the print subsystem
pub mod numeric;
