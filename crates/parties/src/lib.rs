//! Parties domain module (a salesperson's clients).
//!
//! This crate contains business rules for clients, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod client;

pub use client::{Client, ClientFilter, ClientId, ClientPatch, NewClient};
