//! Adapters for the external stores of Shareabouts.

pub mod cache;
