#![deny(missing_debug_implementations)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # sa-entities
//!
//! Reusable, agnostic domain entities for Shareabouts.
//!
//! The entities only contain generic functionality that does not reveal any application-specific business logic.

pub mod action;
pub mod api_key;
pub mod attachment;
pub mod data_index;
pub mod dataset;
pub mod geometry;
pub mod group;
pub mod id;
pub mod permission;
pub mod submission_set;
pub mod thing;
pub mod time;
pub mod user;

#[cfg(any(test, feature = "builders"))]
pub mod builders;
