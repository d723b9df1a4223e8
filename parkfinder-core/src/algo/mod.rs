//! Geospatial selection and zone classification.
//!
//! All functions here are pure: they borrow the snapshot, never write
//! back into it, and give the same answer for the same input.

pub mod classify;
pub mod nearest;
pub mod radius;
