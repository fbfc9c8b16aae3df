//! Fitz - Document-independent infrastructure
//!
//! Geometry, the link model and the error type shared by the PDF layer.

pub mod error;
pub mod geometry;
pub mod link;
