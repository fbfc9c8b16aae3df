//! PDF object model, destination resolution and link handling

pub mod action;
pub mod file_spec;
pub mod link;
pub mod link_uri;
pub mod memory;
pub mod object;
pub mod page;
pub mod store;
