//! Return order workflow: search, create, SR number, preview, confirm

pub mod api;
pub mod ui;
pub mod workflow;
