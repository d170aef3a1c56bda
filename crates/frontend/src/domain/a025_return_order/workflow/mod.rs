pub mod actions;
pub mod controller;
pub mod error;
pub mod form;
pub mod guard;
pub mod state;

pub use controller::WorkflowController;
pub use error::WorkflowError;
pub use state::{Step, WorkflowState};
