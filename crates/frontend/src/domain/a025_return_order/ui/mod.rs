pub mod page;
pub mod panels;
pub mod view_model;

pub use page::ReturnWorkflowPage;
