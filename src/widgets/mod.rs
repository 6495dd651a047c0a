pub mod chrome;
pub mod form;
pub mod header;
pub mod result_viewer;
pub mod status_bar;
