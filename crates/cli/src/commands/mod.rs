pub mod catalog;
pub mod predict;
pub mod report;
