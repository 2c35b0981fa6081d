pub mod export_handler;
pub mod planning_handler;
