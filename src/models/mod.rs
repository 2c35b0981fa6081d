pub mod planning_model;
pub mod registration_model;
