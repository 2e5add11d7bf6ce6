pub mod billing;
pub mod repos;
