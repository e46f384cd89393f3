pub mod repository;
pub mod usage;
