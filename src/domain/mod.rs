pub mod duty;
pub mod error;
pub mod repository;
