pub mod duty_service;
pub mod seed;
pub mod validation;

mod duty_service_tests;
