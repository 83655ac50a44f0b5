pub mod duties;
