//! Business logic, independent of HTTP and storage details

pub mod audit;
