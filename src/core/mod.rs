//! Infrastructure: persistence adapters

pub mod persistence;
