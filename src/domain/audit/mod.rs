//! Connection audit: hourly event counts and their daily rollups

pub mod dto;
pub mod error;
pub mod model;
pub mod query;
pub mod service;
