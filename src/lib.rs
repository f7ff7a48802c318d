//! Farm management REST API: producers, farms, crops, harvests and plantings,
//! with read-through caching and write-driven invalidation.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
