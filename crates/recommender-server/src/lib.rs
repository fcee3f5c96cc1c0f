//! HTTP service and CLI around the `recommender` library.

pub mod cli;
pub mod gateway;
