//! Core processing building blocks: the injectable execution context,
//! pipeline parameters, and the filtering/fusion stages. These are internal
//! primitives consumed by the high-level `api` module.
pub mod exec;
pub mod params;
pub mod processing;
