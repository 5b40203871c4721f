//! Application layer: service orchestration on top of the domain traits.

pub mod services;
