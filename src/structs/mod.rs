//! Typed data model: the parsed [`Container`](container::Container) and the
//! [`ModulationConfig`](config::ModulationConfig) that drives modulation.

pub mod config;
pub mod container;
