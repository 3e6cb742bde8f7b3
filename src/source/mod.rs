//! Upstream list source module
//!
//! Supports: in-memory fixtures, Kubernetes-style HTTP list APIs
//!
//! # Overview
//!
//! A [`ListSource`] accepts an optional validated continue token and a page
//! size, and returns one page of items plus the next continue token (or
//! nothing once the listing is exhausted). Tokens are issued and expired by
//! the source; this crate never interprets them.

mod kube;
mod memory;
mod types;

pub use kube::KubeListSource;
pub use memory::InMemoryListSource;
pub use types::{ListPage, ListQuery, ListSource};

#[cfg(test)]
mod tests;
