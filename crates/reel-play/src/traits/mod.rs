//! Collaborator interfaces implemented by the host.

pub mod engine;
pub mod surface;
