//! Typed route contract shared by the RPC server and its clients.
//!
//! A [`RouteTree`] of [`Procedure`] descriptors is the single source of truth.
//! Server bindings and client endpoints are both derived from it with
//! [`RouteTree::map`], so a path exists on one side exactly when it exists on
//! the other and carries the same input and output types.

#![forbid(unsafe_code)]

mod procedure;
/// Procedures exposed by the Launchpad API.
pub mod routes;
mod tree;

pub use procedure::{OperationDescriptor, OperationKind, Procedure};
pub use routes::app_contract;
pub use tree::{RouteNode, RouteTree, Shape};
