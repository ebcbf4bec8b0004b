//! # IO Module
//!
//! The adapter layer between HTTP clients and the domain services. It
//! translates requests into domain calls and domain results (including
//! typed errors) into JSON responses with matching status codes.
//!
//! ## Current Implementation
//!
//! - **Web Framework**: Axum, with services injected through router state
//! - **Serialization**: Serde JSON for bodies, query strings for list parameters
//! - **Error Handling**: `DomainError` mapped to a single `ErrorResponse` body shape

pub mod rest;

pub use rest::*;
