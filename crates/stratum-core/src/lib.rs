//! Stratum Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Stratum parser and
//! graph pipeline. It includes:
//!
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Model**: Typed elements, relationships and layers ([`model`] module)
//! - **Diagnostics**: Warnings and validation errors with codes ([`diagnostic`] module)

pub mod diagnostic;
pub mod geometry;
pub mod model;
