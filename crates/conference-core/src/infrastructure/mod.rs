//! Infrastructure layer
//!
//! Concrete implementations of the domain's storage capabilities.

pub mod conference;
