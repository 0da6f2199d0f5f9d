//! Authentication primitives.
//!
//! - [`jwt`] -- JWT access-token validation.
//!
//! Tokens are issued by the main platform API with the shared
//! `JWT_SECRET`; this service only validates them.

pub mod jwt;
