//! Request authorization
//!
//! Stateless signed tokens scoped to an operation name, standing in for the
//! host application's nonce source.

pub mod token;

pub use token::TokenAuthority;
