//! Token primitives shared by the devcommunity services.

pub mod jwt;

pub use jwt::{Claims, JwtError, JwtKeys};
