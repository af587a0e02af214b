//! Core domain concepts shared across all subdomains.
//!
//! - [`brand::Brand`]: the brand whose visibility is tracked
//! - [`question::Question`]: a validated question to pose to the providers
//! - [`error::DomainError`]: domain-level errors

pub mod brand;
pub mod error;
pub mod question;
pub mod string;
