//! Role-based access policy for the text API.

pub mod policy;
