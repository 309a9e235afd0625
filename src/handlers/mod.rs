pub mod auth;
pub mod convert;
