pub mod error;
pub mod page;
pub mod session;
pub mod symbols;
