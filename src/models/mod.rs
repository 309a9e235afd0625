pub mod conversion;
pub mod user;
