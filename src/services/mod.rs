pub mod auth_service;
pub mod conversion_service;
pub mod rate_service;
