// Library exports for testing and external use

pub mod app;
pub mod dto;
pub mod middleware;
pub mod routes;
