// Middleware modules for the course portal backend

pub mod cors;

pub use cors::cors_middleware;
