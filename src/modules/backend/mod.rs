pub mod controller;
pub mod routes;

pub use routes::backend_routes;
