pub mod controller;
pub mod routes;

pub use routes::frontend_routes;
