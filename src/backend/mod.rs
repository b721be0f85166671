pub mod backend_model;
pub mod http;
pub mod traits;
