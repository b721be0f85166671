pub mod controller;
pub mod error;
pub mod status;
pub mod surface;
