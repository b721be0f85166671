pub mod geometry_model;
pub mod mapper;
