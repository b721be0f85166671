pub mod hierarchy_model;
pub mod index;
pub mod parser;
