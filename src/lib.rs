pub mod backend;
pub mod cli;
pub mod console;
pub mod geometry;
pub mod gesture;
pub mod hierarchy;
pub mod overlay;
pub mod refresh;
pub mod session;
pub mod trace;
