pub mod frame;
pub mod state;
