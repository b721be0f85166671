pub mod classifier;
pub mod gesture_model;
pub mod pointer;
