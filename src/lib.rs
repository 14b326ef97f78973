pub mod autopilot;
pub mod constants;
pub mod engine;
pub mod grid;
pub mod motion;
pub mod rng;
pub mod types;
