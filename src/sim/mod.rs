pub mod assets;
pub mod event;
pub mod level;
pub mod ports;
pub mod rng;
pub mod session;
pub mod step;
pub mod world;
