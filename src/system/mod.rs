pub mod collector;
pub mod derive;
pub mod platform;
pub mod process;
pub mod sampler;
pub mod snapshot;
