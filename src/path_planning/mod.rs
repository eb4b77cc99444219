// Path Planning algorithms module

pub mod fillet;
pub mod forest;
pub mod sampler;
pub mod rrt;

pub use fillet::*;
pub use forest::*;
pub use sampler::*;
pub use rrt::*;
