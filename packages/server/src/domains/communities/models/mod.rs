pub mod community;

pub use community::Community;
