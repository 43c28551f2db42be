pub mod detector;
pub mod timer;
