pub mod buffer;
pub mod spike;
