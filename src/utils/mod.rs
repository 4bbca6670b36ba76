pub mod hex;
pub mod mock;
