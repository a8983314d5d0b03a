pub mod objects;
pub mod signature;

#[cfg(feature = "client")]
pub mod client;
