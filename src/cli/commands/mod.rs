pub mod migrate;
pub mod status;
pub mod token;
pub mod trigger;
