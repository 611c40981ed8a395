pub mod announce;
pub mod hub;
