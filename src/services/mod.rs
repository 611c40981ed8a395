pub mod live;
pub mod schedule;
pub mod session;
pub mod timeline;
pub mod webhook;
