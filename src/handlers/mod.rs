pub(crate) mod live;
pub(crate) mod proxy;
pub(crate) mod schedule;
pub(crate) mod session;
