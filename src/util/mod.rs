pub mod colors;
pub mod date;
pub mod hook;
pub mod log;
pub mod notify;
pub mod task;
