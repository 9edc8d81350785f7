pub mod pid;
pub mod time;
