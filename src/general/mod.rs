pub mod check;
pub mod relay;
pub mod session;
pub mod stdin_handler;
