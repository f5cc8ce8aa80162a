pub mod process_serial;
pub mod server;
