pub mod export_handler;
pub mod report_handler;

pub use export_handler::*;
pub use report_handler::*;
