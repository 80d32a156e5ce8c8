pub mod fresh;
pub mod progress_logger;
