pub mod commands;
pub mod logging;
pub mod process_command;
pub mod report_formatter;
