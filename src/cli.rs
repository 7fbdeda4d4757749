//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; single route table dispatches to the registry.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{BatchLine, Cli, Commands};
pub use presentation::{
    format_change, format_history_result, format_log_result, format_scan_result,
    format_tags_result, ScanRow,
};
pub use route::RunContext;
