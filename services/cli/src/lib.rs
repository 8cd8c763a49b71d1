mod cli;
mod commands;
mod infra;
mod render;

use ce_tracker::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
