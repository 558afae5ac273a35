use super::exit_codes;
use crate::cli::args::{GlobalArgs, InitArgs};
use anyhow::Result;
use renderboard_core::config::write_sample_config;

pub fn run(global: &GlobalArgs, args: InitArgs) -> Result<i32> {
    if global.config.exists() && !args.force {
        eprintln!(
            "{} already exists (use --force to overwrite)",
            global.config.display()
        );
        return Ok(exit_codes::CONFIG_ERROR);
    }
    write_sample_config(&global.config)?;
    eprintln!("wrote {}", global.config.display());
    Ok(exit_codes::OK)
}
