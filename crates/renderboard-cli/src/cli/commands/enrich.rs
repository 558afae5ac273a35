use std::io::{BufWriter, Write};

use super::{date_filter, exit_codes, open_loader};
use crate::cli::args::EnrichArgs;
use anyhow::{Context, Result};
use renderboard_core::config::DashboardConfig;

pub fn run(cfg: &DashboardConfig, args: EnrichArgs) -> Result<i32> {
    let table = open_loader(cfg)?.load(&args.query.to_query())?;
    let rows = table.filter(&date_filter(&args.dates));

    let sink: Box<dyn Write> = match &args.out {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut out = BufWriter::new(sink);
    for row in rows.iter() {
        serde_json::to_writer(&mut out, row)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    if let Some(path) = &args.out {
        eprintln!("wrote {} rows to {}", rows.len(), path.display());
    }
    Ok(if rows.is_empty() {
        exit_codes::NO_DATA
    } else {
        exit_codes::OK
    })
}
