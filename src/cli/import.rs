use std::path::Path;

use colored::Colorize;

use crate::cli::Context;
use crate::error::Result;
use crate::importer::{import_file, ImportResult};
use crate::rules::apply_all_rules;

pub fn run(ctx: &Context, files: &[String]) -> Result<()> {
    let conn = ctx.open_db()?;

    let mut total = ImportResult::default();
    for file in files {
        let result = import_file(&conn, Path::new(file))?;
        println!(
            "{file}: {} imported, {} skipped (already stored), {} duplicate rows, {} unreadable rows",
            result.imported, result.skipped, result.batch_duplicates, result.dropped
        );
        total.merge(&result);
    }

    if files.len() > 1 {
        println!(
            "Total: {} imported, {} skipped",
            total.imported, total.skipped
        );
    }

    let applied = apply_all_rules(&conn)?;
    println!("{}", format!("Applied {} rules", applied.rules).green());
    Ok(())
}
