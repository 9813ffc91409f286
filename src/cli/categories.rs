use crate::categories::{add_category, CategorySet};
use crate::cli::Context;
use crate::error::Result;

pub fn list(ctx: &Context) -> Result<()> {
    let conn = ctx.open_db()?;
    let set = CategorySet::derive(&conn, &ctx.settings)?;
    if set.is_empty() {
        println!("No categories yet.");
        return Ok(());
    }
    println!("Categories ({})", set.len());
    for label in set.labels() {
        println!("  {label}");
    }
    Ok(())
}

pub fn add(ctx: &mut Context, name: &str) -> Result<()> {
    let conn = ctx.open_db()?;
    // Labels already used by transactions or rules count as known too.
    if CategorySet::derive(&conn, &ctx.settings)?.contains(name) {
        println!("Category already exists: {}", name.trim());
        return Ok(());
    }
    if add_category(&mut ctx.settings, name)? {
        println!("Added category: {}", name.trim());
    } else {
        println!("Category name must not be empty.");
    }
    Ok(())
}
