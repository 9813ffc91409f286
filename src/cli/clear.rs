use crate::cli::{confirm, Context};
use crate::error::Result;
use crate::store::TransactionStore;

pub fn run(ctx: &Context, yes: bool) -> Result<()> {
    let conn = ctx.open_db()?;
    let store = TransactionStore::new(&conn);
    let count = store.count()?;
    if count == 0 {
        println!("No transactions to delete.");
        return Ok(());
    }
    if !yes && !confirm(&format!("Delete all {count} transactions? This cannot be undone")) {
        println!("Cancelled.");
        return Ok(());
    }
    let deleted = store.delete_all()?;
    println!("Deleted {deleted} transactions");
    Ok(())
}
