use crate::cli::Context;
use crate::error::Result;
use crate::store::TransactionStore;

pub fn run(ctx: &Context, id: i64, text: &str) -> Result<()> {
    let conn = ctx.open_db()?;
    TransactionStore::new(&conn).update_memo(id, text)?;
    if text.is_empty() {
        println!("Cleared memo on transaction {id}");
    } else {
        println!("Memo on transaction {id}: {text}");
    }
    Ok(())
}
