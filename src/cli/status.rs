use crate::cli::Context;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::rules::RuleStore;
use crate::store::TransactionStore;

pub fn run(ctx: &Context) -> Result<()> {
    let settings = ctx.settings.settings();
    let db_path = ctx.db_path();

    println!("User:       {}", if settings.user_name.is_empty() { "(not set)" } else { &settings.user_name });
    println!("Settings:   {}", ctx.settings.path().display());
    println!("Data dir:   {}", ctx.data_dir.display());
    println!("Database:   {}", db_path.display());

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));

        let conn = ctx.open_db()?;
        let transactions = TransactionStore::new(&conn).count()?;
        let uncategorized: i64 = conn.query_row(
            "SELECT count(*) FROM transactions WHERE category = ''",
            [],
            |r| r.get(0),
        )?;
        let rules = RuleStore::new(&conn).count()?;

        println!();
        println!("Transactions:   {transactions}");
        println!("Uncategorized:  {uncategorized}");
        println!("Rules:          {rules}");
    } else {
        println!();
        println!("Database not found. Run `sift init` or `sift import <file>`.");
    }

    Ok(())
}
