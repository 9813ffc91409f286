use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Color, Table};
use rusqlite::Connection;

use crate::cli::Context;
use crate::error::Result;
use crate::fmt::amount;
use crate::rules::apply_all_rules;
use crate::sorter::{sort_transactions, SortColumn, SortState};
use crate::store::TransactionStore;

pub fn run(
    ctx: &Context,
    sort: Option<SortColumn>,
    asc: bool,
    desc: bool,
    limit: Option<usize>,
) -> Result<()> {
    let mut state = SortState::load(&ctx.settings);
    if let Some(column) = sort {
        if column != state.column {
            state.select(column);
        }
    }
    if asc {
        state.descending = false;
    } else if desc {
        state.descending = true;
    }

    let conn = ctx.open_db()?;
    print_view(&conn, &ctx.settings.settings().group_label(), state, limit)
}

/// Advance the saved sort state as a header click would, then show the view.
pub fn select(ctx: &mut Context, column: SortColumn) -> Result<()> {
    let mut state = SortState::load(&ctx.settings);
    state.select(column);
    state.save(&mut ctx.settings)?;

    let conn = ctx.open_db()?;
    print_view(&conn, &ctx.settings.settings().group_label(), state, None)
}

fn print_view(conn: &Connection, group: &str, state: SortState, limit: Option<usize>) -> Result<()> {
    // Rules may have changed since the last run.
    apply_all_rules(conn)?;

    let transactions = TransactionStore::new(conn).list_all()?;
    if transactions.is_empty() {
        println!("No transactions. Import a statement with `sift import <file>`.");
        return Ok(());
    }
    let view = sort_transactions(&transactions, state.column, state.descending);

    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Date", "Post Date", "Description", "Category", "Type", "Amount", "Memo",
    ]);
    let shown = view.len().min(limit.unwrap_or(usize::MAX));
    for txn in view.iter().take(shown) {
        let amount_color = if txn.amount < 0.0 { Color::Red } else { Color::Green };
        table.add_row(vec![
            Cell::new(txn.id),
            Cell::new(&txn.transaction_date),
            Cell::new(&txn.post_date),
            Cell::new(&txn.description),
            Cell::new(&txn.category),
            Cell::new(&txn.txn_type),
            Cell::new(amount(txn.amount))
                .fg(amount_color)
                .set_alignment(CellAlignment::Right),
            Cell::new(&txn.memo),
        ]);
    }

    let direction = if state.descending { "desc" } else { "asc" };
    let title = if group.is_empty() {
        "Transactions".to_string()
    } else {
        format!("Transactions: {group}")
    };
    println!(
        "{} {}",
        title.bold(),
        format!("(sorted by {} {direction}, {})", state.column.key(), row_count(shown, view.len())).dimmed()
    );
    println!("{table}");
    Ok(())
}

fn row_count(shown: usize, total: usize) -> String {
    if shown < total {
        format!("{shown} of {total} rows")
    } else {
        format!("{total} rows")
    }
}
