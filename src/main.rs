mod categories;
mod cli;
mod db;
mod dedup;
mod error;
mod fmt;
mod importer;
mod logging;
mod models;
mod normalizer;
mod rules;
mod settings;
mod sorter;
mod store;

use clap::Parser;

use cli::{categorize::RuleChoice, CategoriesCommands, Cli, Commands, Context, RulesCommands};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut ctx = Context::new(cli.data_dir.as_deref());

    let result = match cli.command {
        Commands::Init => cli::init::run(&mut ctx),
        Commands::Import { files } => cli::import::run(&ctx, &files),
        Commands::List {
            sort,
            asc,
            desc,
            limit,
        } => cli::list::run(&ctx, sort, asc, desc, limit),
        Commands::Sort { column } => cli::list::select(&mut ctx, column),
        Commands::Categorize {
            id,
            category,
            rule,
            no_rule,
            apply,
        } => {
            let create = if rule {
                Some(true)
            } else if no_rule {
                Some(false)
            } else {
                None
            };
            cli::categorize::run(&ctx, id, &category, RuleChoice { create, apply })
        }
        Commands::Memo { id, text } => cli::memo::run(&ctx, id, &text),
        Commands::Rules { command } => match command {
            RulesCommands::Add {
                keyword,
                category,
                apply,
            } => cli::rules::add(&ctx, &keyword, &category, apply),
            RulesCommands::List => cli::rules::list(&ctx),
            RulesCommands::Update {
                id,
                keyword,
                category,
            } => cli::rules::update(&ctx, id, keyword, category),
            RulesCommands::Delete { id } => cli::rules::delete(&ctx, id),
            RulesCommands::Apply { id } => cli::rules::apply(&ctx, id),
            RulesCommands::ApplyAll => cli::rules::apply_all(&ctx),
            RulesCommands::Clear { yes } => cli::rules::clear(&ctx, yes),
        },
        Commands::Categories { command } => match command {
            CategoriesCommands::List => cli::categories::list(&ctx),
            CategoriesCommands::Add { name } => cli::categories::add(&mut ctx, &name),
        },
        Commands::Profile { name, group } => {
            cli::profile::run(&mut ctx, name.as_deref(), group.as_deref())
        }
        Commands::Clear { yes } => cli::clear::run(&ctx, yes),
        Commands::Status => cli::status::run(&ctx),
        Commands::Completions { shell } => cli::completions::run(shell),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
