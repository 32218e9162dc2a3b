//! ragit CLI entry point.
//!
//! Binary name: `ragit`
//!
//! Parses CLI arguments, sets up tracing, opens the vector database and
//! dispatches to the command handlers.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,ragit=debug",
        _ => "trace",
    };
    if let Err(e) = ragit_observe::tracing_setup::init_tracing(filter, cli.otel) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    let result = run(cli).await;
    ragit_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "ragit", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(cli.data_dir).await?;
    let json = cli.json;

    match cli.command {
        Commands::Create {
            csv,
            collection,
            metric,
            description,
            meta,
        } => {
            let metadata = cli::collection::build_metadata(description, meta);
            cli::collection::create_collection(&state, &csv, &collection, metric, metadata, json)
                .await?;
        }

        Commands::AddCsv { csv, collection } => {
            cli::collection::add_csv(&state, &csv, &collection, json).await?;
        }

        Commands::Add {
            collection,
            id,
            text,
        } => {
            cli::record::add_record(&state, &collection, &id, &text, json).await?;
        }

        Commands::Delete { collection, id } => {
            cli::record::delete_record(&state, &collection, &id, json).await?;
        }

        Commands::Drop {
            collection,
            confirm,
        } => {
            cli::collection::drop_collection(&state, &collection, confirm, json).await?;
        }

        Commands::Info { collection } => {
            cli::collection::show_info(&state, &collection, json).await?;
        }

        Commands::GetIds { collection, ids } => {
            cli::record::get_by_ids(&state, &collection, &ids, json).await?;
        }

        Commands::GetTexts { collection, texts } => {
            cli::record::get_by_texts(&state, &collection, &texts, json).await?;
        }

        Commands::Search {
            collection,
            query,
            k,
            contains,
        } => {
            cli::search::search(&state, &collection, &query, k, contains.as_deref(), json).await?;
        }

        Commands::List => {
            cli::collection::list_collections(&state, json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
