//! catia CLI entry point.

mod args;
mod config;
mod lines;
mod record;

use anyhow::Context;
use clap::Parser;
use catia_core::mash::mash_by_keyword;
use catia_core::translate::translate_log;
use tracing::{error, info};

use crate::args::{Cli, Commands, MashArgs, RecordArgs, TranslateArgs};

fn main() {
    // Logs go to stderr; stdout carries the machine-readable output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Examples = cli.command {
        println!("{}", crate::args::EXAMPLES_TEXT);
        return Ok(());
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    runtime.block_on(async {
        match cli.command {
            Commands::Record(args) => run_record(args).await,
            Commands::Translate(args) => run_translate(args).await,
            Commands::Mash(args) => run_mash(args).await,
            Commands::Examples => Ok(()),
        }
    })
}

async fn run_record(args: RecordArgs) -> anyhow::Result<()> {
    let mut options = config::load_options(args.config.as_deref())?;
    args.apply(&mut options);

    let mut reader = lines::open(args.file.as_deref()).await?;
    let mut stdout = tokio::io::stdout();

    let summary = if args.live {
        record::live(reader, &mut stdout, options, record::LIVE_TICK).await?
    } else {
        record::replay(&mut reader, &mut stdout, options).await?
    };

    info!(
        "Session {} recorded {} action(s)",
        summary.session_id,
        summary.actions.len()
    );
    Ok(())
}

async fn run_translate(args: TranslateArgs) -> anyhow::Result<()> {
    let mut reader = lines::open(args.file.as_deref()).await?;
    let log = lines::read_all(&mut reader).await?;

    for statement in translate_log(&log) {
        println!("{}", statement);
    }
    Ok(())
}

async fn run_mash(args: MashArgs) -> anyhow::Result<()> {
    let mut reader = lines::open(args.file.as_deref()).await?;
    let log = lines::read_all(&mut reader).await?;

    for entry in mash_by_keyword(&log, &args.keyword) {
        println!("{}", entry);
    }
    Ok(())
}
