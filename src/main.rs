//! msa-monitor - Zabbix helper for HP MSA storage arrays

use clap::Parser;

mod cache;
mod cli;
mod client;
mod components;
mod config;
mod credentials;
mod error;
mod output;
mod xml;

use cli::{Action, Cli, CommandContext};
use config::Config;
use error::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match run(&cli).await {
        Ok(line) => println!("{}", line),
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }
}

/// Log to stderr; `--debug` raises the default filter, `RUST_LOG` wins.
fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .target(env_logger::Target::Stderr)
        .init();
}

async fn run(cli: &Cli) -> Result<String> {
    let config = Config::load_at(cli.config.as_deref())?;

    match cli.action()? {
        Action::ShowCache => cli::cache::show(&cli::context::client_config(cli, &config)),
        Action::Poll(poll) => {
            let ctx = CommandContext::new(cli, &config)?;
            cli::poll::run(&ctx, &poll).await
        }
    }
}
