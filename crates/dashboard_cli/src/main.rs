mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;

use cli::Cli;
use shared::config::DashboardConfig;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = DashboardConfig::load(cli.config.as_deref())
        .with_context(|| format!("Não foi possível carregar a configuração {:?}", cli.config))?;

    let response = commands::execute(&cli.command, &config).await;
    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    }
    .context("Falha ao serializar a resposta")?;
    println!("{}", rendered);

    if !response.success {
        std::process::exit(1);
    }
    Ok(())
}
