use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "claims-dashboards",
    about = "Métricas dos painéis de auditoria, regulação e faturamento de contas médicas."
)]
pub struct Cli {
    /// Arquivo JSON de configuração (opcional).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Imprime o JSON indentado.
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Painel de auditoria: glosas por prestador, procedimento, auditor e mês.
    Audit {
        /// Exportação JSON das contas auditadas.
        #[arg(long)]
        claims: PathBuf,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Painel de regulação: SLA, automação e glosas das guias reguladas.
    Billing {
        /// Exportação JSON das guias reguladas.
        #[arg(long)]
        regulation: PathBuf,
        /// Exportação JSON das contas auditadas.
        #[arg(long)]
        claims: PathBuf,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Painel de faturamento: apresentado, recebido e glosado.
    Faturamento {
        #[arg(long)]
        claims: PathBuf,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// SLA ao vivo das filas da API externa.
    Queues,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Data inicial (AAAA-MM-DD), inclusiva.
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Data final (AAAA-MM-DD), inclusiva.
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// Busca por guia, prestador ou auditor.
    #[arg(long)]
    pub search: Option<String>,
}
