//! CLI e servidor web do NER baseado em CRF.
//!
//! ```text
//! crf-ner serve --port 3000
//! crf-ner tag "Barack Obama visited Paris in July 2021."
//! crf-ner --config ner.json features "Obama visited Paris"
//! ```

mod render;
mod server;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use crf_ner_core::{legend, NerConfig, NerPipeline};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "crf-ner", version, about = "Reconhecimento de entidades nomeadas com CRF")]
struct Cli {
    /// Arquivo de configuração JSON
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Modelo CRF em JSON (sobrepõe `model_path` da configuração)
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inicia o servidor web
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
    /// Rotula um texto e imprime `palavra → rótulo (POS)`
    Tag { text: String },
    /// Imprime os mapas de features de cada token em JSON
    Features { text: String },
}

fn load_config(cli: &Cli) -> anyhow::Result<NerConfig> {
    let mut config = match &cli.config {
        Some(path) => NerConfig::from_file(path)
            .with_context(|| format!("falha ao ler a configuração {}", path.display()))?,
        None => NerConfig::default(),
    };
    if let Some(model) = &cli.model {
        config.model_path = Some(model.clone());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs vão para stderr; stdout fica com a saída dos subcomandos
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let pipeline = NerPipeline::new(&config).context("falha ao montar o pipeline NER")?;

    match cli.command {
        Commands::Serve { host, port } => {
            let app = server::router(server::AppState::new(pipeline));
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("falha ao escutar em {addr}"))?;
            tracing::info!("🚀 Servidor NER iniciado em http://{addr}");
            axum::serve(listener, app).await?;
        }
        Commands::Tag { text } => {
            let analysis = pipeline.analyze(&text)?;
            for t in &analysis.tokens {
                println!("{:<15} → {:<8} ({})", t.token.text, t.label, t.pos);
            }
            if !analysis.entities.is_empty() {
                println!();
            }
            for e in &analysis.entities {
                let entry = legend::entry_for(e.entity, pipeline.palette());
                println!("{} [{}] {:.2}", e.text, entry.display(), e.confidence);
            }
        }
        Commands::Features { text } => {
            let rows = pipeline.featurize(&text)?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    Ok(())
}
