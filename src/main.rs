//! `zkcdn`: tokeniza contenido contra el ledger y verifica fingerprints con
//! el proving service.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use zkcdn_adapters::{ContentStore, HttpProvingService, InMemoryContentStore, IpfsHttpStore, Ledger, LocalLedger,
                     TokenizationPipeline, VerificationPipeline};
use zkcdn_core::{fingerprint, FanoutReporter, Fingerprint, ProgressReporter, TracingReporter, WorkflowEngine};
use zkcdn_rust::{AppConfig, AppError, ConsoleReporter};

#[derive(Debug, Parser)]
#[command(name = "zkcdn", version, about = "Content tokenization and zero-knowledge verification")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Imprime el fingerprint de una dirección de contenido.
    Fingerprint { address: String },
    /// Sube un archivo, lo registra en el ledger y muestra el record.
    Tokenize {
        #[arg(long)]
        owner: String,
        file: PathBuf,
        /// Usa un content store en memoria en vez de la API IPFS.
        #[arg(long)]
        offline: bool,
    },
    /// Verifica un fingerprint y resuelve su dirección de contenido.
    Verify { fingerprint: Fingerprint },
    /// Lista los fingerprints registrados por un owner.
    List {
        #[arg(long)]
        owner: String,
    },
    /// Compila el circuito y ejecuta el setup del proving service.
    ProverSetup,
}

fn init_tracing(default_filter: &str) {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter))
                                                      .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter)
                             .with_writer(std::io::stderr)
                             .init();
}

fn engine() -> WorkflowEngine {
    let targets: Vec<Arc<dyn ProgressReporter>> = vec![Arc::new(ConsoleReporter::default()), Arc::new(TracingReporter)];
    WorkflowEngine::new(Arc::new(FanoutReporter::new(targets)))
}

async fn execute(config: &AppConfig, command: Command) -> Result<(), AppError> {
    match command {
        Command::Fingerprint { address } => {
            println!("{}", fingerprint(&address));
        }
        Command::Tokenize { owner, file, offline } => {
            let content = tokio::fs::read(&file).await?;
            if content.is_empty() {
                return Err(AppError::InvalidInput(format!("{} is empty", file.display())));
            }
            let store: Arc<dyn ContentStore> = if offline {
                Arc::new(InMemoryContentStore::new())
            } else {
                let mut store = IpfsHttpStore::new(&config.ipfs.api_url, config.ipfs.timeout)?;
                if let Some((id, secret)) = config.ipfs.credentials() {
                    store = store.with_credentials(id, secret);
                }
                Arc::new(store)
            };
            let ledger = Arc::new(LocalLedger::open(&config.ledger_registry, Some(owner.clone()))?);
            let pipeline = TokenizationPipeline::new(store, ledger, config.stage_timeouts())?;

            let record = pipeline.run(&engine(), &owner, &content).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            println!("content: {}", record.content_url(&config.ipfs.gateway_url));
            println!("tx:      {}", record.tx_url(&config.explorer_tx_url));
        }
        Command::Verify { fingerprint } => {
            let prover = Arc::new(HttpProvingService::new(&config.prover.url, config.prover.timeout)?);
            let ledger = Arc::new(LocalLedger::open(&config.ledger_registry, None)?);
            let pipeline = VerificationPipeline::new(prover, ledger, config.stage_timeouts())?;

            let record = pipeline.run(&engine(), fingerprint).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            if let Some(url) = record.content_url(&config.ipfs.gateway_url) {
                println!("content: {url}");
            }
        }
        Command::List { owner } => {
            let ledger = LocalLedger::open(&config.ledger_registry, None)?;
            for fp in ledger.fingerprints_of(&owner).await? {
                println!("{fp}");
            }
        }
        Command::ProverSetup => {
            let prover = HttpProvingService::new(&config.prover.url, config.prover.timeout)?;
            let reply = prover.setup_circuit().await?;
            println!("{}", reply.message);
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", AppError::from(e));
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.log_filter);

    match execute(&config, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        // El ConsoleReporter ya mostró "failed at step N ..." para fallos de etapa.
        Err(AppError::Pipeline(zkcdn_adapters::PipelineError::Failed { .. })) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
