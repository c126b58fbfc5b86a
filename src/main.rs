use clap::{Parser, Subcommand};
use credential_router::application::checkout::{CallbackRequest, CheckoutService};
use credential_router::application::router::CredentialRouter;
use credential_router::application::slot::CredentialSlot;
use credential_router::config::RouterConfig;
use credential_router::domain::credentials::RegionEntry;
use credential_router::domain::ports::OrderStoreBox;
use credential_router::domain::region::RegionCode;
use credential_router::infrastructure::in_memory::InMemoryOrderStore;
#[cfg(feature = "storage-rocksdb")]
use credential_router::infrastructure::rocksdb::RocksDBStore;
use credential_router::infrastructure::simulated::SimulatedBackend;
use credential_router::interfaces::csv::order_reader::OrderReader;
use credential_router::interfaces::csv::outcome_writer::{CheckoutOutcome, OutcomeWriter};
use credential_router::logging;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Credential table (JSON)
    #[arg(long)]
    config: PathBuf,

    /// Path to persistent order database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initiate payment for every order in a CSV file
    Checkout {
        /// Orders CSV: order_id, billing_state, shipping_state
        input: PathBuf,
    },
    /// Confirm a payment-status callback with the order's original credentials
    Callback {
        #[arg(long)]
        order_id: Option<String>,
        #[arg(long)]
        session_id: Option<String>,
        /// Raw JSON notification body
        #[arg(long)]
        body: Option<String>,
    },
    /// Show how every region is configured
    Validate,
}

fn order_store(db_path: Option<PathBuf>) -> Result<OrderStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = RocksDBStore::open(path).into_diagnostic()?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            tracing::warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Box::new(InMemoryOrderStore::new()))
        }
        None => Ok(Box::new(InMemoryOrderStore::new())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = RouterConfig::from_path(&cli.config).into_diagnostic()?;
    logging::init(&config.logging).into_diagnostic()?;
    let table = Arc::new(config.credential_table().into_diagnostic()?);

    if let Command::Validate = cli.command {
        for region in RegionCode::ALL {
            let status = match table.entry(region) {
                Some(RegionEntry::Complete(_)) => "complete".to_string(),
                Some(RegionEntry::Incomplete { missing }) => {
                    format!("incomplete (missing {})", missing.join(" "))
                }
                None => "default".to_string(),
            };
            println!("{} {}: {}", region, region.name(), status);
        }
        return Ok(());
    }

    let slot = Arc::new(CredentialSlot::new());
    let backend = SimulatedBackend::new(config.api_host.clone()).with_slot(Arc::clone(&slot));
    let router = CredentialRouter::new(table, order_store(cli.db_path)?);
    let service = CheckoutService::new(router, Box::new(backend), slot);

    match cli.command {
        Command::Checkout { input } => {
            let file = File::open(input).into_diagnostic()?;
            let reader = OrderReader::new(file);
            let stdout = io::stdout();
            let mut writer = OutcomeWriter::new(stdout.lock());

            for order in reader.orders() {
                let order = match order {
                    Ok(order) => order,
                    Err(e) => {
                        error!("Error reading order: {}", e);
                        continue;
                    }
                };
                let order_id = order.order_id;
                let region = order
                    .billing_region
                    .as_deref()
                    .or(order.shipping_region.as_deref())
                    .and_then(RegionCode::normalize);

                service
                    .router()
                    .order_store()
                    .save_order(order)
                    .await
                    .into_diagnostic()?;

                let outcome = match service.process_payment(order_id).await {
                    Ok(redirect) => CheckoutOutcome::redirected(&redirect),
                    Err(e) => {
                        let code = region.map(|r| r.code());
                        CheckoutOutcome::failed(order_id, code, &e)
                    }
                };
                writer.write(&outcome).into_diagnostic()?;
            }
            writer.flush().into_diagnostic()?;
        }
        Command::Callback {
            order_id,
            session_id,
            body,
        } => {
            let request = CallbackRequest {
                order_id,
                session_id,
                body: body.map(String::into_bytes).unwrap_or_default(),
            };
            let context = service.confirm_callback(&request).await.into_diagnostic()?;
            println!(
                "order {} confirmed with merchant {}",
                context.order_id,
                context.credentials.merchant_id()
            );
        }
        Command::Validate => {}
    }

    Ok(())
}
