#[macro_use]
extern crate tracing;

use std::{net::SocketAddr, process::ExitCode, sync::Arc};

use axum::{Router, extract::FromRef};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;

mod check;
mod config;
mod dashboard;
mod error;
mod location;
mod lookup;
mod middleware;
mod reporter;
mod trace;
mod util;

pub use config::CONFIG;
pub use error::Error;

use config::HostHeaders;
use lookup::{Aggregator, HttpClient, PROVIDER_TIMEOUT};

#[derive(Parser)]
#[command(name = "myip", version, about = "Show and cross-check the public IP address")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the IP reporter (default)
    Serve,
    /// Ask the reporter and five public providers which address they see
    Check {
        /// Reporter endpoint, without the `type` query
        #[arg(long)]
        reporter_url: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    dotenv().ok();
    trace::init(&CONFIG.log);

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            launch_info();
            serve().await.map(|_| ExitCode::SUCCESS)
        }
        Command::Check { reporter_url } => {
            let reporter_url = reporter_url.unwrap_or_else(|| CONFIG.reporter_url.clone());
            run_check(&reporter_url).await
        }
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

#[derive(FromRef, Clone)]
pub struct AppState {
    pub headers: Arc<HostHeaders>,
}

async fn serve() -> Result<(), Error> {
    let state = AppState {
        headers: Arc::new(CONFIG.headers.clone()),
    };
    let layer = ServiceBuilder::new().layer(middleware::TraceLayer);
    let app = Router::new()
        .merge(reporter::routes())
        .fallback_service(ServeDir::new(&CONFIG.web_dir))
        .layer(layer)
        .with_state(state);

    let listener = TcpListener::bind(CONFIG.addr).await?;
    let local_addr = listener.local_addr()?;
    info!("listening on http://{}", local_addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

async fn run_check(reporter_url: &str) -> Result<ExitCode, Error> {
    let client = HttpClient::new(PROVIDER_TIMEOUT)?;
    let aggregator = Aggregator::new(&client);
    let mut stdout = std::io::stdout().lock();
    match check::run(&client, &aggregator, reporter_url, &mut stdout).await? {
        check::Report::Complete(results) => {
            debug!("{} provider slots settled", results.len());
            Ok(ExitCode::SUCCESS)
        }
        check::Report::Unreachable => Ok(ExitCode::FAILURE),
    }
}

fn launch_info() {
    println!();
    println!(
        "=================== Starting myip {} ===================",
        env!("CARGO_PKG_VERSION")
    );
    println!();
}
