//! textstat server entry point.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use textstat_core::db::{open_db, open_db_in_memory};
use textstat_server::auth::StaticTokenAuthenticator;
use textstat_server::config::{ConfigLoader, ServerConfig};
use textstat_server::{build_router, wait_for_shutdown, AppState};

#[derive(Debug, Parser)]
#[command(name = "textstat", version, about = "Text storage and statistics API")]
struct Args {
    /// TOML config file; overrides `TEXTSTAT_CONFIG`.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address; overrides the config file and environment.
    #[arg(long)]
    bind: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("textstat: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = textstat_core::init_logging(&config.log_level, config.log_dir.as_deref()) {
        eprintln!("textstat: {err}");
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            log::error!("event=runtime_start module=main status=error error={err}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(serve(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=server_exit module=main status=error error={err}");
            eprintln!("textstat: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = args.config.as_ref() {
        loader = loader.with_config_file(path);
    }
    let mut config = loader.load()?;
    if let Some(bind) = args.bind.as_ref() {
        config.bind_addr = bind.clone();
        config.validate()?;
    }
    Ok(config)
}

async fn serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let conn = match config.db_path.as_ref() {
        Some(path) => open_db(path)?,
        None => {
            log::warn!("event=store_open module=main status=ok mode=memory persistent=false");
            open_db_in_memory()?
        }
    };

    if config.auth.tokens.is_empty() {
        log::warn!("event=auth_init module=main status=ok tokens=0 guarded_routes=401");
    }
    let authenticator = Arc::new(StaticTokenAuthenticator::new(&config.auth.tokens));
    let app = build_router(AppState::new(conn, authenticator));

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("event=server_start module=main status=ok addr={addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown(tokio::signal::ctrl_c()))
        .await?;

    log::info!("event=server_stop module=main status=ok");
    Ok(())
}
