use std::{io, sync::OnceLock};

use application::{cli, Args, Config, Service};
use common::SystemClock;
use service::{
    infra::{storage, Headers, Http},
    session,
};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_writer(io::stdout)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (!STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::INFO)
                                >= *meta.level()
                })),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_writer(io::stderr)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::INFO)
                                >= *meta.level()
                })),
        )
        .init();

    if start().await.is_err() {
        std::process::exit(1);
    }
}

async fn start() -> Result<(), ()> {
    let Args { config, command } = Args::parse().unwrap_or_else(|e| e.exit());

    let Config { api, storage, log } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let headers = Headers::new();
    let http = Http::new(api.into(), headers.clone()).map_err(|e| {
        log::error!("failed to initialize `Http` client: {e}");
    })?;
    let session = session::Store::new(
        storage::File::new(storage.dir),
        headers,
        SystemClock,
    );
    let svc: Service = service::Service::new(http, session);

    svc.session().initialize().await;
    log::debug!("session phase: {}", svc.session().phase());

    match cli::run(&svc, command).await {
        Ok(output) => {
            println!("{output}");
            Ok(())
        }
        Err(e) => {
            log::debug!("{e}");
            eprintln!("{}", e.message);
            Err(())
        }
    }
}
