use std::{process, sync::Arc, time::Duration};

use safra::{
    application::{error::AppError, seed::Seeder},
    cache::{
        CacheBackend, CacheConfig, CacheConsumer, CacheService, CacheStore, CacheTrigger,
        EventQueue, InvalidationMap, MemoryStore, RedisStore,
    },
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
        config::Command::Seed(args) => run_seed(settings, args.force).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let (cache, trigger) = init_cache(&settings).await?;
    let state = ApiState::from_repositories(repositories, cache, trigger.clone());

    let consume_handle = if trigger.config().is_enabled() {
        let trigger = trigger.clone();
        let interval_ms = trigger.config().auto_consume_interval_ms;
        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
            interval.tick().await; // first tick fires immediately
            loop {
                interval.tick().await;
                trigger.consumer().consume().await;
            }
        }))
    } else {
        None
    };

    let result = serve_http(&settings, state).await;

    if let Some(handle) = consume_handle {
        handle.abort();
        let _ = handle.await;
    }
    // Flush invalidations queued by the last writes.
    trigger.consumer().consume().await;

    result
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    init_repositories(&settings).await?;
    info!(target: "safra::migrate", "Database migrations applied");
    Ok(())
}

async fn run_seed(settings: config::Settings, force: bool) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let (cache, trigger) = init_cache(&settings).await?;
    let state = ApiState::from_repositories(repositories.clone(), cache.clone(), trigger);

    let seeder = Seeder::new(
        repositories,
        (*state.producers).clone(),
        (*state.farms).clone(),
        (*state.crops).clone(),
        (*state.harvests).clone(),
        (*state.farm_crops).clone(),
    );
    let summary = seeder
        .seed(force)
        .await
        .map_err(|err| AppError::unexpected(err.to_string()))?;

    // A shared store (redis) may still hold entries computed before the seed.
    for namespace in safra::cache::namespaces::ALL {
        if let Err(err) = cache.delete_by_prefix(namespace).await {
            warn!(namespace, error = %err, "Failed to clear cache after seeding");
        }
    }

    info!(target: "safra::seed", plantings = summary.plantings, "Demo data ready");
    Ok(())
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(
        database_url,
        settings.database.max_connections.get(),
        settings.database.acquire_timeout,
    )
    .await
    .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

async fn init_cache(
    settings: &config::Settings,
) -> Result<(Arc<CacheService>, Arc<CacheTrigger>), AppError> {
    let config = CacheConfig::from(&settings.cache);

    let store: Arc<dyn CacheStore> = match &config.backend {
        CacheBackend::Memory => Arc::new(MemoryStore::new(&config)),
        CacheBackend::Redis { url } => Arc::new(
            RedisStore::connect(url)
                .await
                .map_err(|err| AppError::from(InfraError::cache(err.to_string())))?,
        ),
    };

    let cache = if config.is_enabled() {
        Arc::new(CacheService::new(store, InvalidationMap::default()))
    } else {
        info!("Read-through cache disabled");
        Arc::new(CacheService::disabled(store))
    };

    let queue = Arc::new(EventQueue::new());
    let consumer = Arc::new(CacheConsumer::new(
        config.clone(),
        cache.clone(),
        queue.clone(),
    ));
    let trigger = Arc::new(CacheTrigger::new(config, queue, consumer));

    Ok((cache, trigger))
}

async fn serve_http(settings: &config::Settings, state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(addr = %settings.server.addr, "HTTP server listening");

    let (stop_tx, stop_rx) = futures::channel::oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        joined = &mut server => return server_outcome(joined),
        () = shutdown_signal() => {}
    }

    info!(
        grace_secs = settings.server.graceful_shutdown.as_secs(),
        "Shutdown requested; draining connections"
    );
    let _ = stop_tx.send(());

    match tokio::time::timeout(settings.server.graceful_shutdown, &mut server).await {
        Ok(joined) => server_outcome(joined),
        Err(_) => {
            warn!("Graceful shutdown timed out; aborting open connections");
            server.abort();
            Ok(())
        }
    }
}

fn server_outcome(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(AppError::unexpected(format!("server error: {err}"))),
        Err(err) => Err(AppError::unexpected(format!("server task failed: {err}"))),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
