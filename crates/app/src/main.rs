use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tasklists_cache::{
    start_gc_sweeper, CacheConfig, MutationController, NegativeCounter, PgStore, QueryCache,
    QueryService, Refetcher,
};
use tasklists_core::filter::{RecentLimit, TaskFilter};
use tasklists_core::stats::TaskStats;
use tasklists_events::CacheEventBus;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasklists_app=debug,tasklists_cache=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = CacheConfig::from_env().context("Invalid cache configuration")?;
    tracing::info!(
        stale_secs = config.stale_time.as_secs(),
        gc_secs = config.gc_time.as_secs(),
        query_retries = config.query_retries,
        mutation_retries = config.mutation_retries,
        "Loaded cache configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = tasklists_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    tasklists_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    tasklists_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // --- Cache layer ---
    let store = Arc::new(PgStore::new(pool));
    let cache = Arc::new(QueryCache::new());
    let event_bus = Arc::new(CacheEventBus::new(config.event_bus_capacity));

    let query = Arc::new(QueryService::new(
        Arc::clone(&cache),
        Arc::clone(&store),
        config.clone(),
    ));
    let controller = MutationController::new(
        Arc::clone(&cache),
        Arc::clone(&store),
        Arc::new(NegativeCounter::from_clock()),
        Arc::clone(&event_bus),
    )
    .with_retries(config.mutation_retries);

    let refetch_handle = Refetcher::spawn(Arc::clone(&query), &event_bus);
    let sweeper_handle = start_gc_sweeper(Arc::clone(&cache), config.gc_time);
    tracing::info!("Cache services started (refetcher, gc sweeper)");

    // --- Warm-up ---
    let lists = query.lists().await.context("Failed to load lists")?;
    let tasks = query.tasks().await.context("Failed to load tasks")?;
    let recent = query
        .recent_lists(RecentLimit::DEFAULT)
        .await
        .context("Failed to load recent lists")?;
    tracing::info!(
        lists = lists.len(),
        tasks = tasks.len(),
        recent = recent.len(),
        "Cache warmed"
    );

    let today = chrono::Utc::now().date_naive();
    for list in &recent {
        let list_tasks = query.tasks_by_list(list.id).await?;
        let pending = TaskFilter::Pending.apply(&list_tasks, today).len();
        let stats = TaskStats::summarize(list_tasks.len(), &list_tasks);
        tracing::info!(
            list_id = list.id,
            name = %list.name,
            headline = %stats.headline(TaskFilter::All),
            pending,
            completed = stats.completed,
            "List summary"
        );
    }

    shutdown_signal().await;

    // --- Post-shutdown cleanup ---
    // Dropping the last bus handle closes the channel and stops the refetcher.
    drop(controller);
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), refetch_handle).await;
    tracing::info!("Refetcher stopped");

    sweeper_handle.abort();
    tracing::info!(entries = cache.len().await, "Shutdown complete");
    Ok(())
}

/// Wait for SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
