pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

use crate::core::{config::Settings, state::AppState, telemetry};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let db_pool = db::init_pool(&settings).await?;
    db::run_migrations(&db_pool).await?;

    let supabase = settings.supabase();
    tracing::info!(
        supabase_url = supabase.url.as_deref().unwrap_or("-"),
        anon_key_configured = supabase.anon_key.is_some(),
        "Hosted database project"
    );
    if supabase.service_role_key.is_none() {
        tracing::warn!("SUPABASE_SERVICE_ROLE_KEY is not set; admin routes are open");
    }

    let state = AppState::new(settings, db_pool.clone());
    let app = api::router::router(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;

    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        api_prefix = %state.settings().api().api_prefix,
        "School portal API listening"
    );

    let result =
        axum::serve(listener, app).with_graceful_shutdown(core::shutdown::shutdown_signal()).await;

    db_pool.close().await;
    tracing::info!("Database pool closed");

    result?;

    Ok(())
}
