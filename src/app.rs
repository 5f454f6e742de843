/*
 * Responsibility
 * - tracing / panic hook 初期化
 * - Config読み込み → 依存生成 (signer, replay store) → Router 組み立て
 * - Middleware の適用 (request-id / trace / limits / headers)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::handlers::health::health;
use crate::config::{Config, HttpLimits};
use crate::middleware;
use crate::services::{
    replay::{InMemoryReplayStore, ReplayStore, ValkeyReplayStore},
    scope::ScopeAuthorizer,
    signing::{RequestSigner, SignedRequestVerifier},
};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,proxy_guard=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panic via tracing so they don't get "lost"
        tracing::error!(?info, "panic");

        // In development, fail fast. In production, fall back to the default hook.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting proxy-guard in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, config.http);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let replay_store: Arc<dyn ReplayStore> = match config.valkey_url.as_deref() {
        Some(url) => {
            let store = ValkeyReplayStore::new_with_prefix(url, config.replay_key_prefix.clone())
                .await
                .context("failed to connect replay store")?;
            tracing::info!(prefix = %config.replay_key_prefix, "using valkey replay store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("VALKEY_URL not set; using in-memory replay store (single instance only)");
            Arc::new(InMemoryReplayStore::new())
        }
    };

    let signer = RequestSigner::new(
        config.signing_secret.clone(),
        config.signature_policy,
    );
    let verifier = Arc::new(SignedRequestVerifier::new(signer, replay_store));

    Ok(AppState::new(ScopeAuthorizer::default(), verifier))
}

pub fn build_router(state: AppState, limits: HttpLimits) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes())
        .with_state(state);

    let router = middleware::headers::apply(router);
    middleware::http::apply(router, limits)
}
