use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use perch_api::{AppState, admin, auth, channels, messages, standup, users};
use perch_core::Workspace;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "perch=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let token_secret =
        std::env::var("PERCH_TOKEN_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let host = std::env::var("PERCH_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("PERCH_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Shared state
    let workspace: AppState = Arc::new(Workspace::new(token_secret));

    let app = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/channels/create", post(channels::create))
        .route("/channels/list", get(channels::list))
        .route("/channels/listall", get(channels::list_all))
        .route("/channel/invite", post(channels::invite))
        .route("/channel/details", get(channels::details))
        .route("/channel/messages", get(channels::messages))
        .route("/channel/leave", post(channels::leave))
        .route("/channel/join", post(channels::join))
        .route("/channel/addowner", post(channels::add_owner))
        .route("/channel/removeowner", post(channels::remove_owner))
        .route("/message/send", post(messages::send))
        .route("/message/sendlater", post(messages::send_later))
        .route("/message/edit", put(messages::edit))
        .route("/message/remove", delete(messages::remove))
        .route("/message/react", post(messages::react))
        .route("/message/unreact", post(messages::unreact))
        .route("/message/pin", post(messages::pin))
        .route("/message/unpin", post(messages::unpin))
        .route("/user/profile", get(users::profile))
        .route("/user/profile/setname", put(users::set_name))
        .route("/user/profile/setemail", put(users::set_email))
        .route("/user/profile/sethandle", put(users::set_handle))
        .route("/users/all", get(users::all))
        .route("/search", get(admin::search))
        .route("/admin/userpermission/change", post(admin::permission_change))
        .route("/clear", delete(admin::clear))
        .route("/standup/start", post(standup::start))
        .route("/standup/active", get(standup::active))
        .route("/standup/send", post(standup::send))
        .with_state(workspace)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Perch server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
