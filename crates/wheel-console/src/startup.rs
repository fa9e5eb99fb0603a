use crate::{
    api::routes::{
        add_section_handler, admin_page_handler, delete_wheel_handler, discard_editor_handler,
        edit_wheel_handler, health, new_editor_handler, records_fragment, remove_section_handler,
        rename_wheel_handler, set_active_handler, submit_wheel_handler, test_spin_handler,
        update_section_field_handler, wheel_detail_fragment, wheel_rows_fragment,
    },
    config::Settings,
    domain::{SessionSweeper, SpinWheelService},
    infra::spin_wheel_api::{SpinWheelApi, SpinWheelClient},
};

// Mock implementation only available with e2e-testing feature or debug builds
#[cfg(any(feature = "e2e-testing", debug_assertions))]
use crate::infra::spin_wheel_mock::InMemorySpinWheelApi;
use anyhow::anyhow;
use axum::{
    body::Body,
    extract::{connect_info::IntoMakeServiceWithConnectInfo, ConnectInfo, Request},
    http::{Extensions, HeaderValue},
    middleware::{self, AddExtension, Next},
    response::IntoResponse,
    routing::{get, post},
    serve::Serve,
    Router,
};
use hyper::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use log::{error, info, warn};
use reqwest_middleware::{
    reqwest::{self, Client, Url},
    ClientBuilder, ClientWithMiddleware, Middleware,
};
use std::{collections::HashMap, net::SocketAddr, str::FromStr};
use std::{sync::Arc, time::Duration};
use tokio::signal::unix::{signal, SignalKind};
use tokio::{net::TcpListener, select, task::JoinHandle};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tower_http::cors::{AllowOrigin, CorsLayer};

pub struct Application {
    server: Serve<
        TcpListener,
        IntoMakeServiceWithConnectInfo<Router, SocketAddr>,
        AddExtension<Router, ConnectInfo<SocketAddr>>,
    >,
    cancellation_token: CancellationToken,
    background_tasks: TaskTracker,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, anyhow::Error> {
        let address = format!(
            "{}:{}",
            config.api_settings.domain, config.api_settings.port
        );
        let listener = SocketAddr::from_str(&address)?;
        let (app_state, background_tasks, cancellation_token) = build_app(config.clone()).await?;
        let server = build_server(listener, app_state, config.api_settings.origins).await?;
        Ok(Self {
            server,
            cancellation_token,
            background_tasks,
        })
    }

    pub async fn run_until_stopped(self) -> Result<(), anyhow::Error> {
        info!("Starting server...");
        match self.server.with_graceful_shutdown(shutdown_signal()).await {
            Ok(_) => {
                info!("Server shutdown initiated");
                self.cancellation_token.cancel();

                let timeout = tokio::time::sleep(Duration::from_secs(10));
                select! {
                    _ = self.background_tasks.wait() => {
                        info!("Background tasks completed gracefully");
                    }
                    _ = timeout => {
                        warn!("Background tasks timed out during shutdown");
                    }
                }

                info!("Shutdown complete");
                Ok(())
            }
            Err(e) => {
                error!("Server shutdown error: {}", e);
                self.cancellation_token.cancel();

                let _ =
                    tokio::time::timeout(Duration::from_secs(5), self.background_tasks.wait())
                        .await;

                Err(anyhow!("Error during server shutdown: {}", e))
            }
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub title: String,
    pub service: Arc<SpinWheelService>,
    pub background_threads: Arc<HashMap<String, JoinHandle<()>>>,
}

impl AppState {
    /// State without background threads, used when the sweeper is driven elsewhere
    pub fn new(title: impl Into<String>, service: Arc<SpinWheelService>) -> Self {
        Self {
            title: title.into(),
            service,
            background_threads: Arc::new(HashMap::new()),
        }
    }
}

pub async fn build_app(
    config: Settings,
) -> Result<(AppState, TaskTracker, CancellationToken), anyhow::Error> {
    let reqwest_client = build_reqwest_client(Duration::from_secs(
        config.backend_settings.request_timeout_secs,
    ))?;

    // Spin wheel backend (real or in-memory based on config)
    #[cfg(any(feature = "e2e-testing", debug_assertions))]
    let api: Arc<dyn SpinWheelApi> = if config.backend_settings.mock_enabled {
        info!("In-memory spin wheel backend configured");
        Arc::new(InMemorySpinWheelApi::new())
    } else {
        build_backend_client(reqwest_client, &config)?
    };

    #[cfg(not(any(feature = "e2e-testing", debug_assertions)))]
    let api: Arc<dyn SpinWheelApi> = {
        if config.backend_settings.mock_enabled {
            return Err(anyhow!(
                "In-memory spin wheel backend requires e2e-testing feature or debug build"
            ));
        }
        build_backend_client(reqwest_client, &config)?
    };

    let policy = config.console_settings.activation_policy;
    let service = Arc::new(SpinWheelService::new(api, policy));
    info!("Spin wheel service configured (activation policy: {:?})", policy);

    let tracker = TaskTracker::new();
    let mut threads = HashMap::new();
    let cancel_token = CancellationToken::new();
    let session_sweeper = SessionSweeper::new(
        service.sessions().clone(),
        cancel_token.clone(),
        Duration::from_secs(config.console_settings.session_idle_secs),
        Duration::from_secs(config.console_settings.session_sweep_interval_secs),
    );
    let session_sweeper_task = tracker.spawn(async move {
        match session_sweeper.watch().await {
            Ok(_) => {
                info!("Successfully shutdown editor session sweeper")
            }
            Err(e) => {
                error!("Error in editor session sweeper: {}", e)
            }
        }
    });
    tracker.close();
    threads.insert(String::from("session_sweeper"), session_sweeper_task);

    let app_state = AppState {
        title: config.console_settings.title,
        service,
        background_threads: Arc::new(threads),
    };
    Ok((app_state, tracker, cancel_token))
}

fn build_backend_client(
    reqwest_client: ClientWithMiddleware,
    config: &Settings,
) -> Result<Arc<dyn SpinWheelApi>, anyhow::Error> {
    let base_url = Url::parse(&config.backend_settings.base_url)
        .map_err(|e| anyhow!("Failed to parse backend url: {}", e))?;
    let client = SpinWheelClient::new(
        reqwest_client,
        &base_url,
        config.backend_settings.api_token.clone(),
    );
    info!("Spin wheel backend configured at {}", client.base_url);
    Ok(Arc::new(client))
}

pub async fn build_server(
    socket_addr: SocketAddr,
    app_state: AppState,
    origins: Vec<String>,
) -> Result<
    Serve<
        TcpListener,
        IntoMakeServiceWithConnectInfo<Router, SocketAddr>,
        AddExtension<Router, ConnectInfo<SocketAddr>>,
    >,
    anyhow::Error,
> {
    let listener = TcpListener::bind(socket_addr).await?;

    info!("Setting up service");
    let app = app(app_state, origins);
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );
    info!(
        "Service running @: http://{}:{}",
        socket_addr.ip(),
        socket_addr.port()
    );
    Ok(server)
}

pub fn app(app_state: AppState, origins: Vec<String>) -> Router {
    let origins: Vec<HeaderValue> = origins
        .into_iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_origin(AllowOrigin::list(origins));

    let editor_routes = Router::new()
        .route("/{session_id}/name", post(rename_wheel_handler))
        .route("/{session_id}/active", post(set_active_handler))
        .route("/{session_id}/sections", post(add_section_handler))
        .route(
            "/{session_id}/sections/{index}/remove",
            post(remove_section_handler),
        )
        .route(
            "/{session_id}/sections/{index}/{field}",
            post(update_section_field_handler),
        )
        .route("/{session_id}/submit", post(submit_wheel_handler))
        .route("/{session_id}/discard", post(discard_editor_handler));

    // HTMX admin routes, pure server-side rendering
    let admin_htmx_routes = Router::new()
        .route("/", get(admin_page_handler))
        .route("/wheels/rows", get(wheel_rows_fragment))
        .route("/wheels/new", get(new_editor_handler))
        .route("/wheels/{wheel_id}", get(wheel_detail_fragment))
        .route("/wheels/{wheel_id}/edit", get(edit_wheel_handler))
        .route("/wheels/{wheel_id}/spin", post(test_spin_handler))
        .route("/wheels/{wheel_id}/delete", post(delete_wheel_handler))
        .route("/records", get(records_fragment))
        .nest("/editor", editor_routes);

    Router::new()
        .route("/", get(admin_page_handler))
        .nest("/admin", admin_htmx_routes)
        .route("/api/v1/health_check", get(health))
        .layer(middleware::from_fn(log_request))
        .with_state(Arc::new(app_state))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default();
    info!(target: "http_request","new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, code: {}, time: {}", response.status().as_str(), response_time);

    response
}

/// Backend calls are never retried: a replayed create or deactivate is not harmless
pub fn build_reqwest_client(timeout: Duration) -> Result<ClientWithMiddleware, anyhow::Error> {
    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| anyhow!("Failed to build http client: {}", e))?;
    Ok(ClientBuilder::new(client).with(LoggingMiddleware).build())
}

struct LoggingMiddleware;

#[async_trait::async_trait]
impl Middleware for LoggingMiddleware {
    async fn handle(
        &self,
        req: reqwest::Request,
        extensions: &mut Extensions,
        next: reqwest_middleware::Next<'_>,
    ) -> reqwest_middleware::Result<reqwest::Response> {
        let method = req.method().clone();
        let url = req.url().clone();

        info!("Making {} request to: {}", method, url);

        let result = next.run(req, extensions).await;

        match &result {
            Ok(response) => {
                info!("{} {} -> Status: {}", method, url, response.status());
            }
            Err(error) => {
                warn!("{} {} -> Error: {:?}", method, url, error);
            }
        }

        result
    }
}

async fn shutdown_signal() {
    let mut sigint = signal(SignalKind::interrupt()).expect("Failed to install SIGINT handler");
    let mut sigterm = signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");

    select! {
        _ = sigint.recv() => info!("Received SIGINT signal"),
        _ = sigterm.recv() => info!("Received SIGTERM signal"),
    }
}
