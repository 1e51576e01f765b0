/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_api::{app::AppState, config::Config};
/// use taskboard_shared::store::MemoryStore;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = taskboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use taskboard_shared::{auth::middleware::authenticate, store::Store};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete router
///
/// ```text
/// /
/// ├── GET /health                        public
/// └── /v1/
///     ├── /auth/                         public
///     │   ├── POST /sign-in
///     │   └── POST /refresh
///     ├── /users/                        bearer token
///     │   ├── GET /me
///     │   ├── GET /lookup?email=
///     │   └── GET /:id
///     ├── /employees/                    bearer token
///     │   ├── GET    /
///     │   ├── DELETE /:id
///     │   └── GET    /by-status/:status
///     ├── /tasks/                        bearer token
///     │   ├── GET, POST /
///     │   ├── GET, PATCH, DELETE /:id
///     │   ├── PUT /:id/status
///     │   └── PUT /:id/assignee
///     └── /dashboard/                    bearer token
///         ├── GET /stats
///         └── GET /employees
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/sign-in", post(routes::auth::sign_in))
        .route("/refresh", post(routes::auth::refresh));

    let user_routes = Router::new()
        .route("/me", get(routes::users::me))
        .route("/lookup", get(routes::users::lookup_by_email))
        .route("/:id", get(routes::users::get_profile));

    let employee_routes = Router::new()
        .route("/", get(routes::employees::list_employees))
        .route("/:id", axum::routing::delete(routes::employees::delete_employee))
        .route("/by-status/:status", get(routes::employees::by_task_status));

    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks).post(routes::tasks::create_task))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/:id/status", put(routes::tasks::update_status))
        .route("/:id/assignee", put(routes::tasks::assign_task));

    let dashboard_routes = Router::new()
        .route("/stats", get(routes::dashboard::task_stats))
        .route("/employees", get(routes::dashboard::employee_summary));

    let protected = Router::new()
        .nest("/users", user_routes)
        .nest("/employees", employee_routes)
        .nest("/tasks", task_routes)
        .nest("/dashboard", dashboard_routes)
        .layer(middleware::from_fn_with_state(state.clone(), jwt_auth_layer));

    let v1_routes = Router::new().nest("/auth", auth_routes).merge(protected);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Validates the bearer token and injects `AuthContext` into the request
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let context = authenticate(req.headers(), state.jwt_secret())?;
    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}
