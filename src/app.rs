use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, MethodRouter},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{TokenError, TokenService};
use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::handlers::{comments, follow, groups, jwt, posts, system};
use crate::middleware::jwt_auth_middleware;
use crate::services::{CommentService, FollowService, GroupService, PostService};

/// Shared per-process state. Everything in it is cheap to clone.
#[derive(Clone, Debug)]
pub struct AppState {
    pub db: DatabaseManager,
    pub tokens: TokenService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: DatabaseManager, config: AppConfig) -> Result<Self, TokenError> {
        let tokens = TokenService::new(&config.security)?;
        Ok(Self { db, tokens, config: Arc::new(config) })
    }

    pub fn posts(&self) -> PostService {
        PostService::new(self.db.pool().clone())
    }

    pub fn groups(&self) -> GroupService {
        GroupService::new(self.db.pool().clone())
    }

    pub fn comments(&self) -> CommentService {
        CommentService::new(self.db.pool().clone())
    }

    pub fn follows(&self) -> FollowService {
        FollowService::new(self.db.pool().clone())
    }
}

/// Build the full router with middleware applied
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .merge(api_routes())
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
                .layer(from_fn_with_state(state.clone(), jwt_auth_middleware)),
        );

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn api_routes() -> Router<AppState> {
    let routes = [
        ("/api/v1/posts", endpoint(get(posts::list).post(posts::create))),
        (
            "/api/v1/posts/:post_id",
            endpoint(get(posts::retrieve).put(posts::update).patch(posts::partial_update).delete(posts::destroy)),
        ),
        ("/api/v1/groups", endpoint(get(groups::list))),
        ("/api/v1/groups/:id", endpoint(get(groups::retrieve))),
        (
            "/api/v1/posts/:post_id/comments",
            endpoint(get(comments::list).post(comments::create)),
        ),
        (
            "/api/v1/posts/:post_id/comments/:id",
            endpoint(
                get(comments::retrieve)
                    .put(comments::update)
                    .patch(comments::partial_update)
                    .delete(comments::destroy),
            ),
        ),
        ("/api/v1/follow", endpoint(get(follow::list).post(follow::create))),
        ("/api/v1/jwt/create", endpoint(post(jwt::create))),
        ("/api/v1/jwt/refresh", endpoint(post(jwt::refresh))),
        ("/api/v1/jwt/verify", endpoint(post(jwt::verify))),
    ];

    // Every endpoint answers with and without the trailing slash. Post routes
    // share the `:post_id` segment name so the comment routes can nest under it.
    routes.into_iter().fold(Router::new(), |router, (path, methods)| {
        router.route(path, methods.clone()).route(&format!("{}/", path), methods)
    })
}

/// Unsupported methods on a known path get a JSON 405
fn endpoint(methods: MethodRouter<AppState>) -> MethodRouter<AppState> {
    methods.fallback(method_not_allowed)
}

async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::method_not_allowed(method.as_str())
}

async fn not_found() -> ApiError {
    ApiError::not_found()
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}
