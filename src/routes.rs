use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Method, Request},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::{DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::{info_span, Level};
use uuid::Uuid;

use crate::api::taxonomy::{CreateTaxonomyItemRequest, ReorderRequest, UpdateTaxonomyItemRequest};
use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::{
    jwt_auth_middleware, recovery_middleware, request_id_middleware, AppJson, AppPath, AuthUser, RequestId,
};
use crate::state::AppState;
use crate::types::TaxonomyKind;

/// Full application router.
///
/// Layers, outermost first: request id, trace, panic recovery, CORS. Routes
/// under `/api` additionally pass the JWT layer.
pub fn app(state: AppState, security: &SecurityConfig) -> Router {
    let protected = Router::new()
        .merge(project_routes())
        .merge(project_member_routes())
        .merge(workspace_routes())
        .merge(board_routes())
        .merge(comment_routes())
        .merge(participant_routes())
        .merge(taxonomy_routes("stages", TaxonomyKind::Stage))
        .merge(taxonomy_routes("roles", TaxonomyKind::Role))
        .merge(taxonomy_routes("importances", TaxonomyKind::Importance))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(protected)
        .layer(cors_layer(security))
        .layer(from_fn(recovery_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(DefaultOnResponse::new().level(Level::INFO).latency_unit(LatencyUnit::Millis)),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

fn project_routes() -> Router<AppState> {
    use protected::{project, project_join_request};

    Router::new()
        .route("/api/projects", post(project::create))
        // static segments win over :project_id
        .route("/api/projects/search", get(project::search))
        .route("/api/projects/workspace/:workspace_id", get(project::list_by_workspace))
        .route("/api/projects/workspace/:workspace_id/default", get(project::get_default))
        .route(
            "/api/projects/:project_id",
            get(project::get).put(project::update).delete(project::delete),
        )
        .route("/api/projects/:project_id/init-settings", get(project::init_settings))
        .route("/api/projects/join-requests", post(project_join_request::create))
        .route("/api/projects/join-requests/:join_request_id", put(project_join_request::decide))
        .route("/api/projects/:project_id/join-requests", get(project_join_request::list))
}

fn project_member_routes() -> Router<AppState> {
    use protected::project_member;

    Router::new()
        .route("/api/projects/:project_id/members", get(project_member::list))
        .route(
            "/api/projects/:project_id/members/:member_id",
            delete(project_member::remove),
        )
        .route(
            "/api/projects/:project_id/members/:member_id/role",
            put(project_member::change_role),
        )
}

fn workspace_routes() -> Router<AppState> {
    use protected::workspace;

    Router::new()
        .route("/api/workspaces", get(workspace::list).post(workspace::create))
        .route("/api/workspaces/default", put(workspace::set_default))
        .route(
            "/api/workspaces/:workspace_id",
            get(workspace::get).put(workspace::update).delete(workspace::delete),
        )
        .route("/api/workspaces/:workspace_id/members", get(workspace::list_members))
        .route(
            "/api/workspaces/:workspace_id/members/:user_id",
            delete(workspace::remove_member),
        )
        .route(
            "/api/workspaces/:workspace_id/members/:user_id/role",
            put(workspace::change_member_role),
        )
        .route(
            "/api/workspaces/:workspace_id/join-requests",
            get(workspace::list_join_requests).post(workspace::create_join_request),
        )
        .route(
            "/api/workspaces/:workspace_id/join-requests/:request_id",
            put(workspace::decide_join_request),
        )
}

fn board_routes() -> Router<AppState> {
    use protected::board;

    Router::new()
        .route("/api/boards", post(board::create))
        .route("/api/boards/project/:project_id", get(board::list_by_project))
        .route(
            "/api/boards/:board_id",
            get(board::get).put(board::update).delete(board::delete),
        )
        .route("/api/boards/:board_id/field", put(board::update_field))
}

fn comment_routes() -> Router<AppState> {
    use protected::comment;

    Router::new()
        .route("/api/comments", post(comment::create))
        .route("/api/comments/board/:board_id", get(comment::list_by_board))
        .route(
            "/api/comments/:comment_id",
            put(comment::update).delete(comment::delete),
        )
}

fn participant_routes() -> Router<AppState> {
    use protected::participant;

    Router::new()
        .route("/api/participants", post(participant::add))
        .route("/api/participants/board/:board_id", get(participant::list_by_board))
        .route(
            "/api/participants/board/:board_id/user/:user_id",
            delete(participant::remove),
        )
}

/// One family of project taxonomy under `/api/projects/:project_id/{segment}`
fn taxonomy_routes(segment: &str, kind: TaxonomyKind) -> Router<AppState> {
    use protected::taxonomy;

    let collection = format!("/api/projects/:project_id/{}", segment);
    let order = format!("{}/order", collection);
    let item = format!("{}/:item_id", collection);

    Router::new()
        .route(
            &collection,
            get(move |state: State<AppState>, user: AuthUser, path: AppPath<Uuid>| {
                taxonomy::list(kind, state, user, path)
            })
            .post(
                move |state: State<AppState>,
                      user: AuthUser,
                      path: AppPath<Uuid>,
                      body: AppJson<CreateTaxonomyItemRequest>| {
                    taxonomy::create(kind, state, user, path, body)
                },
            ),
        )
        .route(
            &order,
            put(
                move |state: State<AppState>, user: AuthUser, path: AppPath<Uuid>, body: AppJson<ReorderRequest>| {
                    taxonomy::reorder(kind, state, user, path, body)
                },
            ),
        )
        .route(
            &item,
            get(move |state: State<AppState>, user: AuthUser, path: AppPath<(Uuid, Uuid)>| {
                taxonomy::get(kind, state, user, path)
            })
            .put(
                move |state: State<AppState>,
                      user: AuthUser,
                      path: AppPath<(Uuid, Uuid)>,
                      body: AppJson<UpdateTaxonomyItemRequest>| {
                    taxonomy::update(kind, state, user, path, body)
                },
            )
            .delete(move |state: State<AppState>, user: AuthUser, path: AppPath<(Uuid, Uuid)>| {
                taxonomy::delete(kind, state, user, path)
            }),
        )
}

/// Permissive when the origin list is empty or contains `*`
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let any_origin = security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*");
    if any_origin {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

fn request_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.as_str().to_string())
        .unwrap_or_default();

    info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}
