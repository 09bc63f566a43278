//! HTTP route handlers.

use std::path::Path;

use askama::Template;
use axum::{
    Json, Router,
    extract::{Path as UrlPath, Query, State, rejection::QueryRejection},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::cities::City;
use crate::gbfs::{FeedSource, GbfsError};
use crate::geo::Point;
use crate::network::NetworkSnapshot;

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router<S>(state: AppState<S>, static_dir: impl AsRef<Path>) -> Router
where
    S: FeedSource + Send + 'static,
{
    Router::new()
        .route("/", get(index_page::<S>))
        .route("/health", get(health))
        .route("/api/cities", get(list_cities::<S>))
        .route("/city/:slug", get(network_page::<S>))
        .route("/city/:slug/station/:station_id", get(station_page::<S>))
        .route("/city/:slug/nearest", get(nearest_station::<S>))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Index page with the city list.
async fn index_page<S>(State(state): State<AppState<S>>) -> impl IntoResponse {
    let template = IndexTemplate {
        cities: state.cities.iter().map(CityView::from_city).collect(),
    };
    Html(
        template
            .render()
            .unwrap_or_else(|e| format!("Template error: {}", e)),
    )
}

/// List configured cities.
async fn list_cities<S>(State(state): State<AppState<S>>) -> Json<CitiesResponse> {
    Json(CitiesResponse {
        cities: state.cities.iter().map(CityResult::from_city).collect(),
    })
}

/// Check if request accepts HTML.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Turn a handler result into a response, rendering errors as a page for
/// browsers and as JSON otherwise.
fn respond(html: bool, result: Result<Response, AppError>) -> Response {
    match result {
        Ok(response) => response,
        Err(e) if html => e.into_html_response(),
        Err(e) => e.into_response(),
    }
}

fn render(template: &impl Template) -> Result<Response, AppError> {
    let html = template.render().map_err(|e| AppError::Internal {
        message: format!("Template error: {}", e),
    })?;
    Ok(Html(html).into_response())
}

fn find_city<'a, S>(state: &'a AppState<S>, slug: &str) -> Result<&'a City, AppError> {
    state.cities.get(slug).ok_or_else(|| AppError::NotFound {
        message: format!("Ville inconnue : {slug}"),
    })
}

async fn load_snapshot<S: FeedSource>(
    state: &AppState<S>,
    city: &City,
) -> Result<NetworkSnapshot, AppError> {
    NetworkSnapshot::load(&*state.gbfs, &city.discovery_url, state.language())
        .await
        .map_err(|e| {
            warn!(city = %city.name, error = %e, "failed to load network");
            AppError::from(e)
        })
}

/// Network overview: name, freshness and station list.
async fn network_page<S: FeedSource>(
    State(state): State<AppState<S>>,
    UrlPath(slug): UrlPath<String>,
    headers: HeaderMap,
) -> Response {
    let html = accepts_html(&headers);
    respond(html, network_inner(&state, &slug, html).await)
}

async fn network_inner<S: FeedSource>(
    state: &AppState<S>,
    slug: &str,
    html: bool,
) -> Result<Response, AppError> {
    let city = find_city(state, slug)?;
    let snapshot = load_snapshot(state, city).await?;

    if html {
        render(&NetworkTemplate {
            city: CityView::from_city(city),
            network: NetworkView::from_snapshot(&snapshot),
        })
    } else {
        Ok(Json(NetworkResponse::from_snapshot(city, &snapshot)).into_response())
    }
}

/// Station detail.
async fn station_page<S: FeedSource>(
    State(state): State<AppState<S>>,
    UrlPath((slug, station_id)): UrlPath<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let html = accepts_html(&headers);
    respond(html, station_inner(&state, &slug, &station_id, html).await)
}

async fn station_inner<S: FeedSource>(
    state: &AppState<S>,
    slug: &str,
    station_id: &str,
    html: bool,
) -> Result<Response, AppError> {
    let city = find_city(state, slug)?;
    let snapshot = load_snapshot(state, city).await?;
    let station = snapshot
        .station(station_id)
        .ok_or_else(|| AppError::NotFound {
            message: format!("Station inconnue : {station_id}"),
        })?;

    if html {
        render(&StationTemplate {
            city: CityView::from_city(city),
            network_name: snapshot.name.clone(),
            station: StationView::from_station(station),
            distance: None,
        })
    } else {
        Ok(Json(StationResult::from_station(station)).into_response())
    }
}

/// Nearest station to the user's position.
async fn nearest_station<S: FeedSource>(
    State(state): State<AppState<S>>,
    UrlPath(slug): UrlPath<String>,
    headers: HeaderMap,
    query: Result<Query<NearestRequest>, QueryRejection>,
) -> Response {
    let html = accepts_html(&headers);
    let result = match query {
        Ok(Query(req)) => nearest_inner(&state, &slug, req, html).await,
        Err(rejection) => Err(AppError::BadRequest {
            message: format!("Position invalide : {}", rejection.body_text()),
        }),
    };
    respond(html, result)
}

async fn nearest_inner<S: FeedSource>(
    state: &AppState<S>,
    slug: &str,
    req: NearestRequest,
    html: bool,
) -> Result<Response, AppError> {
    let origin = Point::parse(req.lat, req.lon).map_err(|e| AppError::BadRequest {
        message: format!("Position invalide : {e}"),
    })?;

    let city = find_city(state, slug)?;
    let snapshot = load_snapshot(state, city).await?;
    let found = snapshot.nearest(origin).ok_or_else(|| AppError::NotFound {
        message: format!("Aucune station pour {}", city.name),
    })?;

    if html {
        render(&StationTemplate {
            city: CityView::from_city(city),
            network_name: snapshot.name.clone(),
            station: StationView::from_station(found.item),
            distance: Some(format_distance(found.distance_km)),
        })
    } else {
        Ok(Json(NearestResponse {
            station: StationResult::from_station(found.item),
            distance_km: found.distance_km,
        })
        .into_response())
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    /// The publisher's feeds could not be fetched or are incomplete.
    Upstream { message: String },
    Internal { message: String },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::Upstream { message }
            | AppError::Internal { message } => message,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            AppError::BadRequest { .. } => "Requête invalide",
            AppError::NotFound { .. } => "Introuvable",
            AppError::Upstream { .. } => "Réseau indisponible",
            AppError::Internal { .. } => "Erreur interne",
        }
    }

    fn log(&self) {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, message = self.message(), "request failed");
        } else {
            warn!(%status, message = self.message(), "request rejected");
        }
    }

    /// Render the error as a page.
    pub fn into_html_response(self) -> Response {
        self.log();

        let status = self.status();
        let template = ErrorTemplate {
            title: self.title().to_string(),
            message: self.message().to_string(),
        };
        let body = template
            .render()
            .unwrap_or_else(|e| format!("Template error: {}", e));

        (status, Html(body)).into_response()
    }
}

impl From<GbfsError> for AppError {
    fn from(e: GbfsError) -> Self {
        let message = if e.is_not_found() {
            format!("Le flux GBFS de ce réseau est incomplet : {e}")
        } else {
            format!("Impossible de récupérer les données du réseau : {e}")
        };
        AppError::Upstream { message }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.message().to_string(),
        });
        (status, body).into_response()
    }
}
