//! HTTP endpoints feeding the map front-end
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::dataset::Dataset;
use crate::render::{Overview, RouteRender, RouteSummary, Renderer};

pub struct AppState {
    pub dataset: Dataset,
    pub renderer: Renderer,
}

#[derive(Debug, Default, Deserialize)]
pub struct DistrictQuery {
    pub district: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/districts", get(districts))
        .route("/api/routes", get(routes))
        .route("/api/routes/{id}", get(route))
        .route("/api/routes/{id}/info", get(route_info))
        .route("/api/overview", get(overview))
        .with_state(state)
}

#[tracing::instrument(err, skip(state))]
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> Result<(), Error> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("couldn't bind {addr}"))?;

    info!("listening on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    Ok(())
}

async fn districts(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.renderer.districts().districts(state.dataset.routes()))
}

async fn routes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DistrictQuery>,
) -> Json<Vec<RouteSummary>> {
    let routes = state
        .renderer
        .districts()
        .filter(state.dataset.routes(), query.district.as_deref())
        .into_iter()
        .map(|r| state.renderer.summary(r))
        .collect();

    Json(routes)
}

async fn route(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RouteRender>, StatusCode> {
    let Some(route) = state.dataset.get(&id) else {
        warn!("unknown route {id}");
        return Err(StatusCode::NOT_FOUND);
    };

    Ok(Json(state.renderer.render_route(route)))
}

async fn route_info(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let Some(route) = state.dataset.get(&id) else {
        warn!("unknown route {id}");
        return Err(StatusCode::NOT_FOUND);
    };

    Ok(Html(state.renderer.route_info(route)))
}

async fn overview(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DistrictQuery>,
) -> Json<Overview> {
    Json(
        state
            .renderer
            .overview(state.dataset.routes(), query.district.as_deref()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::timetable::Clock;
    use crate::render::RenderSettings;

    fn state() -> Arc<AppState> {
        let dataset = Dataset::from_json(
            r#"[
                { "id": "songpa-1", "name": "송파구 임시1번", "stations": [
                    { "name": "잠실역", "lat": 37.5133, "lng": 127.1001 },
                    { "name": "석촌호수", "lat": 37.5090, "lng": 127.1040 }
                ], "schedule": ["08:00", "18:00"] },
                { "id": "gangnam-1", "name": "강남구 셔틀", "stations": [] }
            ]"#,
        )
        .unwrap();

        Arc::new(AppState {
            dataset,
            renderer: Renderer::new(RenderSettings::default(), Clock::fixed(chrono_tz::Asia::Seoul, 9 * 60)),
        })
    }

    #[tokio::test]
    async fn test_districts() {
        let Json(districts) = districts(State(state())).await;

        assert_eq!(districts, ["강남구", "송파구"]);
    }

    #[tokio::test]
    async fn test_routes_filtered_by_district() {
        let query = DistrictQuery {
            district: Some("강남구".to_string()),
        };

        let Json(summaries) = routes(State(state()), Query(query)).await;

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, "gangnam-1");
        assert_eq!(summaries[0].color, "#667eea");
    }

    #[tokio::test]
    async fn test_route() {
        let Json(render) = route(State(state()), Path("songpa-1".to_string())).await.unwrap();

        assert_eq!(render.markers.len(), 2);
        assert_eq!(render.polyline.unwrap().path.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let err = route(State(state()), Path("nope".to_string())).await.unwrap_err();
        assert_eq!(err, StatusCode::NOT_FOUND);

        let err = route_info(State(state()), Path("nope".to_string())).await.unwrap_err();
        assert_eq!(err, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_route_info() {
        let Html(html) = route_info(State(state()), Path("songpa-1".to_string())).await.unwrap();

        assert!(html.contains("다음 출발 시간"));
        assert!(html.contains("18:00"));
    }

    #[tokio::test]
    async fn test_overview() {
        let Json(overview) = overview(State(state()), Query(DistrictQuery::default())).await;

        assert_eq!(overview.routes.len(), 2);
        assert!(overview.district.is_none());
        assert!(overview.bounds.is_some());
    }
}
