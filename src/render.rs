//! Assembles everything the map front-end draws for a route.

use serde::Serialize;

use crate::engine::district::DistrictClassifier;
use crate::engine::geometry::{self, Bounds};
use crate::engine::grouping;
use crate::engine::timetable::{self, Clock, ScheduleBoard};
use crate::markup::{self, IconCache};
use crate::model::{LatLng, Route};

const MARKER_Z_INDEX: usize = 1000;

#[derive(Clone, Debug)]
pub struct RenderSettings {
    pub offset_distance: f64,
    pub default_color: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            offset_distance: grouping::DEFAULT_OFFSET_DISTANCE,
            default_color: crate::model::DEFAULT_ROUTE_COLOR.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Marker {
    /// 1-based stop number
    pub index: usize,
    pub title: String,
    pub position: LatLng,
    pub icon: String,
    pub z_index: usize,
    pub group_size: usize,
    pub popup: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Polyline {
    pub path: Vec<LatLng>,
    pub stroke_color: String,
    pub stroke_weight: u32,
    pub stroke_opacity: f64,
    pub stroke_style: &'static str,
}

#[derive(Clone, Debug, Serialize)]
pub struct RouteRender {
    pub id: String,
    pub name: String,
    pub color: String,
    pub district: Option<String>,
    pub markers: Vec<Marker>,
    pub polyline: Option<Polyline>,
    pub bounds: Option<Bounds>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RouteSummary {
    pub id: String,
    pub name: String,
    pub color: String,
    pub district: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Overview {
    pub district: Option<String>,
    pub routes: Vec<RouteRender>,
    pub bounds: Option<Bounds>,
    pub info: String,
}

/// Owns the caches shared by every render
#[derive(Debug)]
pub struct Renderer {
    settings: RenderSettings,
    clock: Clock,
    icons: IconCache,
    districts: DistrictClassifier,
}

impl Renderer {
    pub fn new(settings: RenderSettings, clock: Clock) -> Self {
        Renderer {
            settings,
            clock,
            icons: IconCache::new(),
            districts: DistrictClassifier::new(),
        }
    }

    pub fn districts(&self) -> &DistrictClassifier {
        &self.districts
    }

    fn color<'a>(&'a self, route: &'a Route) -> &'a str {
        route.color_or(&self.settings.default_color)
    }

    pub fn summary(&self, route: &Route) -> RouteSummary {
        RouteSummary {
            id: route.id.clone(),
            name: route.name.clone(),
            color: self.color(route).to_string(),
            district: self.districts.classify(&route.name),
        }
    }

    pub fn render_route(&self, route: &Route) -> RouteRender {
        let color = self.color(route);

        let groups = grouping::group(&route.stations);
        let markers: Vec<Marker> = grouping::place(&groups, self.settings.offset_distance)
            .into_iter()
            .map(|p| Marker {
                index: p.index,
                title: markup::station_name(p.station),
                position: p.position,
                icon: self.icons.get(color, p.index).to_string(),
                z_index: MARKER_Z_INDEX + p.index,
                group_size: p.group_size,
                popup: markup::info_window_html(p.station, route, color, p.group_size),
            })
            .collect();

        let path = geometry::build_path(&route.stations);
        let polyline = (!path.is_empty()).then(|| Polyline {
            path,
            stroke_color: color.to_string(),
            stroke_weight: 5,
            stroke_opacity: 0.8,
            stroke_style: "solid",
        });

        RouteRender {
            id: route.id.clone(),
            name: route.name.clone(),
            color: color.to_string(),
            district: self.districts.classify(&route.name),
            bounds: geometry::bounds(markers.iter().map(|m| m.position)),
            markers,
            polyline,
        }
    }

    /// `None` when the route has no timetable at all
    pub fn schedule_board(&self, route: &Route) -> Option<ScheduleBoard> {
        if !route.has_timetable() {
            return None;
        }

        let times =
            timetable::canonical_timetable(route.schedule.as_deref(), route.schedule_by_vehicle.as_ref());

        Some(ScheduleBoard::build(&times, self.clock.now_minutes()))
    }

    pub fn route_info(&self, route: &Route) -> String {
        let board = self.schedule_board(route);

        markup::route_info_html(route, self.color(route), board.as_ref())
    }

    /// Every route of `district` (all routes without one) and the viewport fitting them
    pub fn overview(&self, routes: &[Route], district: Option<&str>) -> Overview {
        let district = district.filter(|d| !d.is_empty());
        let routes: Vec<RouteRender> = self
            .districts
            .filter(routes, district)
            .into_iter()
            .map(|r| self.render_route(r))
            .collect();

        let bounds = routes
            .iter()
            .filter_map(|r| r.bounds)
            .reduce(Bounds::union);

        Overview {
            district: district.map(str::to_string),
            bounds,
            info: markup::overview_html(district, routes.len()),
            routes,
        }
    }
}
