//! HTML fragments for the map front-end: marker icons, stop popups and the route info panel.
//!
//! All dataset text goes through [`escape_html`] before it lands in markup.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::{Arc, Mutex};

use crate::engine::timetable::{Day, ScheduleBoard, Slot};
use crate::model::{Route, Station};
use crate::utils::escape_html;

pub const MARKER_SIZE: u32 = 30;

/// Name to show for a stop. Unnamed stops fall back to their external id.
pub fn station_name(station: &Station) -> String {
    match (&station.name, &station.station_id) {
        (Some(name), _) if !name.is_empty() => name.clone(),
        (_, Some(id)) if !id.is_empty() => format!("정류소 ID: {id}"),
        _ => "정류소".to_string(),
    }
}

/// Numbered circle markup, one per (color, stop number). Shared across renders.
#[derive(Debug, Default)]
pub struct IconCache {
    icons: Mutex<HashMap<(String, usize), Arc<str>>>,
}

impl IconCache {
    pub fn new() -> Self {
        IconCache::default()
    }

    pub fn get(&self, color: &str, index: usize) -> Arc<str> {
        let key = (color.to_string(), index);

        if let Some(icon) = self.icons.lock().ok().and_then(|icons| icons.get(&key).cloned()) {
            return icon;
        }

        let icon: Arc<str> = marker_icon_html(color, index).into();

        if let Ok(mut icons) = self.icons.lock() {
            icons.entry(key).or_insert_with(|| icon.clone());
        }

        icon
    }

    pub fn len(&self) -> usize {
        self.icons.lock().map(|i| i.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn marker_icon_html(color: &str, index: usize) -> String {
    format!(
        r#"<div class="stop-marker" style="background-color: {color}; width: {size}px; height: {size}px; border-radius: 50%; border: 3px solid white; box-shadow: 0 2px 8px rgba(0,0,0,0.3); display: flex; align-items: center; justify-content: center; color: white; font-weight: bold; font-size: 12px;">{index}</div>"#,
        color = escape_html(color),
        size = MARKER_SIZE,
    )
}

/// Popup shown when a stop marker is clicked
pub fn info_window_html(station: &Station, route: &Route, color: &str, group_size: usize) -> String {
    let mut html = format!(
        r#"<div class="stop-info"><strong style="color: {};">{}</strong><br>"#,
        escape_html(color),
        escape_html(&station_name(station)),
    );

    // without a name the id is already the title
    match (&station.name, &station.station_id) {
        (Some(name), Some(id)) if !name.is_empty() => {
            _ = write!(html, r#"<span class="stop-id">정류소 ID: {}</span><br>"#, escape_html(id));
        }
        _ => {}
    }

    if group_size > 1 {
        _ = write!(html, r#"<span class="stop-shared">같은 위치에 {group_size}개 정류소</span><br>"#);
    }

    _ = write!(html, r#"<span class="route-name">{}</span></div>"#, escape_html(&route.name));

    html
}

fn time_card(slot: &Slot, color: &str) -> String {
    let mut class = String::from("time-card");
    if slot.is_next {
        class.push_str(" next-departure");
    }
    if slot.is_past {
        class.push_str(" past");
    }

    let style = if slot.is_next {
        format!("background: {}; color: white;", escape_html(color))
    } else {
        String::new()
    };
    let badge = if slot.is_next {
        r#"<span class="next-badge">다음</span>"#
    } else {
        ""
    };
    let time = escape_html(slot.time.label());

    format!(r#"<div class="{class}" style="{style}" title="{time}">{time}{badge}</div>"#)
}

fn time_group(label: &str, slots: &[Slot], color: &str) -> String {
    if slots.is_empty() {
        return String::new();
    }

    let cards: String = slots.iter().map(|s| time_card(s, color)).collect();

    format!(
        r#"<div class="time-group"><div class="time-group-label">{label}</div><div class="time-cards">{cards}</div></div>"#
    )
}

/// Next departure banner plus the AM/PM grid of every departure
pub fn schedule_html(board: &ScheduleBoard, color: &str) -> String {
    if board.is_empty() {
        return r#"<p class="no-schedule">출발 시간표 정보가 없습니다.</p>"#.to_string();
    }

    let color_attr = escape_html(color);
    let next = match &board.next {
        Some(next) => format!(
            r#"<div class="next-departure-info" style="border-left: 4px solid {color_attr};"><strong>다음 출발 시간:</strong> <span class="next-time" style="color: {color_attr};">{}</span>{}</div>"#,
            escape_html(next.time.label()),
            match next.day {
                Day::Today => "",
                Day::Tomorrow => r#"<span class="tomorrow"> (내일)</span>"#,
            },
        ),
        None => String::new(),
    };

    format!(
        r#"<div class="schedule-section">{next}<div class="schedule-grid">{}{}</div></div>"#,
        time_group("오전", &board.morning, color),
        time_group("오후", &board.afternoon, color),
    )
}

/// Detail panel of a selected route. `board` is `None` for routes without any timetable.
pub fn route_info_html(route: &Route, color: &str, board: Option<&ScheduleBoard>) -> String {
    let color_attr = escape_html(color);

    let stops: String = route
        .stations
        .iter()
        .enumerate()
        .map(|(i, station)| {
            let id = match (&station.name, &station.station_id) {
                (Some(name), Some(id)) if !name.is_empty() => {
                    format!(r#" <span class="stop-id">(ID: {})</span>"#, escape_html(id))
                }
                _ => String::new(),
            };
            format!(
                "<li><strong>{}.</strong> {}{id}</li>",
                i + 1,
                escape_html(&station_name(station))
            )
        })
        .collect();

    let schedule = board
        .map(|b| format!(r#"<div class="schedule-container">{}</div>"#, schedule_html(b, color)))
        .unwrap_or_default();

    format!(
        r#"<h3 style="color: {color_attr};">{}</h3><div class="route-details"><p><strong>설명:</strong> {}</p><p><strong>배차 간격:</strong> {}</p>{schedule}<p><strong>경유지:</strong></p><ul>{stops}</ul></div>"#,
        escape_html(&route.name),
        escape_html(&route.description),
        escape_html(route.interval.as_deref().unwrap_or("정보 없음")),
    )
}

/// Panel shown when no single route is selected
pub fn overview_html(district: Option<&str>, route_count: usize) -> String {
    let title = match district {
        Some(d) if !d.is_empty() => format!("{} 전체 노선", escape_html(d)),
        _ => "전체 노선".to_string(),
    };

    format!(
        "<h3>{title}</h3><p>현재 <strong>{route_count}개</strong>의 셔틀 버스 노선이 운행 중입니다.</p><p>위의 드롭다운에서 특정 노선을 선택하면 상세 정보를 확인할 수 있습니다.</p>"
    )
}
