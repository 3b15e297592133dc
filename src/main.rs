use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use itertools::Itertools;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::config::Config;
use crate::dataset::Dataset;
use crate::engine::timetable::{Clock, Day, DepartureTime, ScheduleBoard};
use crate::engine::{geometry, grouping};
use crate::render::Renderer;
use crate::server::AppState;

mod config;
mod dataset;
mod engine;
mod markup;
mod model;
mod render;
mod server;
mod utils;

/// Shuttle bus route map: stop markers, route lines and departure times
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Route file, overrides ROUTES_PATH
    #[arg(long, global = true)]
    routes: Option<PathBuf>,

    /// Listen address, overrides BIND_ADDR
    #[arg(long, global = true)]
    bind: Option<SocketAddr>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List routes, optionally only those of a district
    Routes {
        #[arg(long)]
        district: Option<String>,
    },
    /// List the districts routes belong to
    Districts,
    /// Print stops and the timetable of a route
    Show {
        id: String,
        /// Pretend it's this time of day (HH:MM)
        #[arg(long)]
        at: Option<DepartureTime>,
    },
    /// Print the map payload of a route as JSON
    Render { id: String },
    /// Serve the map payloads over HTTP
    Serve,
}

fn init_tracing(config: &Config) -> WorkerGuard {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let appender = tracing_appender::rolling::daily(&config.log_dir, "shuttle_map.log");
    let (non_blocking_appender, guard) = tracing_appender::non_blocking(appender);

    // A layer that logs events to rolling files.
    let file_log = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_appender)
        .with_ansi(false)
        .pretty();

    // stdout is reserved for command output
    let console_log = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    Registry::default()
        .with(file_log)
        .with(console_log)
        .with(env_filter)
        .init();

    guard
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    _ = dotenv();
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(routes) = cli.routes {
        config.routes_path = routes;
    }
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }

    let _guard = init_tracing(&config);

    let dataset = Dataset::load(&config.routes_path)
        .with_context(|| format!("loading {}", config.routes_path.display()))?;

    let clock = match &cli.command {
        Command::Show { at: Some(at), .. } => Clock::fixed(config.timezone, at.minutes()),
        _ => Clock::new(config.timezone),
    };
    let renderer = Renderer::new(config.render_settings(), clock);

    match cli.command {
        Command::Routes { district } => {
            for route in renderer.districts().filter(dataset.routes(), district.as_deref()) {
                let summary = renderer.summary(route);
                println!(
                    "{}\t{}\t{}",
                    summary.id,
                    summary.name,
                    summary.district.unwrap_or_default()
                );
            }
        }
        Command::Districts => {
            for district in renderer.districts().districts(dataset.routes()) {
                println!("{district}");
            }
        }
        Command::Show { id, .. } => show(&dataset, &renderer, &id)?,
        Command::Render { id } => {
            let Some(route) = dataset.get(&id) else {
                bail!("unknown route {id}");
            };
            println!("{}", serde_json::to_string_pretty(&renderer.render_route(route))?);
        }
        Command::Serve => {
            info!("serving {} routes", dataset.routes().len());

            let state = Arc::new(AppState { dataset, renderer });
            server::serve(state, config.bind_addr).await?;
        }
    }

    Ok(())
}

fn show(dataset: &Dataset, renderer: &Renderer, id: &str) -> Result<()> {
    let Some(route) = dataset.get(id) else {
        bail!("unknown route {id}");
    };

    println!("{}", route.name);
    if !route.description.is_empty() {
        println!("{}", route.description);
    }
    println!("배차 간격: {}", route.interval.as_deref().unwrap_or("정보 없음"));
    println!();

    for (i, station) in route.stations.iter().enumerate() {
        println!("{:>3}. {}", i + 1, markup::station_name(station));
    }

    let groups = grouping::group(&route.stations);
    let shared = groups
        .iter()
        .filter(|g| g.len() > 1)
        .map(|g| g.members.iter().map(|m| m.index).join("/"))
        .collect_vec();
    println!();
    println!(
        "{} locations, {} path points",
        groups.len(),
        geometry::build_path(&route.stations).len()
    );
    if !shared.is_empty() {
        println!("shared locations: {}", shared.join(", "));
    }

    if let Some(board) = renderer.schedule_board(route) {
        println!();
        print_board(&board);
    }

    Ok(())
}

fn print_board(board: &ScheduleBoard) {
    match &board.next {
        Some(next) => println!(
            "다음 출발 시간: {}{}",
            next.time,
            if next.day == Day::Tomorrow { " (내일)" } else { "" }
        ),
        None => {
            println!("출발 시간표 정보가 없습니다.");
            return;
        }
    }

    for (label, slots) in [("오전", &board.morning), ("오후", &board.afternoon)] {
        if slots.is_empty() {
            continue;
        }

        let times = slots
            .iter()
            .map(|s| match (s.is_next, s.is_past) {
                (true, _) => format!("[{}]", s.time),
                (false, true) => format!("({})", s.time),
                (false, false) => s.time.to_string(),
            })
            .join(" ");
        println!("{label}: {times}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_parse_on_either_side_of_the_subcommand() {
        let addr: SocketAddr = "0.0.0.0:3000".parse().unwrap();

        let cli = Cli::try_parse_from(["shuttle_map", "serve", "--bind", "0.0.0.0:3000"]).unwrap();
        assert_eq!(cli.bind, Some(addr));
        assert!(matches!(cli.command, Command::Serve));

        let cli = Cli::try_parse_from(["shuttle_map", "--bind", "0.0.0.0:3000", "routes", "--routes", "r.json"])
            .unwrap();
        assert_eq!(cli.bind, Some(addr));
        assert_eq!(cli.routes, Some(PathBuf::from("r.json")));
        assert!(matches!(cli.command, Command::Routes { district: None }));

        let cli = Cli::try_parse_from(["shuttle_map", "districts"]).unwrap();
        assert_eq!(cli.bind, None);

        assert!(Cli::try_parse_from(["shuttle_map", "serve", "--bind", "nowhere"]).is_err());
    }
}
