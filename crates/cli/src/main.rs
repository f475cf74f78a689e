//! Demo driver for the mixer engine: the "UI collaborator" as a terminal
//! tool. Builds layouts, replays scripted drag paths, and prints one JSON
//! line per engine emission so output can be piped into other tooling.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::fmt::SubscriberBuilder;

use barymix::prelude::*;

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Barycentric weight-mixer demo driver")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Build a layout and print the normalized anchors as JSON.
    Layout {
        /// Anchor count for an auto (regular polygon) layout.
        #[arg(long, conflicts_with = "anchors")]
        n: Option<usize>,
        /// Explicit anchors as a JSON array of [x, y] pairs.
        #[arg(long)]
        anchors: Option<String>,
        #[arg(long, default_value_t = DEFAULT_SIZE)]
        size: f64,
        /// Rotation in radians (auto layouts only).
        #[arg(long, default_value_t = 0.0)]
        rotate: f64,
        /// Boundary mode override: "polygon" or "box".
        #[arg(long)]
        boundary: Option<String>,
    },
    /// Replay a drag path through a mixer and print every emission.
    Simulate {
        #[arg(long, conflicts_with = "anchors")]
        n: Option<usize>,
        #[arg(long)]
        anchors: Option<String>,
        #[arg(long, default_value_t = DEFAULT_SIZE)]
        size: f64,
        #[arg(long, default_value_t = 0.0)]
        rotate: f64,
        #[arg(long)]
        boundary: Option<String>,
        /// Drag path as a JSON array of [x, y] pairs; the first point is the
        /// drag start, the rest are moves.
        #[arg(long)]
        path: String,
    },
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Layout {
            n,
            anchors,
            size,
            rotate,
            boundary,
        } => layout(n, anchors, size, rotate, boundary),
        Action::Simulate {
            n,
            anchors,
            size,
            rotate,
            boundary,
            path,
        } => simulate(n, anchors, size, rotate, boundary, path),
    }
}

#[derive(Deserialize)]
struct Pair(f64, f64);

fn parse_points(json: &str) -> Result<Vec<Vec2<f64>>> {
    let pairs: Vec<Pair> = serde_json::from_str(json).context("parsing [x, y] pair list")?;
    Ok(pairs.into_iter().map(|Pair(x, y)| Vec2::new(x, y)).collect())
}

fn parse_boundary(arg: Option<String>) -> Result<Option<BoundaryMode>> {
    match arg.as_deref() {
        None => Ok(None),
        Some("polygon") => Ok(Some(BoundaryMode::Polygon)),
        Some("box") => Ok(Some(BoundaryMode::Box)),
        Some(other) => bail!("unknown boundary mode {other:?} (use \"polygon\" or \"box\")"),
    }
}

fn build_mixer(
    n: Option<usize>,
    anchors: Option<String>,
    size: f64,
    rotate: f64,
    boundary: Option<String>,
) -> Result<Mixer> {
    let spec = match (n, anchors) {
        (Some(n), None) => LayoutSpec::Auto(n),
        (None, Some(json)) => LayoutSpec::Manual(parse_points(&json)?),
        _ => bail!("pass exactly one of --n or --anchors"),
    };
    let cfg = LayoutCfg {
        size,
        rotate,
        boundary: parse_boundary(boundary)?,
        ..LayoutCfg::default()
    };
    let registry = ScopeRegistry::new();
    Mixer::new(&spec, &cfg, registry.allocate()).context("building mixer")
}

fn layout(
    n: Option<usize>,
    anchors: Option<String>,
    size: f64,
    rotate: f64,
    boundary: Option<String>,
) -> Result<()> {
    let mixer = build_mixer(n, anchors, size, rotate, boundary)?;
    tracing::info!(n = mixer.anchors().len(), scope = %mixer.scope(), "layout");
    let anchors: Vec<serde_json::Value> = mixer
        .anchors()
        .iter()
        .map(|a| serde_json::json!([a.x, a.y]))
        .collect();
    let (vx, vy, vw, vh) = mixer.layout().view_box();
    println!(
        "{}",
        serde_json::json!({
            "scope": mixer.scope().to_string(),
            "anchors": anchors,
            "view_box": [vx, vy, vw, vh],
            "weights": mixer.weights().as_slice(),
        })
    );
    Ok(())
}

fn simulate(
    n: Option<usize>,
    anchors: Option<String>,
    size: f64,
    rotate: f64,
    boundary: Option<String>,
    path: String,
) -> Result<()> {
    let mut mixer = build_mixer(n, anchors, size, rotate, boundary)?;
    let path = parse_points(&path)?;
    if path.is_empty() {
        bail!("--path needs at least one point");
    }
    tracing::info!(n = mixer.anchors().len(), moves = path.len(), "simulate");

    let mut signals = vec![PointerSignal::Start(path[0])];
    signals.extend(path[1..].iter().map(|p| PointerSignal::Move(*p)));
    signals.push(PointerSignal::End);

    for signal in signals {
        if let Some(update) = mixer.input(signal) {
            println!(
                "{}",
                serde_json::json!({
                    "position": [update.position.x, update.position.y],
                    "weights": update.weights.as_slice(),
                })
            );
        }
    }
    Ok(())
}
