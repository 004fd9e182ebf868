//! Algoviz terminal demo
//!
//! Run a grid search on a random grid and print the result.
//!
//! Usage: `algoviz [astar|bfs] [config.json]`

use std::env;

use algoviz_playback::{render_grid, GalleryConfig, PlaybackEvent, Session};
use algoviz_trace::{SearchKind, Step};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse command line args
    let args: Vec<String> = env::args().collect();

    let kind = match args.get(1).map(String::as_str) {
        None | Some("astar") => SearchKind::AStar,
        Some("bfs") => SearchKind::BreadthFirst,
        Some(other) => {
            return Err(format!("unknown algorithm {other:?}; expected astar or bfs").into())
        }
    };

    let config = match args.get(2) {
        Some(path) => GalleryConfig::load(path)?,
        None => GalleryConfig::default(),
    };
    config.validate()?;

    let grid = config.grid()?;
    println!("Algoviz {kind} on a {}x{} grid", grid.width(), grid.height());
    println!("{}", render_grid(&grid, &[], &[]));

    let (mut session, mut events) = Session::channel(grid, config.speed_control()?);
    session.run(kind)?;

    let mut visited = Vec::new();
    while let Some(event) = events.recv().await {
        match event {
            PlaybackEvent::Step(step) => {
                if let Step::Expand { current, .. } | Step::Arrive { current, .. } = &step {
                    println!("  step {:>3}: {current}", step.frame());
                }
                if let Some(v) = step.visited() {
                    visited = v.to_vec();
                }
            }
            PlaybackEvent::Complete(completion) => {
                let path = completion.path().unwrap_or_default();
                println!();
                println!("{:?} after {} steps", completion.status, completion.steps_delivered);
                if !path.is_empty() {
                    println!("path length: {}", path.len());
                }
                println!("{}", render_grid(session.model(), &visited, path));
                break;
            }
        }
    }

    if let Some(result) = session.join().await {
        result?;
    }
    Ok(())
}
