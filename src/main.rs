//! Headless cascade runner (default binary).
//!
//! Fills a seeded board and plays a batch of random swap gestures, logging
//! each outcome and the score as the cascades resolve. Useful for eyeballing
//! engine behavior and for profiling:
//!
//! ```text
//! RUST_LOG=gemfall=debug cargo run -- 42
//! ```

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gemfall::core::SimpleRng;
use gemfall::{Engine, GridPosition, Settings};

const GESTURES: usize = 40;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let seed = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<u32>().context("seed must be an unsigned integer")?,
        None => 7,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(run(seed))
}

async fn run(seed: u32) -> Result<()> {
    let engine = Engine::with_seed(Settings::instant(), seed);
    engine.fill_board()?;
    info!(seed, occupied = engine.snapshot().occupied(), "board filled");

    // Separate gesture stream so spawn selection stays seed-stable.
    let mut rng = SimpleRng::new(seed.wrapping_mul(31).wrapping_add(1));
    let (width, height) = (
        engine.settings().board_width,
        engine.settings().board_height,
    );
    let angles: [f32; 4] = [0.0, 90.0, 180.0, -90.0];

    for turn in 0..GESTURES {
        let pos = GridPosition::new(
            rng.next_range(width as u32) as i32,
            rng.next_range(height as u32) as i32,
        );
        let angle = *rng.pick(&angles);
        let outcome = engine.submit_swap(pos, angle).await?;
        info!(turn, %pos, angle, ?outcome, score = engine.score(), "gesture");
    }

    info!(score = engine.score(), state = ?engine.state(), "run finished");
    Ok(())
}
