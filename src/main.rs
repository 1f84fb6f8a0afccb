//! Cube Survival entry point
//!
//! Native builds run a headless autopilot session against the full core:
//! spawning, steering, crosshair targeting, weapon animation triggers and
//! the persisted scoreboard. Rendering hosts embed the library instead.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;
    use glam::Vec3;

    use cube_survival::animation::TimedClipPlayer;
    use cube_survival::highscores::format_date;
    use cube_survival::persistence::FileStore;
    use cube_survival::platform::{Clock, RandomSource, SeededRng, SystemClock};
    use cube_survival::sim::{
        Command, FrameInput, GameEvent, GamePhase, GameSession, TargetHit, Viewpoint,
    };
    use cube_survival::{Game, Tuning};

    const FRAME_DT: f32 = 1.0 / 60.0;

    #[derive(Parser, Debug)]
    #[command(
        name = "cube-survival",
        about = "Headless autopilot runs of the cube survival core"
    )]
    struct Args {
        /// RNG seed (random if omitted)
        #[arg(long)]
        seed: Option<u64>,
        /// Give up on a run after this many simulated seconds
        #[arg(long, default_value_t = 300.0)]
        seconds: f32,
        /// Number of runs (restarts after each game over)
        #[arg(long, default_value_t = 1)]
        runs: u32,
        /// Name recorded on the scoreboard
        #[arg(long, default_value = "Autopilot")]
        name: String,
        /// Directory holding the persisted store
        #[arg(long, default_value = ".cube-survival")]
        data_dir: PathBuf,
        /// JSON balance overrides
        #[arg(long)]
        tuning: Option<PathBuf>,
        /// Autopilot trigger rate (clicks per second)
        #[arg(long, default_value_t = 3.0)]
        fire_rate: f32,
        /// Chance that a click is wasted (0-1)
        #[arg(long, default_value_t = 0.2)]
        miss_chance: f32,
        /// Persist a new look sensitivity before playing
        #[arg(long)]
        sensitivity: Option<f32>,
    }

    /// Aim at the nearest live enemy, like a very focused player
    fn aim(session: &GameSession) -> Viewpoint {
        let eye = session.viewpoint().origin;
        let forward = session
            .enemies()
            .live()
            .min_by(|a, b| {
                a.position
                    .distance_squared(eye)
                    .total_cmp(&b.position.distance_squared(eye))
            })
            .map(|e| (e.position - eye).normalize_or_zero())
            .filter(|d| *d != Vec3::ZERO)
            .unwrap_or(Vec3::NEG_Z);
        Viewpoint {
            origin: eye,
            forward,
        }
    }

    pub fn run() -> Result<()> {
        env_logger::init();
        let args = Args::parse();

        let tuning = match &args.tuning {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading tuning file {}", path.display()))?;
                Tuning::from_json(&json)
                    .with_context(|| format!("parsing tuning file {}", path.display()))?
            }
            None => Tuning::default(),
        };

        let seed = args.seed.unwrap_or_else(rand::random);
        log::info!("Cube Survival (native) starting with seed {}", seed);

        let store = FileStore::open(args.data_dir.join("store.json"));
        let session = GameSession::with_parts(tuning, Box::new(SeededRng::new(seed)));
        let mut game = Game::new(session, store, SystemClock);
        game.set_player_name(&args.name);
        if let Some(value) = args.sensitivity {
            let applied = game.set_sensitivity(value);
            log::info!("Sensitivity set to {}", applied);
        }

        let mut player = TimedClipPlayer::standard();
        let mut aim_rng = SeededRng::new(seed ^ 0x5eed);
        let fire_interval = 1.0 / args.fire_rate.max(0.1);

        for run in 0..args.runs {
            let command = if run == 0 { Command::Start } else { Command::Restart };
            game.command(command, &mut player);

            let mut cooldown = 0.0_f32;
            let mut elapsed = 0.0_f32;
            while game.session().phase() == GamePhase::Playing && elapsed < args.seconds {
                let input = FrameInput {
                    dt: FRAME_DT,
                    viewpoint: Some(aim(game.session())),
                };
                for event in game.frame(&input, &mut player) {
                    if let GameEvent::GameOver { summary, .. } = event {
                        println!(
                            "Run {}: survived {}s, destroyed {} cubes",
                            run + 1,
                            summary.time,
                            summary.cubes
                        );
                    }
                }
                for token in player.advance(FRAME_DT) {
                    game.clip_finished(token, &mut player);
                }

                cooldown -= FRAME_DT;
                if cooldown <= 0.0 && matches!(game.session().hover(), TargetHit::Enemy(_)) {
                    cooldown = fire_interval;
                    if aim_rng.range_f32(0.0, 1.0) >= args.miss_chance {
                        game.command(Command::Click, &mut player);
                    }
                }
                elapsed += FRAME_DT;
            }

            if game.session().phase() == GamePhase::Playing {
                println!("Run {}: still alive after {:.0}s, stopping", run + 1, elapsed);
                break;
            }
        }

        let now = SystemClock.now_ms();
        println!("\nHigh scores:");
        for (i, entry) in game.ledger().entries().iter().enumerate() {
            println!(
                "{:>2}. {:<16} {:>4}s {:>4} cubes  {}",
                i + 1,
                entry.name,
                entry.time,
                entry.cubes,
                format_date(entry.date, now)
            );
        }
        println!("Scores saved to {}", game.store().path().display());
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Web hosts drive the library directly
}
