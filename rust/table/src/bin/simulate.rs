//! CPU-only table driver: deals a fixed number of hands between rule
//! advisors and prints the resulting stacks. Useful for soak-testing the
//! engine and eyeballing advisor behavior.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use flophouse_ai::RiskProfile;
use flophouse_engine::events::EngineEvent;
use flophouse_engine::rng::{SeedPolicy, SeedSchedule};
use flophouse_engine::table::{SeatConfig, TableConfig, TableRules};
use flophouse_table::{TableNotice, TableRegistry, TimingProfile};
use tokio::time::timeout;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Profile {
    Cautious,
    Standard,
    Aggressive,
}

impl From<Profile> for RiskProfile {
    fn from(p: Profile) -> Self {
        match p {
            Profile::Cautious => RiskProfile::Cautious,
            Profile::Standard => RiskProfile::Standard,
            Profile::Aggressive => RiskProfile::Aggressive,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "flophouse-simulate", about = "Run a CPU-only hold'em table")]
struct Args {
    /// Number of seats at the table (2-9).
    #[arg(long, default_value_t = 4)]
    seats: usize,
    /// Hands to play before stopping.
    #[arg(long, default_value_t = 20)]
    hands: u64,
    /// Deterministic base seed; omit for OS entropy.
    #[arg(long)]
    seed: Option<u32>,
    /// Starting stack per seat.
    #[arg(long, default_value_t = 1_000)]
    stack: u32,
    #[arg(long, default_value_t = 5)]
    small_blind: u32,
    #[arg(long, default_value_t = 10)]
    big_blind: u32,
    /// Advisor temperament for every seat.
    #[arg(long, value_enum, default_value_t = Profile::Standard)]
    profile: Profile,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let config = TableConfig {
        seats: vec![
            SeatConfig {
                stack: args.stack,
                is_cpu: true,
            };
            args.seats
        ],
        rules: TableRules::new(args.small_blind, args.big_blind),
        seed: match args.seed {
            Some(base) => SeedPolicy::Seeded(SeedSchedule::new(base, 9_973)),
            None => SeedPolicy::System,
        },
    };

    let registry = TableRegistry::new();
    // Hands are begun explicitly so the subscription never misses one.
    let timing = TimingProfile {
        auto_begin: false,
        ..TimingProfile::simulation()
    };
    let table_id = registry.open(config, timing, args.profile.into())?;
    let mut subscription = registry.subscribe(&table_id);
    let handle = registry.handle(&table_id).expect("table just opened");

    handle.begin_hand().await?;

    let mut hands_played = 0u64;
    while hands_played < args.hands {
        let notice = timeout(Duration::from_secs(30), subscription.receiver.recv())
            .await?
            .ok_or("table closed unexpectedly")?;

        match notice {
            TableNotice::Engine {
                event: EngineEvent::HandEnded { hand_id, board, results },
                ..
            } => {
                hands_played += 1;
                let board: Vec<String> = board.iter().map(|c| c.to_string()).collect();
                let winners: Vec<String> = results
                    .iter()
                    .filter(|r| r.won > 0)
                    .map(|r| format!("seat {} +{}", r.seat, r.won))
                    .collect();
                println!(
                    "hand {:>4}  board [{}]  {}",
                    hand_id,
                    board.join(" "),
                    winners.join(", ")
                );

                if hands_played < args.hands {
                    handle.begin_hand().await?;
                    let view = handle.snapshot(None).await?;
                    if view.game_over {
                        println!("table is done: fewer than two funded seats");
                        break;
                    }
                }
            }
            TableNotice::Error { message, .. } => {
                eprintln!("table error: {message}");
            }
            _ => {}
        }
    }

    let view = handle.snapshot(None).await?;
    println!("\nafter {hands_played} hands:");
    for seat in &view.seats {
        println!("  seat {}: {} chips", seat.index, seat.stack);
    }

    registry.close_all().await;
    Ok(())
}
