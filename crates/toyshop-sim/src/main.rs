//! Toyshop headless simulator.
//!
//! Plays seeded games between bots through the engine and reports the
//! standings, either as a text table or as JSON.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use toyshop_core::{AwardKind, Bot, BotStrategy, GameEvent, GameState, PlayerId, RuleSet, ScoringRule};

/// Actions after which a game is considered stuck
const MAX_STEPS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BotArg {
    Random,
    Greedy,
}

impl From<BotArg> for BotStrategy {
    fn from(arg: BotArg) -> Self {
        match arg {
            BotArg::Random => BotStrategy::Random,
            BotArg::Greedy => BotStrategy::Greedy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScoringArg {
    /// One coin per cell of every scoring region
    Cells,
    /// Tiles in the region times a multiplier
    Tiles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Variant {
    Sweets,
    Toys,
}

/// Play Toyshop games between bots
#[derive(Parser, Debug)]
#[command(name = "toyshop-sim")]
#[command(about = "Play seeded Toyshop games between bots", long_about = None)]
struct Args {
    /// Number of games to play
    #[arg(long, default_value_t = 10)]
    games: usize,

    /// Players per game
    #[arg(long, default_value_t = 2)]
    players: usize,

    /// Base seed; game i is played with seed + i
    #[arg(long, env = "TOYSHOP_SEED", default_value_t = 42)]
    seed: u64,

    /// Strategy used by every bot
    #[arg(long, value_enum, default_value_t = BotArg::Greedy)]
    bot: BotArg,

    /// Goods table used when no rules file is given
    #[arg(long, value_enum, default_value_t = Variant::Sweets)]
    variant: Variant,

    /// Rule set as a JSON file (overrides --variant)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Override the rule set's scoring convention
    #[arg(long, value_enum)]
    scoring: Option<ScoringArg>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

/// Outcome of one game
#[derive(Debug, Serialize)]
struct GameSummary {
    seed: u64,
    turns: u32,
    standings: Vec<(PlayerId, u32)>,
    winners: Vec<PlayerId>,
    /// Diversity awards in the order they were claimed
    diversity: Vec<(PlayerId, String)>,
    best_placement: u32,
}

/// Everything the simulator prints
#[derive(Debug, Serialize)]
struct Report {
    players: usize,
    strategy: BotStrategy,
    scoring: ScoringRule,
    /// Wins per seat; every tied winner counts
    wins: Vec<usize>,
    mean_score: f64,
    games: Vec<GameSummary>,
}

fn load_rules(args: &Args) -> anyhow::Result<RuleSet> {
    let mut rules = match &args.rules {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read rules file {}", path.display()))?;
            RuleSet::from_json_str(&text)
                .with_context(|| format!("invalid rules file {}", path.display()))?
        }
        None => match args.variant {
            Variant::Sweets => RuleSet::sweet_shop(),
            Variant::Toys => RuleSet::toy_shop(),
        },
    };

    if let Some(scoring) = args.scoring {
        rules.scoring = match scoring {
            ScoringArg::Cells => ScoringRule::CellCount,
            ScoringArg::Tiles => ScoringRule::tile_count(),
        };
    }
    Ok(rules)
}

fn play_game(rules: &RuleSet, args: &Args, seed: u64) -> anyhow::Result<GameSummary> {
    let mut rng = StdRng::seed_from_u64(seed);
    let names = (0..args.players).map(|i| format!("bot{}", i)).collect();
    let mut game = GameState::with_rng(names, rules.clone(), &mut rng).context("cannot set up game")?;

    let mut bots: Vec<Bot> = (0..game.player_count())
        .map(|i| Bot::with_seed(i as PlayerId, args.bot.into(), seed.wrapping_add(i as u64 + 1)))
        .collect();

    let mut diversity = Vec::new();
    let mut best_placement = 0;
    let mut steps = 0;
    while !game.is_finished() {
        if steps >= MAX_STEPS {
            bail!("game with seed {} did not finish", seed);
        }
        let current = game.current_player;
        let Some(action) = bots[current as usize].choose_action(&game) else {
            bail!("player {} has no legal action", current);
        };

        for event in game.apply(current, action)? {
            match event {
                GameEvent::TilePlaced { score, .. } => best_placement = best_placement.max(score.total),
                GameEvent::AwardGranted { player, award } if award.kind == AwardKind::Diversity => {
                    diversity.push((player, rules.category_name(award.category).to_string()))
                }
                _ => {}
            }
        }
        steps += 1;
    }

    let summary = GameSummary {
        seed,
        turns: game.turn_number,
        standings: game.standings(),
        winners: game.winners().map(<[PlayerId]>::to_vec).unwrap_or_default(),
        diversity,
        best_placement,
    };
    debug!(seed, steps, winners = ?summary.winners, "game finished");
    Ok(summary)
}

fn print_text(report: &Report) {
    println!(
        "{} games, {} players, {:?} bots, {:?} scoring",
        report.games.len(),
        report.players,
        report.strategy,
        report.scoring
    );
    for game in &report.games {
        let scores: Vec<String> = game.standings.iter().map(|(_, s)| s.to_string()).collect();
        println!(
            "  seed {:>6}  turns {:>3}  scores [{}]  winners {:?}  best placement {}",
            game.seed,
            game.turns,
            scores.join(", "),
            game.winners,
            game.best_placement
        );
        for (player, category) in &game.diversity {
            println!("      bot{} collected every {} item", player, category);
        }
    }
    for (seat, wins) in report.wins.iter().enumerate() {
        println!("seat {}: {} wins", seat, wins);
    }
    println!("mean final score: {:.2}", report.mean_score);
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let rules = load_rules(&args)?;
    info!(games = args.games, players = args.players, seed = args.seed, "starting simulation");

    let games = (0..args.games)
        .map(|i| play_game(&rules, &args, args.seed.wrapping_add(i as u64)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut wins = vec![0; args.players];
    let mut total = 0u64;
    for game in &games {
        for &winner in &game.winners {
            wins[winner as usize] += 1;
        }
        total += game.standings.iter().map(|&(_, s)| u64::from(s)).sum::<u64>();
    }
    let scored = (games.len() * args.players).max(1);

    let report = Report {
        players: args.players,
        strategy: args.bot.into(),
        scoring: rules.scoring,
        wins,
        mean_score: total as f64 / scored as f64,
        games,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report);
    }
    Ok(())
}
