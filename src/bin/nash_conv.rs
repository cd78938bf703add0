//! NashConv tracking driver.
//!
//! Trains the external-sampling solver on a reference game, measures the
//! NashConv of the average policy every few iterations and writes the series
//! to a text file (values separated by spaces).
//!
//! Usage:
//!   cargo run --release --bin nash_conv -- --game leduc --iterations 1000
//!
//! Logging goes through `env_logger`; set `RUST_LOG=info` (or `debug`) to see
//! solver progress.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use es_mccfr::cfr::{AverageType, ExternalSamplingSolver, Game, SolverConfig};
use es_mccfr::eval::GameTree;
use es_mccfr::games::kuhn::KuhnPoker;
use es_mccfr::games::leduc::LeducPoker;
use es_mccfr::games::liars_dice::LiarsDice;

#[derive(Parser)]
#[command(name = "nash_conv")]
#[command(about = "Train external-sampling MCCFR and record NashConv over time")]
struct Args {
    /// Game to solve
    #[arg(short, long, value_enum, default_value = "kuhn")]
    game: GameChoice,
    /// Number of iterations (defaults to a per-game value)
    #[arg(short, long)]
    iterations: Option<u64>,
    /// Random seed
    #[arg(short, long, default_value_t = 230398247)]
    seed: u64,
    /// Average-strategy mode
    #[arg(short, long, value_enum, default_value = "simple")]
    average: AverageChoice,
    /// Measure NashConv every K iterations
    #[arg(long, default_value_t = 1)]
    eval_every: u64,
    /// Output file (defaults to `<game>_external_sampling.txt`)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Also write a solver checkpoint to this file
    #[arg(long)]
    checkpoint: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GameChoice {
    Kuhn,
    Kuhn3,
    Leduc,
    LiarsDice,
}

impl GameChoice {
    fn default_iterations(self) -> u64 {
        match self {
            GameChoice::Kuhn | GameChoice::Kuhn3 => 10_000,
            GameChoice::Leduc => 1_000,
            GameChoice::LiarsDice => 100,
        }
    }

    fn file_stem(self) -> &'static str {
        match self {
            GameChoice::Kuhn => "kuhn_poker",
            GameChoice::Kuhn3 => "kuhn_poker_3p",
            GameChoice::Leduc => "leduc_poker",
            GameChoice::LiarsDice => "liars_dice",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AverageChoice {
    Simple,
    Full,
}

impl From<AverageChoice> for AverageType {
    fn from(choice: AverageChoice) -> Self {
        match choice {
            AverageChoice::Simple => AverageType::Simple,
            AverageChoice::Full => AverageType::Full,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let iterations = args.iterations.unwrap_or_else(|| args.game.default_iterations());
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}_external_sampling.txt", args.game.file_stem())));

    let nash_convs = match args.game {
        GameChoice::Kuhn => run(&KuhnPoker::new(2), &args, iterations)?,
        GameChoice::Kuhn3 => run(&KuhnPoker::new(3), &args, iterations)?,
        GameChoice::Leduc => run(&LeducPoker::new(), &args, iterations)?,
        GameChoice::LiarsDice => run(&LiarsDice::new(2, 1), &args, iterations)?,
    };

    let text: Vec<String> = nash_convs.iter().map(|v| v.to_string()).collect();
    fs::write(&output, text.join(" "))?;
    log::info!("wrote {} NashConv values to {}", nash_convs.len(), output.display());

    if let Some(last) = nash_convs.last() {
        println!("Final NashConv: {:.6}", last);
    }
    Ok(())
}

fn run<G: Game>(game: &G, args: &Args, iterations: u64) -> Result<Vec<f64>, Box<dyn Error>> {
    let tree = GameTree::build(game);
    let stats = tree.stats();
    log::info!(
        "{}: {} nodes, {} info sets",
        game.name(),
        stats.total_nodes,
        stats.info_sets
    );

    let config = SolverConfig::default()
        .with_seed(args.seed)
        .with_average_type(args.average.into());
    let mut solver = ExternalSamplingSolver::new(game, config)?;

    let pb = ProgressBar::new(iterations);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );

    let eval_every = args.eval_every.max(1);
    let mut nash_convs = Vec::new();
    for i in 1..=iterations {
        solver.run_iteration();
        pb.inc(1);

        if i % eval_every == 0 || i == iterations {
            let nash_conv = tree.nash_conv(&solver.average_policy());
            solver.record_exploitability(nash_conv / game.num_players() as f64);
            nash_convs.push(nash_conv);
            pb.set_message(format!("NashConv {:.4}", nash_conv));
        }
    }
    pb.finish_and_clear();

    log::info!(
        "{} iterations, {} info states, NashConv {:.6}",
        solver.iteration(),
        solver.num_info_sets(),
        nash_convs.last().copied().unwrap_or(f64::NAN)
    );

    if let Some(path) = &args.checkpoint {
        fs::write(path, solver.serialize()?)?;
        log::info!("checkpoint written to {}", path.display());
    }

    Ok(nash_convs)
}
