use chainsolver::config::SolverConfig;
use chainsolver::errors::Result;
use chainsolver::io;
use chainsolver::module_db::ModuleDb;
use chainsolver::solver::Solver;
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;

/// Searches for a chain of protein modules whose centres-of-mass trace a
/// target 3D path, using a generational genetic algorithm.
#[derive(Parser, Debug)]
#[command(name = "chainsolver", version, about)]
struct Cli {
    /// Target path file (.csv with `x y z` rows, or .json with a "coms" array)
    #[arg(short, long)]
    input: PathBuf,

    /// Module database file
    #[arg(short = 'x', long, default_value = "xDB.json")]
    xdb: PathBuf,

    /// Settings file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for solution files
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    #[arg(long)]
    pop_size: Option<usize>,

    #[arg(long)]
    generations: Option<usize>,

    #[arg(long)]
    survive_rate: Option<f32>,

    #[arg(long)]
    cross_rate: Option<f32>,

    #[arg(long)]
    point_mutate_rate: Option<f32>,

    #[arg(long)]
    limb_mutate_rate: Option<f32>,

    /// Stop as soon as the best score drops below this
    #[arg(long)]
    stop_score: Option<f32>,

    /// Stop after this many generations without improvement
    #[arg(long)]
    max_stagnant_gens: Option<usize>,

    /// Allowed deviation from the expected chain length
    #[arg(long)]
    len_dev: Option<usize>,

    /// Average CoM distance between module pairs
    #[arg(long)]
    avg_pair_dist: Option<f32>,

    /// Master RNG seed; 0 seeds from entropy and gives up reproducibility
    #[arg(long)]
    seed: Option<u32>,

    /// How many of the best solutions to write out
    #[arg(long)]
    n_best_sols: Option<usize>,

    /// Worker thread count; 0 uses all cores
    #[arg(long)]
    workers: Option<usize>,
}

macro_rules! override_fields {
    ($cli:expr, $config:expr, $($field:ident),* $(,)?) => {
        $(if let Some(value) = $cli.$field {
            $config.$field = value;
        })*
    };
}

impl Cli {
    fn apply_overrides(&self, config: &mut SolverConfig) {
        override_fields!(
            self,
            config,
            pop_size,
            generations,
            survive_rate,
            cross_rate,
            point_mutate_rate,
            limb_mutate_rate,
            stop_score,
            max_stagnant_gens,
            len_dev,
            avg_pair_dist,
            n_best_sols,
            workers,
        );
        if let Some(seed) = self.seed {
            config.rand_seed = seed;
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => SolverConfig::load(path)?,
        None => SolverConfig::default(),
    };
    cli.apply_overrides(&mut config);
    config.validate()?;
    info!("using master seed: {}", config.rand_seed);

    let db = ModuleDb::load(&cli.xdb)?;
    let target = io::load_target_path(&cli.input)?;

    let mut solver = Solver::builder()
        .with_db(db)
        .with_target(target)
        .with_config(config)
        .build()?;

    let stop = solver.stop_handle();
    ctrlc::set_handler(move || {
        eprintln!("caught interrupt; finishing current generation");
        stop.store(true, Ordering::SeqCst);
    })?;

    let outcome = solver.run();
    info!("run ended: {}", outcome);

    io::write_solutions(&cli.output_dir, &solver.context().db, solver.best_so_far())?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            eprintln!("chainsolver: {}", err);
            ExitCode::FAILURE
        }
    }
}
