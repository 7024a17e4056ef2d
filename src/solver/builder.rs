use super::Solver;
use crate::config::SolverConfig;
use crate::context::{expected_len, Context};
use crate::errors::{Error, Result};
use crate::geometry::Points;
use crate::module_db::ModuleDb;
use crate::rng::spawn_streams;
use log::info;

/// Assembles a [Solver] from a module database, a target path, and settings.
#[derive(Debug, Default)]
pub struct Builder {
    db: Option<ModuleDb>,
    target: Option<Points>,
    config: SolverConfig,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            db: None,
            target: None,
            config: SolverConfig::default(),
        }
    }

    pub fn with_db(mut self, db: ModuleDb) -> Self {
        self.db = Some(db);
        self
    }

    pub fn with_target(mut self, target: Points) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Solver> {
        let db = self.db.ok_or(Error::Builder("requires a module database"))?;
        let target = self.target.ok_or(Error::Builder("requires a target path"))?;
        if target.len() < 2 {
            return Err(Error::Builder("target path requires at least 2 points"));
        }

        let mut config = self.config;
        config.validate()?;

        let workers = if config.workers == 0 {
            rayon::current_num_threads()
        } else {
            config.workers
        };
        let streams = spawn_streams(config.rand_seed, workers);

        let expected = expected_len(&target, config.avg_pair_dist);
        let ctx = Context::new(db, target, config.avg_pair_dist, config.len_dev);
        info!(
            "expecting chain length {} ({}..={}), target path has {} points",
            expected,
            ctx.min_len,
            ctx.max_len,
            ctx.target.len()
        );

        Ok(Solver::from_parts(ctx, config, workers, streams))
    }
}
