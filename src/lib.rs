//! A genetic algorithm solver for modular protein assembly design.
//!
//! The solver searches for a chain of rigid protein modules whose
//! centres-of-mass, composed through precomputed pair transforms, best trace
//! a user-supplied 3D path. There are three main elements:
//! * The [ModuleDb](crate::module_db::ModuleDb) (which modules exist and how
//!   they connect)
//! * The target path (the shape to approximate)
//! * The [Solver](crate::solver::Solver) (the evolutionary search)
//!
//! Candidate chains are variable-length [Chromosomes](crate::chromosome::Chromosome);
//! their fitness is the Kabsch superposition score of the synthesised chain
//! against the target path, minimised over generations.
//!
//! ## Quick usage
//!
//! ```rust
//! use chainsolver::geometry::{Mat3, Vec3};
//! use chainsolver::module_db::{ModuleDb, PairTransform, Radii};
//! use chainsolver::config::SolverConfig;
//! use chainsolver::solver::Solver;
//!
//! // Two modules that can alternate forever, 15 units apart.
//! let step = PairTransform::new(
//!     Vec3::new(15.0, 0.0, 0.0),
//!     Mat3::IDENTITY,
//!     Vec3::new(15.0, 0.0, 0.0),
//! );
//! let radii = Radii { avg_all: 1.0, max_ca: 1.0, max_heavy: 1.0 };
//! let db = ModuleDb::new(
//!     vec!["corner".into(), "strut".into()],
//!     vec![None, Some(step), Some(step), None],
//!     vec![radii, radii],
//! )
//! .unwrap();
//!
//! // A straight 45-unit path; roughly a 4-module chain.
//! let target: Vec<Vec3> = (0..4).map(|i| Vec3::new(15.0 * i as f32, 0.0, 0.0)).collect();
//!
//! let mut solver = Solver::builder()
//!     .with_db(db)
//!     .with_target(target)
//!     .with_config(SolverConfig {
//!         pop_size: 20,
//!         generations: 5,
//!         survive_rate: 0.25,
//!         stop_score: 0.1,
//!         avg_pair_dist: 15.0,
//!         len_dev: 1,
//!         rand_seed: 13,
//!         n_best_sols: 1,
//!         workers: 1,
//!         ..SolverConfig::default()
//!     })
//!     .build()
//!     .unwrap();
//!
//! solver.run();
//! let best = &solver.best_so_far()[0];
//! assert!(best.score.is_finite());
//! ```
pub mod chromosome;
pub mod config;
pub mod context;
pub mod errors;
pub mod gene;
pub mod geometry;
pub mod io;
pub mod kabsch;
pub mod module_db;
pub mod mutation;
pub mod rng;
pub mod solver;
