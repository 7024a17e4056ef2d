mod support;

use chainsolver::config::SolverConfig;
use chainsolver::context::Context;
use chainsolver::solver::Solver;
use support::{grid_db, line_target};

#[test]
fn defaults_validate_cleanly() {
    let mut config = SolverConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.pop_size, 10_000);
    assert_eq!(config.rand_seed, 0x1337_cafe);
}

#[test]
fn rejects_out_of_range_values() {
    let mut config = SolverConfig {
        pop_size: 0,
        ..SolverConfig::default()
    };
    assert!(config.validate().is_err());

    let mut config = SolverConfig {
        survive_rate: 1.5,
        ..SolverConfig::default()
    };
    assert!(config.validate().is_err());

    let mut config = SolverConfig {
        avg_pair_dist: 0.0,
        ..SolverConfig::default()
    };
    assert!(config.validate().is_err());

    let mut config = SolverConfig {
        n_best_sols: 0,
        ..SolverConfig::default()
    };
    assert!(config.validate().is_err());

    let mut config = SolverConfig {
        n_best_sols: 50,
        pop_size: 20,
        ..SolverConfig::default()
    };
    assert!(config.validate().is_err());

    // A survive rate that rounds to zero survivors is unusable.
    let mut config = SolverConfig {
        pop_size: 100,
        survive_rate: 0.001,
        ..SolverConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn normalizes_rates_summing_over_one() {
    let mut config = SolverConfig {
        cross_rate: 0.6,
        point_mutate_rate: 0.6,
        limb_mutate_rate: 0.8,
        ..SolverConfig::default()
    };
    config.validate().unwrap();

    let sum = config.cross_rate + config.point_mutate_rate + config.limb_mutate_rate;
    assert!((sum - 1.0).abs() < 1e-6);
    assert!((config.cross_rate - 0.3).abs() < 1e-6);
    assert!((config.limb_mutate_rate - 0.4).abs() < 1e-6);
}

#[test]
fn parses_json_settings() {
    let config: SolverConfig =
        serde_json::from_str(r#"{"pop_size": 64, "rand_seed": 5, "workers": 2}"#).unwrap();
    assert_eq!(config.pop_size, 64);
    assert_eq!(config.rand_seed, 5);
    assert_eq!(config.workers, 2);
    // Unset fields keep their defaults.
    assert_eq!(config.generations, 1_000);
}

#[test]
fn rejects_unknown_settings_keys() {
    let parsed: Result<SolverConfig, _> = serde_json::from_str(r#"{"pop_sizee": 64}"#);
    assert!(parsed.is_err());
}

#[test]
fn builder_requires_all_parts() {
    assert!(Solver::builder().build().is_err());
    assert!(Solver::builder().with_db(grid_db()).build().is_err());

    let single_point = Solver::builder()
        .with_db(grid_db())
        .with_target(line_target(1, 12.0))
        .build();
    assert!(single_point.is_err());
}

#[test]
fn length_band_derives_from_the_target() {
    let ctx = Context::new(grid_db(), line_target(4, 12.0), 12.0, 1);
    // 36 units of path at 12 per pair: expect 4 modules, band 3..=5.
    assert_eq!(ctx.min_len, 3);
    assert_eq!(ctx.max_len, 5);

    // Oversized deviation saturates instead of wrapping.
    let ctx = Context::new(grid_db(), line_target(4, 12.0), 12.0, 100);
    assert_eq!(ctx.min_len, 1);
    assert_eq!(ctx.max_len, 104);
}
