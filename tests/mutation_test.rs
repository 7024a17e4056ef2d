mod support;

use chainsolver::chromosome::{synthesise, Chromosome, Origin};
use chainsolver::context::Context;
use chainsolver::gene::Gene;
use chainsolver::mutation::{
    auto_mutate, cross, gen_random_genes, gen_random_genes_reverse, limb_mutate, point_mutate,
    randomise,
};
use chainsolver::rng::Dice;
use support::{grid_db, line_target};

fn grid_context() -> Context {
    // Expected length 4, allowed band 3..=5.
    support::context(grid_db(), line_target(4, 12.0), 12.0, 1)
}

/// A chain is valid iff its length is in the band, every consecutive pair
/// has a transform, and it re-synthesises without collisions. Coordinates
/// are not compared: chains regrown leftwards are anchored at the other end,
/// a rigid-body difference the scorer is invariant to.
fn assert_valid_chain(ctx: &Context, chromo: &Chromosome) {
    assert!(
        chromo.len() >= ctx.min_len && chromo.len() <= ctx.max_len,
        "length {} outside {}..={}",
        chromo.len(),
        ctx.min_len,
        ctx.max_len
    );
    for pair in chromo.genes.windows(2) {
        assert!(
            ctx.db.transform(pair[0].node_id, pair[1].node_id).is_some(),
            "missing transform {} -> {}",
            pair[0].node_id,
            pair[1].node_id
        );
    }
    let mut resynth = chromo.genes.clone();
    assert!(synthesise(&ctx.db, &mut resynth), "chain does not synthesise");
}

#[test]
fn random_generation_respects_max_length() {
    let ctx = grid_context();
    let mut dice = Dice::from_seed(11);

    for _ in 0..32 {
        let genes = gen_random_genes(&ctx, &mut dice, ctx.max_len, Vec::new());
        assert!(!genes.is_empty());
        assert!(genes.len() <= ctx.max_len);
        let chromo = Chromosome::from_genes(genes);
        for pair in chromo.genes.windows(2) {
            assert!(ctx.db.transform(pair[0].node_id, pair[1].node_id).is_some());
        }
    }
}

#[test]
fn random_generation_extends_a_seed() {
    let ctx = grid_context();
    let mut dice = Dice::from_seed(3);

    let seed = vec![Gene::new(0), Gene::new(1)];
    let genes = gen_random_genes(&ctx, &mut dice, ctx.max_len, seed);
    assert_eq!(genes.len(), ctx.max_len);
    assert_eq!(genes[0].node_id, 0);
    assert_eq!(genes[1].node_id, 1);
}

#[test]
fn reverse_generation_extends_leftwards() {
    let ctx = grid_context();
    let mut dice = Dice::from_seed(3);

    let seed = vec![Gene::new(0), Gene::new(1)];
    let genes = gen_random_genes_reverse(&ctx, &mut dice, ctx.max_len, seed);
    assert_eq!(genes.len(), ctx.max_len);
    // The seed survives at the right end.
    let n = genes.len();
    assert_eq!(genes[n - 2].node_id, 0);
    assert_eq!(genes[n - 1].node_id, 1);
}

#[test]
fn randomise_stays_in_the_length_band() {
    let ctx = grid_context();
    let mut dice = Dice::from_seed(5);

    for _ in 0..16 {
        let mut chromo = Chromosome::new();
        randomise(&ctx, &mut dice, &mut chromo);
        assert_eq!(chromo.origin, Origin::Random);
        assert_valid_chain(&ctx, &chromo);
    }
}

#[test]
fn point_mutate_changes_length_by_at_most_one() {
    let ctx = grid_context();
    let mut dice = Dice::from_seed(17);

    for _ in 0..16 {
        let mut chromo = Chromosome::new();
        randomise(&ctx, &mut dice, &mut chromo);
        let before = chromo.len();

        assert!(point_mutate(&ctx, &mut dice, &mut chromo));
        assert_eq!(chromo.origin, Origin::PointMutate);
        assert!(chromo.len().abs_diff(before) <= 1);
        assert_valid_chain(&ctx, &chromo);
    }
}

#[test]
fn limb_mutate_regrows_within_bounds() {
    let ctx = grid_context();
    let mut dice = Dice::from_seed(23);

    for _ in 0..16 {
        let mut chromo = Chromosome::new();
        randomise(&ctx, &mut dice, &mut chromo);

        assert!(limb_mutate(&ctx, &mut dice, &mut chromo));
        assert_eq!(chromo.origin, Origin::LimbMutate);
        assert_valid_chain(&ctx, &chromo);
    }
}

#[test]
fn cross_splices_mother_head_onto_father_tail() {
    let ctx = grid_context();
    let mut dice = Dice::from_seed(29);

    let mut mother = Chromosome::from_genes(
        [0, 1, 2, 0, 1].iter().map(|&id| Gene::new(id)).collect(),
    );
    assert!(synthesise(&ctx.db, &mut mother.genes));
    let mut father = Chromosome::from_genes(
        [1, 2, 0, 1, 2].iter().map(|&id| Gene::new(id)).collect(),
    );
    assert!(synthesise(&ctx.db, &mut father.genes));

    let mut child = Chromosome::new();
    assert!(cross(&ctx, &mut dice, &mother, &father, &mut child));
    assert_eq!(child.origin, Origin::Cross);
    assert_valid_chain(&ctx, &child);
}

#[test]
fn cross_fails_without_common_modules() {
    // Sever any module overlap by restricting the father to ids the mother
    // does not use: mother all-hub, father all-twist.
    let ctx = grid_context();
    let mut dice = Dice::from_seed(31);

    let mut mother =
        Chromosome::from_genes([0, 0, 0, 0].iter().map(|&id| Gene::new(id)).collect());
    assert!(synthesise(&ctx.db, &mut mother.genes));
    let mut father =
        Chromosome::from_genes([2, 2, 2, 2].iter().map(|&id| Gene::new(id)).collect());
    assert!(synthesise(&ctx.db, &mut father.genes));

    let mut child = Chromosome::new();
    assert!(!cross(&ctx, &mut dice, &mother, &father, &mut child));
}

#[test]
fn auto_mutate_always_leaves_a_valid_chain() {
    let ctx = grid_context();
    let mut dice = Dice::from_seed(37);

    for _ in 0..16 {
        let mut chromo = Chromosome::new();
        randomise(&ctx, &mut dice, &mut chromo);
        auto_mutate(&ctx, &mut dice, &mut chromo);
        assert_valid_chain(&ctx, &chromo);
    }
}

#[test]
fn delete_is_blocked_at_minimum_length() {
    // A band that pins every chain to its maximum: deletions and inserts are
    // both impossible, so only swaps remain.
    let db = grid_db();
    let ctx = Context::new(db, line_target(4, 12.0), 12.0, 0);
    assert_eq!(ctx.min_len, ctx.max_len);

    let mut dice = Dice::from_seed(41);
    let mut chromo = Chromosome::new();
    randomise(&ctx, &mut dice, &mut chromo);
    let before = chromo.len();

    assert!(point_mutate(&ctx, &mut dice, &mut chromo));
    assert_eq!(chromo.len(), before);
}
