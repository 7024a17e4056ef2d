//! The evolutionary operators.
//!
//! Operators either succeed and leave a geometrically valid, non-colliding
//! chain behind, or report failure and leave the chromosome untouched so the
//! caller can fall through to the next operator. All randomness comes from
//! the caller's [Dice] stream.
use crate::chromosome::{collides, synthesise, synthesise_reverse, Chromosome, Origin};
use crate::context::Context;
use crate::gene::{Gene, Genes};
use crate::rng::Dice;
use itertools::Itertools;
use log::debug;

/// Retry bound for the stochastic pick loops.
pub const MAX_STOCHASTIC_FAILS: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PointMutateMode {
    Swap,
    Insert,
    Delete,
}

/// Grow a chain rightwards by a neighbour-weighted roulette, up to `max_len`
/// genes. An empty seed starts from the global roulette; a non-empty seed is
/// synthesised first (the caller guarantees it is valid). The result can be
/// shorter than any minimum when growth dead-ends; length checking is the
/// caller's job.
pub fn gen_random_genes(ctx: &Context, dice: &mut Dice, max_len: usize, mut genes: Genes) -> Genes {
    let db = &ctx.db;
    let dim = db.dim();

    if genes.is_empty() {
        let roulette = db.global_roulette();
        let first = roulette[dice.roll(roulette.len())];
        genes.push(Gene::new(first));
    } else {
        let ok = synthesise(db, &mut genes);
        assert!(ok, "gen_random_genes: seed must synthesise cleanly");
    }

    while genes.len() < max_len {
        let tip = genes[genes.len() - 1].node_id;
        let window = &genes[..genes.len().saturating_sub(2)];

        // Weight each valid successor by its own out-degree so dead-end
        // modules are picked rarely.
        let mut wheel = Vec::new();
        for i in 0..dim {
            if let Some(pair) = db.transform(tip, i) {
                if !collides(db, i, pair.com_b, window) {
                    let (_, out) = db.neighbour_counts(i);
                    wheel.extend(std::iter::repeat(i).take(out));
                }
            }
        }
        if wheel.is_empty() {
            break;
        }

        let next = wheel[dice.roll(wheel.len())];
        let pair = db.transform(tip, next).unwrap();
        for gene in genes.iter_mut() {
            gene.com = gene.com.rotated(&pair.rot) + pair.tran;
        }
        genes.push(Gene::new(next));
    }

    genes
}

/// Mirror of [gen_random_genes]: grows leftwards with the inverse transforms
/// and in-degree weighting. The sequence is temporarily reversed so the
/// growth tip is at the back.
pub fn gen_random_genes_reverse(
    ctx: &Context,
    dice: &mut Dice,
    max_len: usize,
    mut genes: Genes,
) -> Genes {
    let db = &ctx.db;
    let dim = db.dim();

    if genes.is_empty() {
        let roulette = db.global_roulette();
        let first = roulette[dice.roll(roulette.len())];
        genes.push(Gene::new(first));
    } else {
        let ok = synthesise_reverse(db, &mut genes);
        assert!(ok, "gen_random_genes_reverse: seed must synthesise cleanly");
    }

    genes.reverse();

    while genes.len() < max_len {
        let tip = genes[genes.len() - 1].node_id;
        let window = &genes[..genes.len().saturating_sub(2)];

        let mut wheel = Vec::new();
        for i in 0..dim {
            if let Some(pair) = db.transform(i, tip) {
                if !collides(db, i, pair.tran, window) {
                    let (inc, _) = db.neighbour_counts(i);
                    wheel.extend(std::iter::repeat(i).take(inc));
                }
            }
        }
        if wheel.is_empty() {
            break;
        }

        let next = wheel[dice.roll(wheel.len())];
        let pair = db.transform(next, tip).unwrap();
        for gene in genes.iter_mut() {
            gene.com = (gene.com - pair.tran).rotated(&pair.rot_inv);
        }
        genes.push(Gene::new(next));
    }

    genes.reverse();
    genes
}

/// Replace the chromosome with a fresh random chain of valid length.
pub fn randomise(ctx: &Context, dice: &mut Dice, chromo: &mut Chromosome) {
    loop {
        let genes = gen_random_genes(ctx, dice, ctx.max_len, Vec::new());
        if genes.len() >= ctx.min_len {
            chromo.genes = genes;
            break;
        }
    }
    chromo.score = f32::NAN;
    chromo.origin = Origin::Random;
}

/// Point mutation: swap one module, insert one, or delete one. The three
/// modes are tried in random order without replacement; the first mode with
/// at least one valid candidate wins, and the candidate is picked uniformly.
pub fn point_mutate(ctx: &Context, dice: &mut Dice, chromo: &mut Chromosome) -> bool {
    let mut modes = vec![
        PointMutateMode::Swap,
        PointMutateMode::Insert,
        PointMutateMode::Delete,
    ];

    while !modes.is_empty() {
        let mode = modes.remove(dice.roll(modes.len()));
        let applied = match mode {
            PointMutateMode::Swap => try_swap(ctx, dice, chromo),
            PointMutateMode::Insert => try_insert(ctx, dice, chromo),
            PointMutateMode::Delete => try_delete(ctx, dice, chromo),
        };
        if applied {
            chromo.origin = Origin::PointMutate;
            chromo.score = f32::NAN;
            return true;
        }
    }

    false
}

fn try_swap(ctx: &Context, dice: &mut Dice, chromo: &mut Chromosome) -> bool {
    let db = &ctx.db;
    let dim = db.dim();
    let len = chromo.len();
    let genes = &chromo.genes;

    let mut candidates = Vec::new();
    for i in 0..len {
        for j in 0..dim {
            if j == genes[i].node_id {
                continue;
            }
            let left_ok = i == 0 || db.transform(genes[i - 1].node_id, j).is_some();
            let right_ok = i == len - 1 || db.transform(j, genes[i + 1].node_id).is_some();
            if left_ok && right_ok {
                let mut test = genes.clone();
                test[i].node_id = j;
                if synthesise(db, &mut test) {
                    candidates.push((i, j));
                }
            }
        }
    }

    let Some(&(i, j)) = pick(dice, &candidates) else {
        return false;
    };
    chromo.genes[i].node_id = j;
    let ok = synthesise(db, &mut chromo.genes);
    debug_assert!(ok, "validated swap must re-synthesise");
    true
}

fn try_insert(ctx: &Context, dice: &mut Dice, chromo: &mut Chromosome) -> bool {
    if chromo.len() >= ctx.max_len {
        return false;
    }
    let db = &ctx.db;
    let dim = db.dim();
    let len = chromo.len();
    let genes = &chromo.genes;

    let mut candidates = Vec::new();
    for i in 0..=len {
        for j in 0..dim {
            let left_ok = i == 0 || db.transform(genes[i - 1].node_id, j).is_some();
            let right_ok = i == len || db.transform(j, genes[i].node_id).is_some();
            if left_ok && right_ok {
                let mut test = genes.clone();
                test.insert(i, Gene::new(j));
                if synthesise(db, &mut test) {
                    candidates.push((i, j));
                }
            }
        }
    }

    let Some(&(i, j)) = pick(dice, &candidates) else {
        return false;
    };
    chromo.genes.insert(i, Gene::new(j));
    let ok = synthesise(db, &mut chromo.genes);
    debug_assert!(ok, "validated insert must re-synthesise");
    true
}

fn try_delete(ctx: &Context, dice: &mut Dice, chromo: &mut Chromosome) -> bool {
    if chromo.len() <= ctx.min_len {
        return false;
    }
    let db = &ctx.db;
    let len = chromo.len();
    let genes = &chromo.genes;

    let mut candidates = Vec::new();
    for i in 0..len {
        let bridged = i == 0
            || i == len - 1
            || db
                .transform(genes[i - 1].node_id, genes[i + 1].node_id)
                .is_some();
        if bridged {
            let mut test = genes.clone();
            test.remove(i);
            if synthesise(db, &mut test) {
                candidates.push(i);
            }
        }
    }

    let Some(&i) = pick(dice, &candidates) else {
        return false;
    };
    chromo.genes.remove(i);
    let ok = synthesise(db, &mut chromo.genes);
    debug_assert!(ok, "validated delete must re-synthesise");
    true
}

fn pick<'a, T>(dice: &mut Dice, candidates: &'a [T]) -> Option<&'a T> {
    if candidates.is_empty() {
        None
    } else {
        Some(&candidates[dice.roll(candidates.len())])
    }
}

/// Limb mutation: sever the chain at a random position and regrow one side.
/// The side is forced away from single-neighbour dead ends, otherwise a coin
/// decides. Fails when no sever point or no sufficiently long regrowth is
/// found within the retry bound.
pub fn limb_mutate(ctx: &Context, dice: &mut Dice, chromo: &mut Chromosome) -> bool {
    let n = chromo.len();
    if n < 2 {
        return false;
    }

    let mut sever = None;
    for _ in 0..MAX_STOCHASTIC_FAILS {
        let gene_id = dice.roll(n - 1) + 1;
        let (inc, out) = ctx.db.neighbour_counts(chromo.genes[gene_id].node_id);
        if inc == 1 && out == 1 {
            continue;
        }
        let left_limb = if inc == 1 {
            false
        } else if out == 1 {
            true
        } else {
            dice.coin()
        };
        sever = Some((gene_id, left_limb));
        break;
    }
    let Some((sever_id, left_limb)) = sever else {
        return false;
    };

    let remainder: Genes = if left_limb {
        chromo.genes[sever_id..].to_vec()
    } else {
        chromo.genes[..=sever_id].to_vec()
    };

    for _ in 0..MAX_STOCHASTIC_FAILS {
        let regrown = if left_limb {
            gen_random_genes_reverse(ctx, dice, ctx.max_len, remainder.clone())
        } else {
            gen_random_genes(ctx, dice, ctx.max_len, remainder.clone())
        };
        if regrown.len() >= ctx.min_len {
            chromo.genes = regrown;
            chromo.score = f32::NAN;
            chromo.origin = Origin::LimbMutate;
            return true;
        }
    }

    false
}

/// Crossover: splice the mother's head onto the father's tail at a shared
/// module. Crossing points are pairs of equal node ids whose child length
/// stays within the allowed band; picks are retried because the spliced
/// chain can still collide during synthesis.
pub fn cross(
    ctx: &Context,
    dice: &mut Dice,
    mother: &Chromosome,
    father: &Chromosome,
    out: &mut Chromosome,
) -> bool {
    let m = &mother.genes;
    let f = &father.genes;

    let points: Vec<(usize, usize)> = (0..m.len())
        .cartesian_product(0..f.len())
        .filter(|&(i, j)| {
            if m[i].node_id != f[j].node_id {
                return false;
            }
            let child_len = i + (f.len() - j);
            child_len >= ctx.min_len && child_len <= ctx.max_len
        })
        .collect();
    if points.is_empty() {
        return false;
    }

    for _ in 0..MAX_STOCHASTIC_FAILS {
        let (i, j) = points[dice.roll(points.len())];
        let mut genes: Genes = m[..i].iter().chain(f[j..].iter()).copied().collect();
        if synthesise(&ctx.db, &mut genes) {
            out.genes = genes;
            out.score = f32::NAN;
            out.origin = Origin::Cross;
            return true;
        }
    }

    false
}

/// Point mutate, falling back to limb mutate, falling back to a fresh
/// random chain. Always leaves a valid chromosome behind.
pub fn auto_mutate(ctx: &Context, dice: &mut Dice, chromo: &mut Chromosome) {
    if !point_mutate(ctx, dice, chromo) {
        debug!("point mutate found no candidate");
        if !limb_mutate(ctx, dice, chromo) {
            debug!("limb mutate found no candidate");
            randomise(ctx, dice, chromo);
        }
    }
}
