//! The generational evolution engine.
//!
//! Two equally sized population buffers alternate roles each generation: the
//! current buffer is read-only while the scratch buffer is rewritten by the
//! evolve phase, scored, ranked, and dedup-selected, then the roles swap.
//! Survivors always live at the head of the current buffer.
//!
//! Evolve and score fan out over worker threads; each worker owns a
//! contiguous slot range and its own RNG stream, so a fixed seed and worker
//! count reproduce a run exactly. Rank, select, and the swap run on one
//! thread.
mod builder;

pub use self::builder::Builder;

use crate::chromosome::{Chromosome, Origin};
use crate::config::SolverConfig;
use crate::context::Context;
use crate::mutation;
use crate::rng::Dice;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Scores closer than this are considered stagnant between generations.
pub const STAGNANCY_TOLERANCE: f32 = 1e-5;

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Best score dropped below the stop threshold.
    ScoreReached,
    /// Best score failed to improve for the configured generation count.
    Stagnant,
    /// External stop flag was raised; the generation in flight completed.
    Interrupted,
    /// Ran the full generation budget.
    GenerationsExhausted,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::ScoreReached => write!(f, "score threshold reached"),
            Outcome::Stagnant => write!(f, "stagnancy limit reached"),
            Outcome::Interrupted => write!(f, "interrupted"),
            Outcome::GenerationsExhausted => write!(f, "generation budget exhausted"),
        }
    }
}

/// Slot index thresholds partitioning each generation's scratch buffer.
/// `[0, survivor)` is reserved for selected survivors; the remaining slots
/// are assigned to crossover, point mutation, limb mutation, or full
/// randomisation by a uniform draw.
#[derive(Clone, Copy, Debug)]
pub struct Cutoffs {
    pub survivor: usize,
    pub cross: usize,
    pub point: usize,
    pub limb: usize,
}

impl Cutoffs {
    fn derive(config: &SolverConfig) -> Self {
        let n = config.pop_size;
        let survivor = (config.survive_rate * n as f32).round() as usize;
        let non_survivors = (n - survivor) as f32;
        let cross = survivor + (config.cross_rate * non_survivors).round() as usize;
        let point = cross + (config.point_mutate_rate * non_survivors).round() as usize;
        let limb = (point + (config.limb_mutate_rate * non_survivors).round() as usize).min(n);
        Self {
            survivor,
            cross,
            point,
            limb,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct PhaseTimings {
    evolve: Duration,
    score: Duration,
    rank: Duration,
    select: Duration,
    total: Duration,
}

pub struct Solver {
    ctx: Context,
    config: SolverConfig,
    cutoffs: Cutoffs,
    workers: usize,
    streams: Vec<Dice>,
    buffers: [Vec<Chromosome>; 2],
    current: usize,
    best_so_far: Vec<Chromosome>,
    stop_flag: Arc<AtomicBool>,
    timings: PhaseTimings,
}

impl Solver {
    pub fn builder() -> Builder {
        Builder::new()
    }

    pub(crate) fn from_parts(
        ctx: Context,
        config: SolverConfig,
        workers: usize,
        streams: Vec<Dice>,
    ) -> Self {
        let cutoffs = Cutoffs::derive(&config);
        Self {
            ctx,
            config,
            cutoffs,
            workers,
            streams,
            buffers: [Vec::new(), Vec::new()],
            current: 0,
            best_so_far: Vec::new(),
            stop_flag: Arc::new(AtomicBool::new(false)),
            timings: PhaseTimings::default(),
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn cutoffs(&self) -> Cutoffs {
        self.cutoffs
    }

    /// Raise from any thread to stop after the generation in flight.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_flag)
    }

    /// The ranked population of the last completed generation.
    pub fn population(&self) -> &[Chromosome] {
        &self.buffers[self.current]
    }

    /// Top-scoring snapshot, refreshed after every generation.
    pub fn best_so_far(&self) -> &[Chromosome] {
        &self.best_so_far
    }

    pub fn run(&mut self) -> Outcome {
        log::info!(
            "solver starting: population {}, generations {}, cutoffs {}/{}/{}/{}, \
             chain length {}..={}, {} workers",
            self.config.pop_size,
            self.config.generations,
            self.cutoffs.survivor,
            self.cutoffs.cross,
            self.cutoffs.point,
            self.cutoffs.limb,
            self.ctx.min_len,
            self.ctx.max_len,
            self.workers,
        );

        let start = Instant::now();
        self.init_population();

        let mut last_best = f32::INFINITY;
        let mut stagnant_count = 0usize;
        let mut outcome = Outcome::GenerationsExhausted;

        for generation in 0..self.config.generations {
            let generation_start = Instant::now();

            self.evolve_phase();
            self.score_phase();
            self.rank_phase();
            self.select_phase();
            self.current ^= 1;

            let population = &self.buffers[self.current];
            let best = &population[0];
            let best_score = best.score;
            let worst_score = population[population.len() - 1].score;
            let generation_time = generation_start.elapsed();
            self.timings.total += generation_time;

            log::info!(
                "generation #{}: best={:.2} ({:.2}/module), worst={:.2}, took {}ms",
                generation,
                best_score,
                best_score / best.len() as f32,
                worst_score,
                generation_time.as_millis(),
            );
            let gens = (generation + 1) as u32;
            log::debug!(
                "avg times: evolve={}ms score={}ms rank={}ms select={}ms total={}ms",
                (self.timings.evolve / gens).as_millis(),
                (self.timings.score / gens).as_millis(),
                (self.timings.rank / gens).as_millis(),
                (self.timings.select / gens).as_millis(),
                (self.timings.total / gens).as_millis(),
            );

            let n_best = self.config.n_best_sols.min(population.len());
            self.best_so_far = population[..n_best].to_vec();

            if best_score < self.config.stop_score {
                log::info!("score stop threshold {:.2} reached", self.config.stop_score);
                outcome = Outcome::ScoreReached;
                break;
            }

            if (best_score - last_best).abs() < STAGNANCY_TOLERANCE {
                stagnant_count += 1;
            } else {
                stagnant_count = 0;
            }
            last_best = best_score;

            if stagnant_count >= self.config.max_stagnant_gens {
                log::warn!(
                    "stopping: no improvement for {} generations",
                    self.config.max_stagnant_gens
                );
                outcome = Outcome::Stagnant;
                break;
            }
            log::debug!(
                "stagnancy: {}/{}",
                stagnant_count,
                self.config.max_stagnant_gens
            );

            if self.stop_flag.load(Ordering::SeqCst) {
                log::warn!("stop flag raised; finishing after generation #{}", generation);
                outcome = Outcome::Interrupted;
                break;
            }
        }

        log::info!("solver finished ({}) in {:?}", outcome, start.elapsed());
        outcome
    }

    /// Randomise every slot of both buffers identically, then eagerly score
    /// the last slot of each as a hard invariant check on the scoring path.
    fn init_population(&mut self) {
        let n = self.config.pop_size;
        self.buffers[0] = vec![Chromosome::new(); n];

        let ctx = &self.ctx;
        let chunk = chunk_size(n, self.workers);
        self.buffers[0]
            .chunks_mut(chunk)
            .zip(self.streams.iter_mut())
            .par_bridge()
            .for_each(|(slots, dice)| {
                for slot in slots {
                    mutation::randomise(ctx, dice, slot);
                }
            });

        let seeded = self.buffers[0].clone();
        self.buffers[1] = seeded;
        self.buffers[0][n - 1].score(&self.ctx.target);
        self.buffers[1][n - 1].score(&self.ctx.target);
        self.current = 0;
        self.best_so_far.clear();
        log::debug!("initialised {} random individuals", n);
    }

    /// Rewrite the non-survivor scratch slots from the current population.
    fn evolve_phase(&mut self) {
        let now = Instant::now();
        let (current, scratch) = split_buffers(&mut self.buffers, self.current);
        let cutoffs = self.cutoffs;
        let pop_size = self.config.pop_size;
        let ctx = &self.ctx;

        let slots = &mut scratch[cutoffs.survivor..];
        if !slots.is_empty() {
            let chunk = chunk_size(slots.len(), self.workers);
            slots
                .chunks_mut(chunk)
                .zip(self.streams.iter_mut())
                .par_bridge()
                .for_each(|(slots, dice)| {
                    for slot in slots {
                        evolve_slot(ctx, cutoffs, pop_size, current, dice, slot);
                    }
                });
        }
        self.timings.evolve += now.elapsed();
    }

    fn score_phase(&mut self) {
        let now = Instant::now();
        let (_, scratch) = split_buffers(&mut self.buffers, self.current);
        let target = &self.ctx.target;
        scratch.par_iter_mut().for_each(|chromo| chromo.score(target));
        self.timings.score += now.elapsed();
    }

    /// Ascending by score; lower is fitter.
    fn rank_phase(&mut self) {
        let now = Instant::now();
        let (_, scratch) = split_buffers(&mut self.buffers, self.current);
        scratch.sort_unstable_by(|a, b| a.score.total_cmp(&b.score));
        self.timings.rank += now.elapsed();
    }

    /// Walk the ranked scratch and keep the first `survivor` individuals with
    /// unseen checksums, overwriting the scratch head in rank order. Low
    /// indexes take priority, so this stays single-threaded.
    fn select_phase(&mut self) {
        let now = Instant::now();
        let survivor_cutoff = self.cutoffs.survivor;
        let (_, scratch) = split_buffers(&mut self.buffers, self.current);

        let mut seen: FxHashSet<u32> = FxHashSet::default();
        let mut survivors: Vec<Chromosome> = Vec::with_capacity(survivor_cutoff);
        for chromo in scratch.iter() {
            if seen.insert(chromo.checksum()) {
                survivors.push(chromo.clone());
                if survivors.len() >= survivor_cutoff {
                    break;
                }
            }
        }

        for (slot, survivor) in scratch.iter_mut().zip(survivors) {
            *slot = survivor;
        }
        self.timings.select += now.elapsed();
    }
}

/// Borrow the current buffer read-only and the scratch buffer mutably.
fn split_buffers(
    buffers: &mut [Vec<Chromosome>; 2],
    current: usize,
) -> (&[Chromosome], &mut [Chromosome]) {
    let (head, tail) = buffers.split_at_mut(1);
    if current == 0 {
        (&head[0], &mut tail[0])
    } else {
        (&tail[0], &mut head[0])
    }
}

fn chunk_size(len: usize, workers: usize) -> usize {
    len.div_ceil(workers).max(1)
}

/// Decide one scratch slot's fate by a uniform draw over the non-survivor
/// slot range, mirroring the configured operator cutoffs.
fn evolve_slot(
    ctx: &Context,
    cutoffs: Cutoffs,
    pop_size: usize,
    current: &[Chromosome],
    dice: &mut Dice,
    slot: &mut Chromosome,
) {
    let evolution_dice = cutoffs.survivor + dice.roll(pop_size - cutoffs.survivor);

    if evolution_dice < cutoffs.cross {
        // One parent from the survivors, one from anywhere; a coin decides
        // which side gets the head start.
        let (mother_id, father_id) = if dice.coin() {
            (dice.roll(cutoffs.survivor), dice.roll(pop_size))
        } else {
            (dice.roll(pop_size), dice.roll(cutoffs.survivor))
        };
        let mother = &current[mother_id];
        let father = &current[father_id];

        if !mutation::cross(ctx, dice, mother, father, slot) {
            *slot = mother.copied();
            mutation::auto_mutate(ctx, dice, slot);
            slot.origin = Origin::AutoMutate;
        }
    } else {
        let parent_id = dice.roll(cutoffs.survivor);
        *slot = current[parent_id].copied();

        if evolution_dice < cutoffs.point {
            if !mutation::point_mutate(ctx, dice, slot) {
                mutation::randomise(ctx, dice, slot);
            }
        } else if evolution_dice < cutoffs.limb {
            if !mutation::limb_mutate(ctx, dice, slot) {
                mutation::randomise(ctx, dice, slot);
            }
        } else {
            // Slots beyond the mutation cutoffs restart from scratch.
            mutation::randomise(ctx, dice, slot);
        }
    }
}
