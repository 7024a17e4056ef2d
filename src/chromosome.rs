//! Chromosomes and chain synthesis.
//!
//! A chromosome is an ordered module chain. Synthesis realizes the chain's
//! centres-of-mass by composing pair transforms cumulatively: each appended
//! module becomes the new tip frame at the origin and all previously placed
//! genes are moved into it. A chain whose modules overlap is rejected.
use crate::gene::{Gene, Genes};
use crate::geometry::{Points, Vec3};
use crate::kabsch;
use crate::module_db::ModuleDb;

/// Provenance of a chromosome, set by whichever operator produced it last.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    New,
    Copy,
    GeneCopy,
    AutoMutate,
    Cross,
    PointMutate,
    LimbMutate,
    Random,
}

#[derive(Clone, Debug)]
pub struct Chromosome {
    pub genes: Genes,
    /// Kabsch score against the target path; NaN until scored.
    pub score: f32,
    pub origin: Origin,
}

impl Chromosome {
    pub fn new() -> Self {
        Self {
            genes: Vec::new(),
            score: f32::NAN,
            origin: Origin::New,
        }
    }

    pub fn from_genes(genes: Genes) -> Self {
        Self {
            genes,
            score: f32::NAN,
            origin: Origin::GeneCopy,
        }
    }

    /// A copy tagged as such; the score carries over.
    pub fn copied(&self) -> Self {
        Self {
            genes: self.genes.clone(),
            score: self.score,
            origin: Origin::Copy,
        }
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn score(&mut self, target: &[Vec3]) {
        let coms = self.coms();
        self.score = kabsch::score(&coms, target);
    }

    pub fn coms(&self) -> Points {
        self.genes.iter().map(|g| g.com).collect()
    }

    pub fn node_names<'a>(&self, db: &'a ModuleDb) -> Vec<&'a str> {
        self.genes.iter().map(|g| db.name(g.node_id)).collect()
    }

    /// CRC-32 over the concatenated CoM bytes. Two chromosomes collide
    /// (mod hash collisions) iff they realize the identical 3D chain.
    pub fn checksum(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        for gene in &self.genes {
            hasher.update(bytemuck::bytes_of(&gene.com));
        }
        hasher.finalize()
    }
}

impl Default for Chromosome {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a module with `new_com` overlaps any gene in `others`. Two genes
/// collide iff their CoM distance is strictly below the sum of their
/// collision radii. Callers pass a window that excludes the immediate
/// neighbour pair, which touches by construction of the transform.
pub fn collides(db: &ModuleDb, new_id: usize, new_com: Vec3, others: &[Gene]) -> bool {
    let new_radius = db.radius(new_id);
    others
        .iter()
        .any(|g| g.com.dist_to(&new_com) < db.radius(g.node_id) + new_radius)
}

/// Forward synthesis. Grows the chain left-to-right; after success the LAST
/// gene sits at the origin and all earlier genes are positioned in the tip's
/// frame. Returns `false` when the chain would collide with itself.
///
/// Every consecutive pair must have a transform: callers validate pairs
/// before synthesising, so a missing transform aborts.
pub fn synthesise(db: &ModuleDb, genes: &mut Genes) -> bool {
    for gene in genes.iter_mut() {
        gene.com = Vec3::ZERO;
    }

    for i in 1..genes.len() {
        let lhs = genes[i - 1].node_id;
        let rhs = genes[i].node_id;
        let pair = db
            .transform(lhs, rhs)
            .unwrap_or_else(|| missing_pair(db, lhs, rhs));

        // Collision window stops before the immediate predecessor pair.
        if collides(db, rhs, pair.com_b, &genes[..i.saturating_sub(2)]) {
            return false;
        }

        let (placed, _) = genes.split_at_mut(i);
        for gene in placed {
            gene.com = gene.com.rotated(&pair.rot) + pair.tran;
        }
    }

    true
}

/// Reverse synthesis: grows right-to-left using the inverse transforms.
/// After success the FIRST gene sits at the origin.
pub fn synthesise_reverse(db: &ModuleDb, genes: &mut Genes) -> bool {
    for gene in genes.iter_mut() {
        gene.com = Vec3::ZERO;
    }

    let n = genes.len();
    for i in (1..n).rev() {
        let lhs = genes[i - 1].node_id;
        let rhs = genes[i].node_id;
        let pair = db
            .transform(lhs, rhs)
            .unwrap_or_else(|| missing_pair(db, lhs, rhs));

        let window_start = (i + 2).min(n);
        if collides(db, lhs, pair.tran, &genes[window_start..]) {
            return false;
        }

        for gene in &mut genes[i..] {
            gene.com = (gene.com - pair.tran).rotated(&pair.rot_inv);
        }
    }

    true
}

fn missing_pair(db: &ModuleDb, lhs: usize, rhs: usize) -> ! {
    panic!(
        "synthesise: impossible pair {}({}) <-x-> {}({})",
        lhs,
        db.name(lhs),
        rhs,
        db.name(rhs)
    );
}
