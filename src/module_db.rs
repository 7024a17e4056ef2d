//! The immutable module database.
//!
//! Modules are rigid bodies identified by a dense integer id. For every
//! ordered pair `(a, b)` the database may hold a precomputed rigid-body
//! relationship placing `b` immediately after `a`; absence means the pair is
//! forbidden. The pair table is a dense `dim * dim` arena indexed `a * dim + b`.
//!
//! Two lookup tables are derived once at construction and never change:
//! per-module neighbour counts (in/out degree over the pair graph) and the
//! global roulette, in which each id appears once per outgoing neighbour so
//! that well-connected modules are favoured as chain starting points.
use crate::errors::{Error, Result};
use crate::geometry::{Mat3, Vec3};
use log::debug;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Collision radii of a module, one value per measure.
#[derive(Clone, Copy, Debug)]
pub struct Radii {
    pub avg_all: f32,
    pub max_ca: f32,
    pub max_heavy: f32,
}

impl Radii {
    /// The measure used by the collision predicate.
    pub fn collision(&self) -> f32 {
        self.max_heavy
    }
}

/// Rigid-body relationship for appending module `b` after module `a`.
#[derive(Clone, Copy, Debug)]
pub struct PairTransform {
    /// CoM of `b` in `a`'s local frame.
    pub com_b: Vec3,
    pub rot: Mat3,
    /// Transpose of `rot`, used when growing a chain leftwards.
    pub rot_inv: Mat3,
    pub tran: Vec3,
}

impl PairTransform {
    pub fn new(com_b: Vec3, rot: Mat3, tran: Vec3) -> Self {
        Self {
            com_b,
            rot,
            rot_inv: rot.transpose(),
            tran,
        }
    }
}

#[derive(Debug)]
pub struct ModuleDb {
    dim: usize,
    transforms: Vec<Option<PairTransform>>,
    radii: Vec<Radii>,
    names: Vec<String>,
    name_ids: FxHashMap<String, usize>,
    neighbour_counts: Vec<(usize, usize)>,
    global_roulette: Vec<usize>,
}

impl ModuleDb {
    pub fn new(
        names: Vec<String>,
        transforms: Vec<Option<PairTransform>>,
        radii: Vec<Radii>,
    ) -> Result<Self> {
        let dim = names.len();
        if dim == 0 {
            return Err(Error::Db("no modules defined".into()));
        }
        if transforms.len() != dim * dim {
            return Err(Error::Db(format!(
                "pair table is not square: {} entries for {} modules",
                transforms.len(),
                dim
            )));
        }
        if radii.len() != dim {
            return Err(Error::Db(format!(
                "radii list has {} entries for {} modules",
                radii.len(),
                dim
            )));
        }

        let name_ids: FxHashMap<String, usize> = names
            .iter()
            .enumerate()
            .map(|(id, name)| (name.clone(), id))
            .collect();
        if name_ids.len() != dim {
            return Err(Error::Db("duplicate module name".into()));
        }

        let mut neighbour_counts = vec![(0usize, 0usize); dim];
        for a in 0..dim {
            for b in 0..dim {
                if transforms[a * dim + b].is_some() {
                    neighbour_counts[a].1 += 1;
                    neighbour_counts[b].0 += 1;
                }
            }
        }

        let mut global_roulette = Vec::new();
        for (id, &(_, out)) in neighbour_counts.iter().enumerate() {
            global_roulette.extend(std::iter::repeat(id).take(out));
        }
        if global_roulette.is_empty() {
            return Err(Error::Db("pair table has no transforms at all".into()));
        }

        Ok(Self {
            dim,
            transforms,
            radii,
            names,
            name_ids,
            neighbour_counts,
            global_roulette,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn transform(&self, a: usize, b: usize) -> Option<&PairTransform> {
        self.transforms[a * self.dim + b].as_ref()
    }

    /// Collision radius of a module under the chosen measure.
    pub fn radius(&self, id: usize) -> f32 {
        self.radii[id].collision()
    }

    pub fn name(&self, id: usize) -> &str {
        &self.names[id]
    }

    pub fn id(&self, name: &str) -> Option<usize> {
        self.name_ids.get(name).copied()
    }

    /// `(in_degree, out_degree)` of a module in the pair graph.
    pub fn neighbour_counts(&self, id: usize) -> (usize, usize) {
        self.neighbour_counts[id]
    }

    pub fn global_roulette(&self) -> &[usize] {
        &self.global_roulette
    }

    /// Load the xDB JSON layout: `doublesData[a][b] = {comB, rot, tran}` and
    /// `singlesData[name].radii`. Module ids are assigned in sorted name
    /// order, which keeps them stable across runs.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let file: XdbFile = serde_json::from_str(text)?;

        let names: Vec<String> = file.doubles_data.keys().cloned().collect();
        let dim = names.len();
        let ids: FxHashMap<&str, usize> = names
            .iter()
            .enumerate()
            .map(|(id, name)| (name.as_str(), id))
            .collect();

        let mut transforms: Vec<Option<PairTransform>> = vec![None; dim * dim];
        for (a_name, row) in &file.doubles_data {
            let a = ids[a_name.as_str()];
            debug!("module {} <-> id {}, {} neighbours", a_name, a, row.len());
            for (b_name, pair) in row {
                let b = *ids.get(b_name.as_str()).ok_or_else(|| {
                    Error::Db(format!(
                        "pair {} -> {} references an unknown module",
                        a_name, b_name
                    ))
                })?;
                transforms[a * dim + b] = Some(pair.to_transform()?);
            }
        }

        let mut radii = Vec::with_capacity(dim);
        for name in &names {
            let single = file.singles_data.get(name).ok_or_else(|| {
                Error::Db(format!("module {} is missing from singlesData", name))
            })?;
            radii.push(Radii {
                avg_all: single.radii.avg_all,
                max_ca: single.radii.max_ca,
                max_heavy: single.radii.max_heavy,
            });
        }

        Self::new(names, transforms, radii)
    }
}

#[derive(Deserialize)]
struct XdbFile {
    #[serde(rename = "doublesData")]
    doubles_data: BTreeMap<String, BTreeMap<String, PairJson>>,
    #[serde(rename = "singlesData")]
    singles_data: BTreeMap<String, SingleJson>,
}

#[derive(Deserialize)]
struct PairJson {
    #[serde(rename = "comB")]
    com_b: [f32; 3],
    rot: [[f32; 3]; 3],
    /// Stored as nested rows in the source data; flattened to 3 components.
    tran: Vec<Vec<f32>>,
}

impl PairJson {
    fn to_transform(&self) -> Result<PairTransform> {
        let flat: Vec<f32> = self.tran.iter().flatten().copied().collect();
        if flat.len() != 3 {
            return Err(Error::Db(format!(
                "tran must have 3 components, found {}",
                flat.len()
            )));
        }
        Ok(PairTransform::new(
            Vec3::new(self.com_b[0], self.com_b[1], self.com_b[2]),
            Mat3::from_rows(self.rot),
            Vec3::new(flat[0], flat[1], flat[2]),
        ))
    }
}

#[derive(Deserialize)]
struct SingleJson {
    radii: RadiiJson,
}

#[derive(Deserialize)]
struct RadiiJson {
    #[serde(rename = "avgAll")]
    avg_all: f32,
    #[serde(rename = "maxCA")]
    max_ca: f32,
    #[serde(rename = "maxHeavy")]
    max_heavy: f32,
}
