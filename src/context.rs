//! Setup-once state shared by every component.
use crate::geometry::{path_length, Points, Vec3};
use crate::module_db::ModuleDb;

/// The immutable context of a solve: the module database, the target path,
/// and the allowed chain length band derived from it. Built once at startup
/// and passed by reference everywhere; nothing in here changes mid-run.
#[derive(Debug)]
pub struct Context {
    pub db: ModuleDb,
    pub target: Points,
    pub min_len: usize,
    pub max_len: usize,
}

impl Context {
    pub fn new(db: ModuleDb, target: Points, avg_pair_dist: f32, len_dev: usize) -> Self {
        let expected = expected_len(&target, avg_pair_dist);
        // A deviation larger than the expected length saturates at 1 instead
        // of wrapping.
        let min_len = expected.saturating_sub(len_dev).max(1);
        let max_len = expected + len_dev;
        Self {
            db,
            target,
            min_len,
            max_len,
        }
    }
}

/// Expected chain length: total path displacement over the average CoM
/// distance of a module pair, plus one for the starting module.
pub fn expected_len(target: &[Vec3], avg_pair_dist: f32) -> usize {
    (path_length(target) / avg_pair_dist).round() as usize + 1
}
