use crate::geometry::Vec3;

/// One link of a chain: a module id plus its centre-of-mass in the frame of
/// the chain tip. The CoM is derived by synthesis, never authoritative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gene {
    pub node_id: usize,
    pub com: Vec3,
}

impl Gene {
    pub fn new(node_id: usize) -> Self {
        Self {
            node_id,
            com: Vec3::ZERO,
        }
    }
}

pub type Genes = Vec<Gene>;
