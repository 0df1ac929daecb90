// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Skeleton assembly from per-limb matchings.
//!
//! Limbs are visited in topology order. An accepted pair either extends the
//! skeleton that already owns one of its endpoints, starts a new skeleton when
//! neither endpoint is owned, or is dropped when it would hand a candidate to
//! a second skeleton. Partial skeletons are never merged: the first claim on a
//! candidate wins.

use crate::assignment::Connection;
use crate::topology::Topology;

/// One person: a candidate index (or nothing) per part type.
pub type Skeleton = Vec<Option<usize>>;

/// Stitch per-limb connections into skeletons.
///
/// # Arguments
///
/// * `connections` - One matching per limb type, in topology order.
/// * `topology` - Limb table giving the part types joined by each limb.
/// * `counts` - Number of candidates per part type.
/// * `max_objects` - Skeletons kept, earliest formed first.
#[must_use]
pub fn connect_parts(
    connections: &[Connection],
    topology: &Topology,
    counts: &[usize],
    max_objects: usize,
) -> Vec<Skeleton> {
    let mut builder = SkeletonBuilder::new(topology.num_parts(), counts);

    for (limb, connection) in topology.limbs().iter().zip(connections) {
        for (a, b) in connection
            .iter()
            .enumerate()
            .filter_map(|(a, b)| b.map(|b| (a, b)))
        {
            builder.link(limb.part_a, a, limb.part_b, b);
        }
    }

    let mut skeletons = builder.skeletons;
    skeletons.truncate(max_objects);
    skeletons
}

/// Partially built skeletons plus the owner of every claimed candidate.
struct SkeletonBuilder {
    num_parts: usize,
    skeletons: Vec<Skeleton>,
    /// `owners[part][candidate]` is the index of the claiming skeleton.
    owners: Vec<Vec<Option<usize>>>,
}

impl SkeletonBuilder {
    fn new(num_parts: usize, counts: &[usize]) -> Self {
        let owners = (0..num_parts)
            .map(|part| vec![None; counts.get(part).copied().unwrap_or(0)])
            .collect();
        Self {
            num_parts,
            skeletons: Vec::new(),
            owners,
        }
    }

    fn owner(&self, part: usize, candidate: usize) -> Option<Option<usize>> {
        self.owners.get(part)?.get(candidate).copied()
    }

    fn claim(&mut self, skeleton: usize, part: usize, candidate: usize) {
        self.skeletons[skeleton][part] = Some(candidate);
        self.owners[part][candidate] = Some(skeleton);
    }

    fn link(&mut self, part_a: usize, a: usize, part_b: usize, b: usize) {
        // candidates outside the counted range are ignored
        let (Some(owner_a), Some(owner_b)) = (self.owner(part_a, a), self.owner(part_b, b)) else {
            return;
        };

        match (owner_a, owner_b) {
            (None, None) => {
                let index = self.skeletons.len();
                self.skeletons.push(vec![None; self.num_parts]);
                self.claim(index, part_a, a);
                self.claim(index, part_b, b);
            }
            (Some(s), None) => {
                if self.skeletons[s][part_b].is_none() {
                    self.claim(s, part_b, b);
                }
            }
            (None, Some(s)) => {
                if self.skeletons[s][part_a].is_none() {
                    self.claim(s, part_a, a);
                }
            }
            // same skeleton: already consistent; different: first claim wins
            (Some(_), Some(_)) => {}
        }
    }
}
