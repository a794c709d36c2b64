//! Phase 2: exact allocation minimizing the busiest day.
//!
//! # Network
//!
//! ```text
//! source --load--> assignment --1--> slot --1--> day --min(L, day slots)--> sink
//! ```
//!
//! An assignment links to every slot of the term's universe that lies inside
//! its window. Every assignment is fully allocated under a per-day cap `L` iff
//! the max flow equals the total load. Feasibility is monotone in `L`, so a
//! binary search over `[0, busiest day's slot count]` finds the smallest cap;
//! one more run at that cap yields the slots: an assignment -> slot edge with
//! no residual capacity left carried one unit of flow.
//!
//! Nothing from Phase 1 is reused; meetings are the only busy input.

use std::ops::Range;

use log::debug;
use serde::{Deserialize, Serialize};

use super::flow::{EdgeRef, FlowNetwork};
use super::interval::Interval;
use super::materialize::Placement;
use super::slots::SlotUniverse;
use crate::domain::{Assignment, StudyWindow, TermData};

/// Why no fully-satisfying allocation exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum Infeasibility {
    /// An assignment's window holds no free slot at all
    NoUsableSlots { assignment_id: String },
    /// The whole term has fewer free slots than the total load
    InsufficientSupply { demand: i64, supply: i64 },
    /// Overlapping windows compete for too few slots even with no daily cap
    OverCapacity { demand: i64, allocatable: i64 },
}

impl std::fmt::Display for Infeasibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoUsableSlots { assignment_id } => {
                write!(f, "assignment {} has no free slot in its window", assignment_id)
            }
            Self::InsufficientSupply { demand, supply } => {
                write!(f, "{} units required but the term only has {} free slots", demand, supply)
            }
            Self::OverCapacity { demand, allocatable } => {
                write!(f, "{} units required but at most {} fit inside the windows", demand, allocatable)
            }
        }
    }
}

/// Result of the optimizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allocation {
    Feasible {
        placements: Vec<Placement>,
        /// Smallest achievable session count of the busiest day
        max_day_load: usize,
    },
    Infeasible(Infeasibility),
}

struct Demand<'a> {
    assignment: &'a Assignment,
    slots: Range<usize>,
}

/// Layered slot network for one term.
struct SlotNetwork<'a> {
    universe: &'a SlotUniverse,
    demands: Vec<Demand<'a>>,
    total_demand: i64,
}

impl<'a> SlotNetwork<'a> {
    const SOURCE: usize = 0;

    fn assignment_node(&self, k: usize) -> usize {
        1 + k
    }

    fn slot_node(&self, s: usize) -> usize {
        1 + self.demands.len() + s
    }

    fn day_node(&self, d: usize) -> usize {
        1 + self.demands.len() + self.universe.len() + d
    }

    fn sink(&self) -> usize {
        1 + self.demands.len() + self.universe.len() + self.universe.days().len()
    }

    /// Build the network for per-day cap `cap`, returning each assignment's slot edges.
    fn build(&self, cap: usize) -> (FlowNetwork, Vec<Vec<EdgeRef>>) {
        let mut net = FlowNetwork::new(self.sink() + 1);
        let mut slot_edges = Vec::with_capacity(self.demands.len());

        for (k, demand) in self.demands.iter().enumerate() {
            let node = self.assignment_node(k);
            net.add_edge(Self::SOURCE, node, demand.assignment.load);
            let edges = demand
                .slots
                .clone()
                .map(|s| net.add_edge(node, self.slot_node(s), 1))
                .collect();
            slot_edges.push(edges);
        }

        for s in 0..self.universe.len() {
            net.add_edge(self.slot_node(s), self.day_node(self.universe.day_of(s)), 1);
        }

        for d in 0..self.universe.days().len() {
            let day_cap = cap.min(self.universe.day_capacity(d)) as i64;
            net.add_edge(self.day_node(d), self.sink(), day_cap);
        }

        (net, slot_edges)
    }

    fn max_flow(&self, cap: usize) -> i64 {
        let (mut net, _) = self.build(cap);
        net.max_flow(Self::SOURCE, self.sink())
    }

    fn feasible(&self, cap: usize) -> bool {
        self.max_flow(cap) == self.total_demand
    }

    /// Run at `cap` and read back which slots each assignment consumed.
    fn extract(&self, cap: usize) -> Vec<Placement> {
        let (mut net, slot_edges) = self.build(cap);
        net.max_flow(Self::SOURCE, self.sink());

        let slot_base = self.slot_node(0);
        let mut placements = Vec::new();
        for (demand, edges) in self.demands.iter().zip(slot_edges) {
            for edge in edges.into_iter().filter(|e| net.residual(*e) == 0) {
                let slot = self.universe.slots()[net.head(edge) - slot_base];
                placements.push(Placement::new(demand.assignment.id.clone(), slot));
            }
        }
        placements
    }
}

/// Find a full allocation minimizing the busiest day, or prove none exists.
///
/// `meetings` must be merged.
pub fn optimize(data: &TermData, window: &StudyWindow, meetings: &[Interval]) -> Allocation {
    let universe = SlotUniverse::build(&data.term, window, meetings);

    let mut demands = Vec::new();
    for assignment in data.assignments().filter(|a| a.load > 0) {
        let slots = universe.within(&Interval::new(assignment.start, assignment.due));
        if slots.is_empty() {
            return Allocation::Infeasible(Infeasibility::NoUsableSlots {
                assignment_id: assignment.id.clone(),
            });
        }
        demands.push(Demand { assignment, slots });
    }

    // Saturates: a total beyond i64 can never fit the universe anyway
    let total_demand = demands
        .iter()
        .fold(0i64, |acc, d| acc.saturating_add(d.assignment.load));
    let supply = universe.len() as i64;
    if supply < total_demand {
        return Allocation::Infeasible(Infeasibility::InsufficientSupply {
            demand: total_demand,
            supply,
        });
    }

    let network = SlotNetwork {
        universe: &universe,
        demands,
        total_demand,
    };

    let upper = universe.max_day_capacity();
    let allocatable = network.max_flow(upper);
    if allocatable < total_demand {
        return Allocation::Infeasible(Infeasibility::OverCapacity {
            demand: total_demand,
            allocatable,
        });
    }

    let (mut lo, mut hi) = (0, upper);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let ok = network.feasible(mid);
        debug!("Optimizer probe cap={} feasible={}", mid, ok);
        if ok {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }

    debug!(
        "Optimizer settled on cap {} for {} units over {} slots",
        lo,
        total_demand,
        universe.len()
    );
    Allocation::Feasible {
        placements: network.extract(lo),
        max_day_load: lo,
    }
}
