//! Generic max-flow solver (Dinic).
//!
//! BFS builds a level graph from the source; a blocking flow is then pushed
//! along strictly level-increasing edges by an iterative depth-first search.
//! Each node keeps a cursor to its next untried edge, so dead ends are never
//! revisited within a phase and no recursion is needed however long the
//! augmenting paths get.
//!
//! # Complexity
//! O(V^2 * E) in general; O(E * sqrt(V)) on unit-capacity bipartite layers
//! like the slot network.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
struct Edge {
    to: usize,
    /// Index of the paired reverse edge in `graph[to]`
    rev: usize,
    cap: i64,
}

/// Handle to a forward edge, for reading its residual capacity after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRef {
    from: usize,
    index: usize,
}

/// A flow network with residual bookkeeping.
#[derive(Debug, Clone)]
pub struct FlowNetwork {
    graph: Vec<Vec<Edge>>,
    level: Vec<i32>,
    cursor: Vec<usize>,
}

impl FlowNetwork {
    pub fn new(nodes: usize) -> Self {
        Self {
            graph: vec![Vec::new(); nodes],
            level: vec![-1; nodes],
            cursor: vec![0; nodes],
        }
    }

    /// Add a directed edge and its zero-capacity reverse edge.
    pub fn add_edge(&mut self, from: usize, to: usize, cap: i64) -> EdgeRef {
        let index = self.graph[from].len();
        let rev = self.graph[to].len() + usize::from(from == to);
        self.graph[from].push(Edge { to, rev, cap });
        self.graph[to].push(Edge {
            to: from,
            rev: index,
            cap: 0,
        });
        EdgeRef { from, index }
    }

    /// Remaining capacity of a forward edge.
    pub fn residual(&self, edge: EdgeRef) -> i64 {
        self.graph[edge.from][edge.index].cap
    }

    /// Head node of a forward edge.
    pub fn head(&self, edge: EdgeRef) -> usize {
        self.graph[edge.from][edge.index].to
    }

    /// Push as much flow as possible from `source` to `sink`.
    ///
    /// Capacities are consumed in place; the residual graph stays available
    /// through [`Self::residual`] afterwards.
    pub fn max_flow(&mut self, source: usize, sink: usize) -> i64 {
        if source == sink {
            return 0;
        }

        let mut total = 0;
        while self.build_levels(source, sink) {
            self.cursor.iter_mut().for_each(|c| *c = 0);
            total += self.blocking_flow(source, sink);
        }
        total
    }

    fn build_levels(&mut self, source: usize, sink: usize) -> bool {
        self.level.iter_mut().for_each(|l| *l = -1);
        self.level[source] = 0;

        let mut queue = VecDeque::from([source]);
        while let Some(v) = queue.pop_front() {
            for edge in &self.graph[v] {
                if edge.cap > 0 && self.level[edge.to] < 0 {
                    self.level[edge.to] = self.level[v] + 1;
                    queue.push_back(edge.to);
                }
            }
        }

        self.level[sink] >= 0
    }

    fn blocking_flow(&mut self, source: usize, sink: usize) -> i64 {
        let mut total = 0;
        // (node, edge index) pairs along the current partial path
        let mut path: Vec<(usize, usize)> = Vec::new();
        let mut v = source;

        loop {
            if v == sink {
                let pushed = path
                    .iter()
                    .map(|&(u, i)| self.graph[u][i].cap)
                    .min()
                    .unwrap_or(0);
                for &(u, i) in &path {
                    let (to, rev) = (self.graph[u][i].to, self.graph[u][i].rev);
                    self.graph[u][i].cap -= pushed;
                    self.graph[to][rev].cap += pushed;
                }
                total += pushed;

                // Resume from the tail of the first saturated edge.
                let cut = path
                    .iter()
                    .position(|&(u, i)| self.graph[u][i].cap == 0)
                    .unwrap_or(0);
                v = path[cut].0;
                path.truncate(cut);
                continue;
            }

            if let Some(i) = self.advance(v) {
                path.push((v, i));
                v = self.graph[v][i].to;
                continue;
            }

            // Dead end: retreat and skip the edge that led here.
            self.level[v] = -1;
            match path.pop() {
                Some((u, _)) => {
                    self.cursor[u] += 1;
                    v = u;
                }
                None => return total,
            }
        }
    }

    /// Next admissible edge out of `v`, moving its cursor past dead ones.
    fn advance(&mut self, v: usize) -> Option<usize> {
        while self.cursor[v] < self.graph[v].len() {
            let edge = &self.graph[v][self.cursor[v]];
            if edge.cap > 0 && self.level[edge.to] == self.level[v] + 1 {
                return Some(self.cursor[v]);
            }
            self.cursor[v] += 1;
        }
        None
    }
}
