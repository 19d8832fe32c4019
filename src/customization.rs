//! Metric-dependent CCH phase: respecting followed by bottom-up
//! lower-triangle relaxation. Re-run whenever the input weights change; the
//! topology from preprocessing never moves.

use std::cmp::min;

use log::info;

use crate::cch::Cch;
use crate::constants::{add_weights, INFINITY};
use crate::graph::Graph;

impl Cch {
    /// Installs the weights of `original` on the hierarchy. Idempotent; may
    /// be invoked after every metric change (blocked edges, traffic updates).
    pub fn customize(&mut self, original: &Graph) {
        self.respect(original);
        self.relax_lower_triangles();
        info!("CCH customized against {} road edges", original.num_edges());
    }

    /// Aligns every hierarchy edge with the current road weights. Edges
    /// without a road counterpart revert to INFINITY shortcuts awaiting the
    /// triangle pass.
    fn respect(&mut self, original: &Graph) {
        let edges: Vec<_> = self
            .upwards
            .all_edges()
            .map(|(source, edge)| (source, edge.target, edge.via))
            .collect();

        for (u, v, via) in edges {
            let (weight, via) = match original.edge(u, v) {
                Some(road) => (road.weight, None),
                None => (INFINITY, via),
            };
            self.upwards
                .update_edge(u, v, weight, via)
                .unwrap_or_else(|err| panic!("respecting edge {u} -> {v}: {err}"));
            self.downwards
                .update_edge(v, u, weight, via)
                .unwrap_or_else(|err| panic!("respecting edge {v} -> {u}: {err}"));
        }
    }

    /// Processes every lower triangle bottom-up. For an apex `u` and upward
    /// neighbors `v`, `w` with rank(v) < rank(w):
    ///
    /// ```text
    ///   up(v -> w)   = min(up(v -> w),   down(v -> u) + up(u -> w))
    ///   down(w -> v) = min(down(w -> v), down(w -> u) + up(u -> v))
    /// ```
    fn relax_lower_triangles(&mut self) {
        for idx in 0..self.contraction_order.len() {
            let u = self.contraction_order[idx];

            let mut upward_neighbors: Vec<_> = self.upwards.neighbors(u).collect();
            upward_neighbors.sort_by_key(|n| self.contraction_map[n]);

            for i in 0..upward_neighbors.len() {
                for j in (i + 1)..upward_neighbors.len() {
                    let v = upward_neighbors[i];
                    let w = upward_neighbors[j];

                    let Some(existing_up) = self.upwards.edge(v, w).map(|e| e.weight) else {
                        continue;
                    };
                    let existing_down = self
                        .downwards
                        .edge(w, v)
                        .unwrap_or_else(|| panic!("missing mirror of edge {v} -> {w}"))
                        .weight;

                    let down_vu = self
                        .downwards
                        .edge(v, u)
                        .unwrap_or_else(|| panic!("missing triangle edge {v} -> {u}"))
                        .weight;
                    let up_uw = self
                        .upwards
                        .edge(u, w)
                        .unwrap_or_else(|| panic!("missing triangle edge {u} -> {w}"))
                        .weight;
                    let down_wu = self
                        .downwards
                        .edge(w, u)
                        .unwrap_or_else(|| panic!("missing triangle edge {w} -> {u}"))
                        .weight;
                    let up_uv = self
                        .upwards
                        .edge(u, v)
                        .unwrap_or_else(|| panic!("missing triangle edge {u} -> {v}"))
                        .weight;

                    let new_up = min(existing_up, add_weights(down_vu, up_uw));
                    let new_down = min(existing_down, add_weights(down_wu, up_uv));

                    if new_up < existing_up || new_down < existing_down {
                        self.upwards
                            .update_edge(v, w, new_up, Some(u))
                            .unwrap_or_else(|err| panic!("relaxing edge {v} -> {w}: {err}"));
                        self.downwards
                            .update_edge(w, v, new_down, Some(u))
                            .unwrap_or_else(|err| panic!("relaxing edge {w} -> {v}: {err}"));
                    }
                }
            }
        }
    }
}
