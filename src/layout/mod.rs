//! Force-directed and topology-driven 2D layouts
//!
//! Layout routines are consumers of the view like any estimator, but
//! instead of returning a value they produce coordinates that the
//! caller writes into the `pos_x`/`pos_y` vertex properties. Both
//! algorithms are iterative relaxations with a deterministic seeded
//! RNG and poll the abort flag once per iteration.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::error::{GraphError, GraphResult};
use crate::filter::view::{Mask, NeighbourMode, View};
use crate::graph::VertexIndex;

/// 2D coordinates indexed by vertex id; invisible vertices keep
/// their initial position
pub(crate) type Positions = Vec<(f64, f64)>;

fn check_abort(abort: &AtomicBool) -> GraphResult<()> {
    if abort.load(Ordering::Relaxed) {
        Err(GraphError::Aborted)
    } else {
        Ok(())
    }
}

fn random_positions(rng: &mut StdRng, n: usize) -> Positions {
    (0..n).map(|_| (rng.gen::<f64>(), rng.gen::<f64>())).collect()
}

/// Topology-driven placement in the unit square.
///
/// Each round samples a point of the square, finds the visible vertex
/// currently closest to it, and pulls vertices toward the point with
/// a strength falling off with BFS distance from that winner. Radius
/// and learning rate decay over the run, so early rounds arrange the
/// coarse structure and late rounds only refine locally.
pub(crate) fn gursoy_atun<M: Mask>(
    view: &View<'_, M>,
    iterations: usize,
    seed: u64,
    abort: &AtomicBool,
) -> GraphResult<Positions> {
    let n = view.graph().vertex_count();
    let nv = view.num_vertices();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pos = random_positions(&mut rng, n);
    if nv == 0 {
        return Ok(pos);
    }

    let rounds = if iterations == 0 { nv.max(100) } else { iterations };
    let visible: Vec<VertexIndex> = view.vertices().collect();
    let radius_start = (nv as f64).sqrt().max(1.0);
    let radius_end = 1.0;
    let mut dist = vec![u32::MAX; n];
    let mut queue = VecDeque::new();

    for round in 0..rounds {
        check_abort(abort)?;
        let t = round as f64 / rounds as f64;
        let radius = radius_start * (radius_end / radius_start).powf(t);
        let rate = 0.8 * (1.0 - t) + 0.05;

        let target = (rng.gen::<f64>(), rng.gen::<f64>());
        let winner = *visible
            .iter()
            .min_by(|&&a, &&b| {
                let da = sq_dist(pos[a], target);
                let db = sq_dist(pos[b], target);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .expect("at least one visible vertex");

        // BFS distances from the winner over the visible subgraph
        for d in dist.iter_mut() {
            *d = u32::MAX;
        }
        queue.clear();
        dist[winner] = 0;
        queue.push_back(winner);
        while let Some(u) = queue.pop_front() {
            let d = dist[u];
            for w in view.neighbours(u, NeighbourMode::All) {
                if dist[w] == u32::MAX {
                    dist[w] = d + 1;
                    queue.push_back(w);
                }
            }
        }

        for &v in &visible {
            if dist[v] == u32::MAX {
                continue;
            }
            let pull = rate * (-((dist[v] as f64) / radius)).exp();
            pos[v].0 += pull * (target.0 - pos[v].0);
            pos[v].1 += pull * (target.1 - pos[v].1);
        }
    }
    Ok(pos)
}

/// Spring-block relaxation (Fruchterman-Reingold style): repulsion
/// between every visible vertex pair, attraction along visible
/// edges, displacement capped by a linearly cooling temperature.
pub(crate) fn spring_block<M: Mask>(
    view: &View<'_, M>,
    iterations: usize,
    seed: u64,
    abort: &AtomicBool,
) -> GraphResult<Positions> {
    let n = view.graph().vertex_count();
    let nv = view.num_vertices();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pos = random_positions(&mut rng, n);
    if nv < 2 {
        return Ok(pos);
    }

    let rounds = if iterations == 0 { 100 } else { iterations };
    let visible: Vec<VertexIndex> = view.vertices().collect();
    let k = (1.0 / nv as f64).sqrt();
    let mut disp = vec![(0.0, 0.0); n];

    for round in 0..rounds {
        check_abort(abort)?;
        for d in disp.iter_mut() {
            *d = (0.0, 0.0);
        }

        // pairwise repulsion
        for (i, &u) in visible.iter().enumerate() {
            for &v in &visible[i + 1..] {
                let (mut dx, mut dy) = (pos[u].0 - pos[v].0, pos[u].1 - pos[v].1);
                let mut len = (dx * dx + dy * dy).sqrt();
                if len < 1e-9 {
                    // coincident vertices get a random nudge apart
                    dx = rng.gen::<f64>() * 1e-3;
                    dy = rng.gen::<f64>() * 1e-3;
                    len = (dx * dx + dy * dy).sqrt();
                }
                let force = k * k / len;
                disp[u].0 += dx / len * force;
                disp[u].1 += dy / len * force;
                disp[v].0 -= dx / len * force;
                disp[v].1 -= dy / len * force;
            }
        }

        // attraction along visible edges
        for e in view.edges() {
            let (u, v) = view.endpoints(e);
            if u == v {
                continue;
            }
            let (dx, dy) = (pos[u].0 - pos[v].0, pos[u].1 - pos[v].1);
            let len = (dx * dx + dy * dy).sqrt().max(1e-9);
            let force = len * len / k;
            disp[u].0 -= dx / len * force;
            disp[u].1 -= dy / len * force;
            disp[v].0 += dx / len * force;
            disp[v].1 += dy / len * force;
        }

        let temperature = 0.1 * (1.0 - round as f64 / rounds as f64) + 1e-3;
        for &v in &visible {
            let (dx, dy) = disp[v];
            let len = (dx * dx + dy * dy).sqrt();
            if len > 1e-12 {
                let capped = len.min(temperature);
                pos[v].0 += dx / len * capped;
                pos[v].1 += dy / len * capped;
            }
        }
    }
    Ok(pos)
}

fn sq_dist(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (a.0 - b.0, a.1 - b.1);
    dx * dx + dy * dy
}
