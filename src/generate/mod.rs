//! Correlated configurational-model generation
//!
//! Builds a random multigraph with a prescribed joint degree
//! distribution p(j,k) and a prescribed degree-degree edge
//! correlation c((j',k'),(j,k)). Both distributions are supplied by
//! the caller as capabilities: pure function objects held by value,
//! together with a ceiling distribution, its inverse-CDF sampler, and
//! a bound B with p <= B * ceiling pointwise. Sampling is by
//! rejection against the ceiling.
//!
//! The generator builds the replacement graph off to the side and the
//! caller swaps it in only on success, so a failed generation leaves
//! the previous graph untouched.

use rand::prelude::*;
use rand::rngs::StdRng;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info, warn};

use crate::error::{GraphError, GraphResult};
use crate::graph::MultiGraph;

/// Joint probability over degree pairs
pub type JointPdf = Box<dyn Fn(usize, usize) -> f64>;

/// Inverse-CDF sampler mapping two uniforms to a degree pair
pub type JointSampler = Box<dyn Fn(f64, f64) -> (usize, usize)>;

/// Edge correlation: probability of a target class given a source class
pub type CorrPdf = Box<dyn Fn((usize, usize), (usize, usize)) -> f64>;

/// Conditional inverse-CDF sampler for the correlation ceiling
pub type CorrSampler = Box<dyn Fn(f64, f64, (usize, usize)) -> (usize, usize)>;

/// Joint degree distribution with its rejection ceiling
pub struct JointDegreeDistribution {
    pub prob: JointPdf,
    pub ceiling: JointPdf,
    pub inv_ceiling: JointSampler,
    /// B with prob <= B * ceiling pointwise
    pub bound: f64,
}

/// Degree-degree edge correlation with its rejection ceiling
pub struct EdgeCorrelation {
    /// c((j', k'), (j, k)): candidate target class given source class
    pub prob: CorrPdf,
    pub ceiling: CorrPdf,
    pub inv_ceiling: CorrSampler,
    /// B' with prob <= B' * ceiling pointwise
    pub bound: f64,
}

/// Run controls
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// Treat sampled k as half-degree and produce an undirected
    /// matching with a symmetrized correlation
    pub undirected: bool,
    pub seed: u64,
    /// Log progress on each 1% of sampled vertices / matched stubs
    pub verbose: bool,
}

/// Outcome counters of one generation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Vertices resampled to balance the half-edge sums
    pub degree_resamples: usize,
    /// Stubs successfully paired into edges (two per edge)
    pub matched_stubs: usize,
    /// Stubs left over when only self-loop or parallel candidates
    /// remained
    pub unmatched_stubs: usize,
}

/// Consecutive rejected acceptance tests tolerated before the
/// ceiling bound is declared unsatisfiable
const REJECTION_WINDOW: usize = 100_000;

/// Candidate redraws per stub before it is left unmatched
const MATCH_RETRIES: usize = 10_000;

struct DegreeSampler<'a> {
    dist: &'a JointDegreeDistribution,
    rejections: usize,
}

impl<'a> DegreeSampler<'a> {
    fn new(dist: &'a JointDegreeDistribution) -> Self {
        DegreeSampler { dist, rejections: 0 }
    }

    fn sample(&mut self, rng: &mut StdRng) -> GraphResult<(usize, usize)> {
        loop {
            let (j, k) = (self.dist.inv_ceiling)(rng.gen(), rng.gen());
            let ceil = (self.dist.ceiling)(j, k);
            let accept = if ceil > 0.0 {
                (self.dist.prob)(j, k) / (self.dist.bound * ceil)
            } else {
                0.0
            };
            if rng.gen::<f64>() < accept {
                self.rejections = 0;
                return Ok((j, k));
            }
            self.rejections += 1;
            if self.rejections >= REJECTION_WINDOW {
                return Err(GraphError::GenerationFailure(format!(
                    "degree ceiling bound too tight: no acceptance in {} trials",
                    REJECTION_WINDOW
                )));
            }
        }
    }
}

/// Generate a graph of `n` vertices into a fresh store
pub(crate) fn generate(
    n: usize,
    degrees: &JointDegreeDistribution,
    correlation: &EdgeCorrelation,
    options: &GenerationOptions,
    abort: &std::sync::atomic::AtomicBool,
) -> GraphResult<(MultiGraph, GenerationReport)> {
    use std::sync::atomic::Ordering;

    if n == 0 {
        return Err(GraphError::InvalidArgument(
            "cannot generate a graph with zero vertices".to_string(),
        ));
    }
    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut report = GenerationReport::default();

    // phase 1: degree-sequence sampling
    let mut sampler = DegreeSampler::new(degrees);
    let mut pairs: Vec<(usize, usize)> = Vec::with_capacity(n);
    let step = (n / 100).max(1);
    for i in 0..n {
        if abort.load(Ordering::Relaxed) {
            return Err(GraphError::Aborted);
        }
        pairs.push(sampler.sample(&mut rng)?);
        if options.verbose && (i + 1) % step == 0 {
            info!(sampled = i + 1, total = n, "degree sequence progress");
        }
    }

    // phase 2: half-edge balancing
    balance(&mut pairs, &mut sampler, &mut rng, options.undirected, &mut report)?;
    debug!(resamples = report.degree_resamples, "degree sequence balanced");

    // phase 3: stub rewiring
    let graph = if options.undirected {
        rewire_undirected(&pairs, correlation, options, &mut rng, &mut report, abort)?
    } else {
        rewire_directed(&pairs, correlation, options, &mut rng, &mut report, abort)?
    };

    if report.unmatched_stubs > 0 {
        warn!(
            unmatched = report.unmatched_stubs,
            "stub pool exhausted with only self-loop or parallel candidates; residual stubs dropped"
        );
    }
    Ok((graph, report))
}

/// Resample single vertices until the stub sums admit a matching:
/// equal in/out sums when directed, an even half-edge sum when
/// undirected
fn balance(
    pairs: &mut [(usize, usize)],
    sampler: &mut DegreeSampler<'_>,
    rng: &mut StdRng,
    undirected: bool,
    report: &mut GenerationReport,
) -> GraphResult<()> {
    let cap = 100 * pairs.len() + 10_000;
    let balanced = |pairs: &[(usize, usize)]| {
        if undirected {
            pairs.iter().map(|p| p.1).sum::<usize>() % 2 == 0
        } else {
            let sj: usize = pairs.iter().map(|p| p.0).sum();
            let sk: usize = pairs.iter().map(|p| p.1).sum();
            sj == sk
        }
    };
    while !balanced(pairs) {
        if report.degree_resamples >= cap {
            return Err(GraphError::GenerationFailure(format!(
                "could not balance half-edge sums after {} resamples",
                report.degree_resamples
            )));
        }
        let i = rng.gen_range(0..pairs.len());
        pairs[i] = sampler.sample(rng)?;
        report.degree_resamples += 1;
    }
    Ok(())
}

/// Acceptance test against the correlation ceiling; counts
/// consecutive rejections so an unsatisfiable bound surfaces as an
/// error instead of an endless loop
struct CorrAcceptance<'a> {
    corr: &'a EdgeCorrelation,
    symmetrize: bool,
    rejections: usize,
}

impl<'a> CorrAcceptance<'a> {
    fn new(corr: &'a EdgeCorrelation, symmetrize: bool) -> Self {
        CorrAcceptance {
            corr,
            symmetrize,
            rejections: 0,
        }
    }

    fn eval(&self, f: &CorrPdf, a: (usize, usize), b: (usize, usize)) -> f64 {
        if self.symmetrize {
            (f(a, b) + f(b, a)) / 2.0
        } else {
            f(a, b)
        }
    }

    fn accept(
        &mut self,
        rng: &mut StdRng,
        candidate: (usize, usize),
        source: (usize, usize),
    ) -> GraphResult<bool> {
        let ceil = self.eval(&self.corr.ceiling, candidate, source);
        let p = if ceil > 0.0 {
            self.eval(&self.corr.prob, candidate, source) / (self.corr.bound * ceil)
        } else {
            0.0
        };
        if rng.gen::<f64>() < p {
            self.rejections = 0;
            return Ok(true);
        }
        self.rejections += 1;
        if self.rejections >= REJECTION_WINDOW {
            return Err(GraphError::GenerationFailure(format!(
                "correlation ceiling bound too tight: no acceptance in {} trials",
                REJECTION_WINDOW
            )));
        }
        Ok(false)
    }
}

fn rewire_directed(
    pairs: &[(usize, usize)],
    correlation: &EdgeCorrelation,
    options: &GenerationOptions,
    rng: &mut StdRng,
    report: &mut GenerationReport,
    abort: &std::sync::atomic::AtomicBool,
) -> GraphResult<MultiGraph> {
    let n = pairs.len();
    let mut graph = MultiGraph::with_vertices(n);

    // one out-stub entry per unit of out-degree, shuffled
    let mut out_stubs: Vec<usize> = Vec::new();
    for (v, &(_, k)) in pairs.iter().enumerate() {
        out_stubs.extend(std::iter::repeat(v).take(k));
    }
    out_stubs.shuffle(rng);

    // unmatched in-stubs bucketed by degree class
    let mut in_stubs: FxHashMap<(usize, usize), Vec<usize>> = FxHashMap::default();
    let mut in_remaining = 0usize;
    for (v, &(j, _)) in pairs.iter().enumerate() {
        if j > 0 {
            in_stubs.entry(pairs[v]).or_default().extend(std::iter::repeat(v).take(j));
            in_remaining += j;
        }
    }

    let mut acceptance = CorrAcceptance::new(correlation, false);
    let mut edge_set: FxHashSet<(usize, usize)> = FxHashSet::default();
    let total = out_stubs.len();
    let step = (total / 100).max(1);

    for &u in &out_stubs {
        if abort.load(std::sync::atomic::Ordering::Relaxed) {
            return Err(GraphError::Aborted);
        }
        let class_u = pairs[u];
        let mut matched = false;
        for _ in 0..MATCH_RETRIES {
            let candidate = (correlation.inv_ceiling)(rng.gen(), rng.gen(), class_u);
            let Some(bucket) = in_stubs.get_mut(&candidate) else {
                continue;
            };
            if bucket.is_empty() {
                continue;
            }
            let idx = rng.gen_range(0..bucket.len());
            let v = bucket[idx];
            if v == u || edge_set.contains(&(u, v)) {
                continue; // self-loop or parallel candidate
            }
            if !acceptance.accept(rng, candidate, class_u)? {
                continue;
            }
            bucket.swap_remove(idx);
            in_remaining -= 1;
            let _ = graph.add_edge(u, v);
            edge_set.insert((u, v));
            report.matched_stubs += 2;
            matched = true;
            break;
        }
        if !matched {
            report.unmatched_stubs += 1;
        }
        if options.verbose && matched && report.matched_stubs % (2 * step) == 0 {
            info!(
                matched = report.matched_stubs / 2,
                total = total,
                "stub matching progress"
            );
        }
    }
    report.unmatched_stubs += in_remaining;
    Ok(graph)
}

fn rewire_undirected(
    pairs: &[(usize, usize)],
    correlation: &EdgeCorrelation,
    options: &GenerationOptions,
    rng: &mut StdRng,
    report: &mut GenerationReport,
    abort: &std::sync::atomic::AtomicBool,
) -> GraphResult<MultiGraph> {
    let n = pairs.len();
    let mut graph = MultiGraph::with_vertices(n);

    // half-edges: one entry per unit of half-degree k
    let mut stub_vertex: Vec<usize> = Vec::new();
    for (v, &(_, k)) in pairs.iter().enumerate() {
        stub_vertex.extend(std::iter::repeat(v).take(k));
    }
    let total = stub_vertex.len();
    let mut order: Vec<usize> = (0..total).collect();
    order.shuffle(rng);

    let mut matched = vec![false; total];
    let mut buckets: FxHashMap<(usize, usize), Vec<usize>> = FxHashMap::default();
    for (s, &v) in stub_vertex.iter().enumerate() {
        buckets.entry(pairs[v]).or_default().push(s);
    }

    let mut acceptance = CorrAcceptance::new(correlation, true);
    let mut edge_set: FxHashSet<(usize, usize)> = FxHashSet::default();
    let step = (total / 100).max(1);

    for &s in &order {
        if abort.load(std::sync::atomic::Ordering::Relaxed) {
            return Err(GraphError::Aborted);
        }
        if matched[s] {
            continue;
        }
        let u = stub_vertex[s];
        let class_u = pairs[u];
        // take the stub in hand so it cannot match itself
        matched[s] = true;

        let mut paired = false;
        for _ in 0..MATCH_RETRIES {
            let candidate = (correlation.inv_ceiling)(rng.gen(), rng.gen(), class_u);
            let Some(bucket) = buckets.get_mut(&candidate) else {
                continue;
            };
            // lazily drop already-matched entries
            let t = loop {
                if bucket.is_empty() {
                    break None;
                }
                let idx = rng.gen_range(0..bucket.len());
                let t = bucket[idx];
                if matched[t] {
                    bucket.swap_remove(idx);
                    continue;
                }
                break Some((idx, t));
            };
            let Some((idx, t)) = t else {
                continue;
            };
            let v = stub_vertex[t];
            let key = (u.min(v), u.max(v));
            if v == u || edge_set.contains(&key) {
                continue;
            }
            if !acceptance.accept(rng, candidate, class_u)? {
                continue;
            }
            let bucket = buckets.get_mut(&candidate).expect("bucket just used");
            bucket.swap_remove(idx);
            matched[t] = true;
            let _ = graph.add_edge(u, v);
            edge_set.insert(key);
            report.matched_stubs += 2;
            paired = true;
            break;
        }
        if !paired {
            report.unmatched_stubs += 1;
        }
        if options.verbose && paired && report.matched_stubs % (2 * step) == 0 {
            info!(
                matched = report.matched_stubs / 2,
                total = total / 2,
                "stub matching progress"
            );
        }
    }
    Ok(graph)
}
