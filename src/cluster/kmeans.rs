//! K-means: k-means++ seeding followed by Lloyd iterations.
//!
//! Each iteration assigns every point to its nearest centroid (squared Euclidean
//! distance, ties to the lowest centroid index), then moves each centroid to the
//! mean of its points. The loop stops when no assignment changes (after any
//! empty-cluster relocation), when the
//! largest centroid shift drops to `tol` (if `tol > 0`), or after `max_iter`
//! iterations. Which of these fired is reported in [`KmeansFit::stop`].
//!
//! ## Empty clusters
//!
//! A centroid left without points is moved onto the point that is currently
//! farthest from its own centroid, taken from a cluster that can spare it. This
//! keeps every label in `[0, k)` populated after each update step, including
//! the degenerate case where fewer than `k` distinct points exist.
//!
//! ## Reproducibility
//!
//! With a fixed seed (or an injected RNG in a fixed state) the output is
//! bit-for-bit reproducible.

use rand::prelude::*;

use super::traits::Clustering;
use super::util::{self, nearest, squared_euclidean};
use crate::error::{Error, Result};

/// Why a k-means run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No point changed cluster in the last assignment step.
    Converged,
    /// Largest squared centroid shift fell to `tol`.
    Tolerance,
    /// Hit `max_iter`.
    MaxIterations,
}

/// K-means clusterer.
#[derive(Debug, Clone)]
pub struct Kmeans {
    k: usize,
    max_iter: usize,
    tol: f64,
    n_init: usize,
    seed: Option<u64>,
}

/// Result of a k-means fit.
#[derive(Debug, Clone)]
pub struct KmeansFit {
    /// One label in `[0, k)` per point.
    pub labels: Vec<usize>,
    /// Final centroids, `k` of them.
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances from points to their centroids.
    pub inertia: f64,
    /// Lloyd iterations performed by the reported run.
    pub iterations: usize,
    /// Stop condition of the reported run.
    pub stop: StopReason,
    /// Number of empty-cluster relocations in the reported run.
    pub reinitialized: usize,
    /// True if the data has fewer distinct points than `k`.
    pub degenerate: bool,
}

impl KmeansFit {
    /// Label of the centroid nearest to `point`.
    pub fn predict(&self, point: &[f64]) -> usize {
        nearest(point, &self.centroids).0
    }
}

impl Kmeans {
    /// Create a k-means clusterer for `k` clusters.
    ///
    /// Defaults: 300 iterations, `tol = 0` (stop on stable assignments only),
    /// one initialisation, unseeded.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 300,
            tol: 0.0,
            n_init: 1,
            seed: None,
        }
    }

    /// Set the iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the squared centroid-shift tolerance. `0` disables it.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Number of seeded restarts; the lowest-inertia run is kept.
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Fix the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fit using the configured seed, or thread-local entropy if unseeded.
    pub fn fit(&self, data: &[Vec<f64>]) -> Result<KmeansFit> {
        match self.seed {
            Some(seed) => self.fit_with_rng(data, &mut StdRng::seed_from_u64(seed)),
            None => self.fit_with_rng(data, &mut rand::rng()),
        }
    }

    /// Fit drawing all randomness from `rng`. The configured seed is ignored.
    pub fn fit_with_rng<R: Rng + ?Sized>(
        &self,
        data: &[Vec<f64>],
        rng: &mut R,
    ) -> Result<KmeansFit> {
        let d = util::check_points(data)?;
        let n = data.len();

        if self.k == 0 || self.k > n {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: n,
            });
        }
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be at least 1",
            });
        }
        if self.n_init == 0 {
            return Err(Error::InvalidParameter {
                name: "n_init",
                message: "must be at least 1",
            });
        }
        if self.tol.is_nan() || self.tol < 0.0 {
            return Err(Error::InvalidParameter {
                name: "tol",
                message: "must be non-negative",
            });
        }

        let degenerate = distinct_points(data) < self.k;
        if degenerate {
            tracing::warn!(
                k = self.k,
                n,
                "fewer distinct points than clusters; some clusters will share locations"
            );
        }

        let mut fit = self.run(data, d, rng);
        for _ in 1..self.n_init {
            let candidate = self.run(data, d, rng);
            // Earliest run wins ties.
            if candidate.inertia < fit.inertia {
                fit = candidate;
            }
        }
        fit.degenerate = degenerate;

        tracing::debug!(
            k = self.k,
            n,
            iterations = fit.iterations,
            stop = ?fit.stop,
            inertia = fit.inertia,
            "k-means finished"
        );
        Ok(fit)
    }

    fn run<R: Rng + ?Sized>(&self, data: &[Vec<f64>], d: usize, rng: &mut R) -> KmeansFit {
        let n = data.len();
        let k = self.k;

        let mut centroids = seed_plus_plus(data, k, rng);
        let mut labels = vec![usize::MAX; n];
        let mut dist = vec![0.0f64; n];
        let mut stop = StopReason::MaxIterations;
        let mut iterations = 0;
        let mut reinitialized = 0;

        for iter in 0..self.max_iter {
            iterations = iter + 1;
            let previous = labels.clone();

            let mut changed = 0usize;
            for (i, point) in data.iter().enumerate() {
                let (c, d2) = nearest(point, &centroids);
                if labels[i] != c {
                    labels[i] = c;
                    changed += 1;
                }
                dist[i] = d2;
            }

            if changed == 0 {
                stop = StopReason::Converged;
                break;
            }

            let moved = relocate_empty(&mut labels, &mut dist, k);
            if moved > 0 {
                tracing::warn!(iter, moved, "relocated empty clusters");
                reinitialized += moved;
            }
            if labels == previous {
                // Relocation undid the reassignment: the centroids are already
                // the means of these labels.
                stop = StopReason::Converged;
                break;
            }

            let updated = means(data, &labels, k, d);
            let shift = updated
                .iter()
                .zip(centroids.iter())
                .map(|(a, b)| squared_euclidean(a, b))
                .fold(0.0f64, f64::max);
            centroids = updated;

            tracing::trace!(iter, changed, shift, "k-means iteration");

            if self.tol > 0.0 && shift <= self.tol {
                stop = StopReason::Tolerance;
                break;
            }
        }

        let inertia = data
            .iter()
            .zip(labels.iter())
            .map(|(p, &c)| squared_euclidean(p, &centroids[c]))
            .sum();

        KmeansFit {
            labels,
            centroids,
            inertia,
            iterations,
            stop,
            reinitialized,
            degenerate: false,
        }
    }
}

impl Clustering for Kmeans {
    fn fit_predict(&self, data: &[Vec<f64>]) -> Result<Vec<usize>> {
        Ok(self.fit(data)?.labels)
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}

/// k-means++ seeding: first centroid uniform, each next one drawn with
/// probability proportional to squared distance to the nearest chosen centroid.
fn seed_plus_plus<R: Rng + ?Sized>(data: &[Vec<f64>], k: usize, rng: &mut R) -> Vec<Vec<f64>> {
    let n = data.len();
    let mut centroids: Vec<Vec<f64>> = Vec::with_capacity(k);
    centroids.push(data[rng.random_range(0..n)].clone());

    let mut d2: Vec<f64> = data
        .iter()
        .map(|p| squared_euclidean(p, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = d2.iter().sum();
        let next = if total > 0.0 && total.is_finite() {
            let mut target = rng.random::<f64>() * total;
            // Rounding can leave `target` positive after the last weight.
            let mut pick = d2.iter().rposition(|&w| w > 0.0).unwrap_or(0);
            for (i, &w) in d2.iter().enumerate() {
                if w <= 0.0 {
                    continue;
                }
                target -= w;
                if target < 0.0 {
                    pick = i;
                    break;
                }
            }
            pick
        } else {
            // Every point sits on a chosen centroid.
            rng.random_range(0..n)
        };

        centroids.push(data[next].clone());
        let newest = &centroids[centroids.len() - 1];
        for (i, p) in data.iter().enumerate() {
            let dn = squared_euclidean(p, newest);
            if dn < d2[i] {
                d2[i] = dn;
            }
        }
    }

    centroids
}

/// Move the farthest spare point into each empty cluster. Returns the number of
/// clusters refilled.
fn relocate_empty(labels: &mut [usize], dist: &mut [f64], k: usize) -> usize {
    let mut counts = vec![0usize; k];
    for &l in labels.iter() {
        counts[l] += 1;
    }

    let mut moved = 0;
    for c in 0..k {
        if counts[c] > 0 {
            continue;
        }
        let mut far: Option<usize> = None;
        let mut far_d = f64::NEG_INFINITY;
        for (i, &l) in labels.iter().enumerate() {
            if counts[l] > 1 && dist[i] > far_d {
                far_d = dist[i];
                far = Some(i);
            }
        }
        if let Some(i) = far {
            counts[labels[i]] -= 1;
            labels[i] = c;
            counts[c] = 1;
            dist[i] = 0.0;
            moved += 1;
        }
    }
    moved
}

fn means(data: &[Vec<f64>], labels: &[usize], k: usize, d: usize) -> Vec<Vec<f64>> {
    let mut sums = vec![vec![0.0f64; d]; k];
    let mut counts = vec![0usize; k];
    for (point, &l) in data.iter().zip(labels.iter()) {
        counts[l] += 1;
        for (s, x) in sums[l].iter_mut().zip(point.iter()) {
            *s += x;
        }
    }
    for (sum, &count) in sums.iter_mut().zip(counts.iter()) {
        if count > 0 {
            let inv = 1.0 / count as f64;
            for s in sum.iter_mut() {
                *s *= inv;
            }
        }
    }
    sums
}

fn distinct_points(data: &[Vec<f64>]) -> usize {
    // -0.0 and 0.0 are equal but sort apart under total_cmp.
    let mut sorted: Vec<Vec<f64>> = data
        .iter()
        .map(|p| p.iter().map(|&x| if x == 0.0 { 0.0 } else { x }).collect())
        .collect();
    sorted.sort_by(|a, b| {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| x.total_cmp(y))
            .find(|o| o.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.dedup();
    sorted.len()
}
