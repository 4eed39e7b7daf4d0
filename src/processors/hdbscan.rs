//! HDBSCAN density clustering over 2-D points.
//!
//! Points are labelled with a non-negative cluster id or [`NOISE_LABEL`].
//! Ids are only meaningful within one call; nothing here is carried between
//! batches.

use crate::config::ClusteringConfig;
use crate::error::{ProcessingError, Result};
use crate::utils::constants::{DEFAULT_MIN_CLUSTER_SIZE, DEFAULT_MIN_SAMPLES, NOISE_LABEL};

/// Floor applied to distances so duplicate points keep a finite density
const MIN_DISTANCE: f64 = 1e-10;

/// A density-based clustering capability
pub trait DensityClusterer {
    /// Label every point with a cluster id or `NOISE_LABEL`
    fn fit_predict(&self, points: &[[f64; 2]]) -> Result<Vec<i32>>;
}

/// Tuning for [`Hdbscan`].
///
/// `min_samples` counts the point itself, so its core distance is the
/// distance to its `min_samples - 1`-th nearest other point. With
/// `min_samples = 1` every core distance is zero and the mutual reachability
/// graph reduces to plain euclidean distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HdbscanParams {
    /// Smallest group of points that can form a cluster
    pub min_cluster_size: usize,
    /// Neighbourhood size, including the point, that defines local density
    pub min_samples: usize,
    /// Allow the root of the hierarchy to be selected as the only cluster
    pub allow_single_cluster: bool,
}

impl Default for HdbscanParams {
    fn default() -> Self {
        Self {
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            min_samples: DEFAULT_MIN_SAMPLES,
            allow_single_cluster: false,
        }
    }
}

impl From<&ClusteringConfig> for HdbscanParams {
    fn from(config: &ClusteringConfig) -> Self {
        Self {
            min_cluster_size: config.min_cluster_size,
            min_samples: config.min_samples,
            allow_single_cluster: config.allow_single_cluster,
        }
    }
}

impl HdbscanParams {
    pub fn validate(&self) -> Result<()> {
        if self.min_cluster_size < 2 {
            return Err(ProcessingError::Config(format!(
                "min_cluster_size must be at least 2, got {}",
                self.min_cluster_size
            )));
        }

        if self.min_samples < 1 {
            return Err(ProcessingError::Config(format!(
                "min_samples must be at least 1, got {}",
                self.min_samples
            )));
        }

        Ok(())
    }
}

/// Exact HDBSCAN over a dense distance matrix, O(n²) in time.
///
/// Selection uses excess of mass. Ties break on point index, so the same
/// input always gives the same labels.
#[derive(Debug, Clone)]
pub struct Hdbscan {
    params: HdbscanParams,
}

impl Hdbscan {
    pub fn new(params: HdbscanParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &HdbscanParams {
        &self.params
    }
}

impl DensityClusterer for Hdbscan {
    fn fit_predict(&self, points: &[[f64; 2]]) -> Result<Vec<i32>> {
        let n = points.len();

        if let Some(bad) = points
            .iter()
            .position(|p| !p[0].is_finite() || !p[1].is_finite())
        {
            return Err(ProcessingError::Clustering(format!(
                "Point {} has non-finite coordinates ({}, {})",
                bad, points[bad][0], points[bad][1]
            )));
        }

        // No split can produce a cluster this small
        if n < self.params.min_cluster_size || n < 2 {
            return Ok(vec![NOISE_LABEL; n]);
        }

        let core = core_distances(points, self.params.min_samples);
        let mst = minimum_spanning_tree(points, &core);
        let hierarchy = single_linkage(n, mst);
        let condensed = condense_tree(&hierarchy, n, self.params.min_cluster_size);
        let selected = select_clusters(&condensed, n, self.params.allow_single_cluster);

        Ok(label_points(
            &condensed,
            &selected,
            n,
            self.params.allow_single_cluster,
        ))
    }
}

fn euclidean(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    (dx * dx + dy * dy).sqrt()
}

/// Distance from each point to its `min_samples`-th nearest neighbour,
/// counting the point itself as the first
fn core_distances(points: &[[f64; 2]], min_samples: usize) -> Vec<f64> {
    let n = points.len();
    let k = min_samples.saturating_sub(1).min(n - 1);
    if k == 0 {
        return vec![0.0; n];
    }

    let mut scratch = Vec::with_capacity(n - 1);

    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            scratch.clear();
            scratch.extend(
                points
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, q)| euclidean(p, q)),
            );
            let (_, kth, _) = scratch.select_nth_unstable_by(k - 1, |a, b| a.total_cmp(b));
            *kth
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    a: usize,
    b: usize,
    weight: f64,
}

/// Prim's algorithm over the dense mutual reachability graph
fn minimum_spanning_tree(points: &[[f64; 2]], core: &[f64]) -> Vec<Edge> {
    let n = points.len();
    let mut in_tree = vec![false; n];
    let mut best_weight = vec![f64::INFINITY; n];
    let mut best_source = vec![0usize; n];
    let mut edges = Vec::with_capacity(n - 1);

    let mut current = 0;
    in_tree[current] = true;

    for _ in 1..n {
        let mut next: Option<usize> = None;

        for j in 0..n {
            if in_tree[j] {
                continue;
            }

            let reach = euclidean(&points[current], &points[j])
                .max(core[current])
                .max(core[j]);
            if reach < best_weight[j] {
                best_weight[j] = reach;
                best_source[j] = current;
            }

            // Strict comparison keeps the lowest index on ties
            if next.map_or(true, |m| best_weight[j] < best_weight[m]) {
                next = Some(j);
            }
        }

        let Some(next) = next else { break };
        edges.push(Edge {
            a: best_source[next],
            b: next,
            weight: best_weight[next],
        });
        in_tree[next] = true;
        current = next;
    }

    edges
}

#[derive(Debug, Clone, Copy)]
struct Merge {
    left: usize,
    right: usize,
    distance: f64,
    size: usize,
}

/// Union-find whose representative is always the most recent merge node
struct LinkageUnionFind {
    parent: Vec<usize>,
}

impl LinkageUnionFind {
    fn new(capacity: usize) -> Self {
        Self {
            parent: (0..capacity).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        while self.parent[x] != root {
            let next = self.parent[x];
            self.parent[x] = root;
            x = next;
        }
        root
    }

    fn link(&mut self, a: usize, b: usize, node: usize) {
        self.parent[a] = node;
        self.parent[b] = node;
    }
}

/// Merge node `n + k` joins the two components of the k-th lightest edge
fn single_linkage(n: usize, mut mst: Vec<Edge>) -> Vec<Merge> {
    mst.sort_by(|x, y| x.weight.total_cmp(&y.weight));

    let mut uf = LinkageUnionFind::new(2 * n - 1);
    let mut sizes = vec![1usize; 2 * n - 1];
    let mut merges = Vec::with_capacity(n - 1);

    for (k, edge) in mst.iter().enumerate() {
        let node = n + k;
        let left = uf.find(edge.a);
        let right = uf.find(edge.b);
        let size = sizes[left] + sizes[right];

        sizes[node] = size;
        uf.link(left, right, node);
        merges.push(Merge {
            left,
            right,
            distance: edge.weight,
            size,
        });
    }

    merges
}

#[derive(Debug, Clone, Copy)]
struct CondensedEdge {
    parent: usize,
    child: usize,
    lambda: f64,
    child_size: usize,
}

fn node_size(hierarchy: &[Merge], n: usize, node: usize) -> usize {
    if node < n {
        1
    } else {
        hierarchy[node - n].size
    }
}

/// Leaves below `node` in the single-linkage hierarchy
fn leaves_under(hierarchy: &[Merge], n: usize, node: usize) -> Vec<usize> {
    let mut leaves = Vec::new();
    let mut stack = vec![node];

    while let Some(current) = stack.pop() {
        if current < n {
            leaves.push(current);
        } else {
            let merge = &hierarchy[current - n];
            stack.push(merge.right);
            stack.push(merge.left);
        }
    }

    leaves
}

/// Collapse the hierarchy into clusters of at least `min_cluster_size` points.
///
/// Cluster labels start at `n` (the root) and grow in breadth-first order, so
/// a child cluster always has a larger label than its parent.
fn condense_tree(hierarchy: &[Merge], n: usize, min_cluster_size: usize) -> Vec<CondensedEdge> {
    let root = 2 * n - 2;
    let mut relabel = vec![0usize; 2 * n - 1];
    relabel[root] = n;
    let mut next_label = n + 1;
    let mut condensed = Vec::new();

    let mut queue = std::collections::VecDeque::from([root]);

    while let Some(node) = queue.pop_front() {
        if node < n {
            continue;
        }

        let merge = hierarchy[node - n];
        let lambda = 1.0 / merge.distance.max(MIN_DISTANCE);
        let cluster = relabel[node];
        let left_size = node_size(hierarchy, n, merge.left);
        let right_size = node_size(hierarchy, n, merge.right);

        let left_is_cluster = left_size >= min_cluster_size;
        let right_is_cluster = right_size >= min_cluster_size;

        for (child, child_size, is_cluster, other_is_cluster) in [
            (merge.left, left_size, left_is_cluster, right_is_cluster),
            (merge.right, right_size, right_is_cluster, left_is_cluster),
        ] {
            match (is_cluster, other_is_cluster) {
                // True split: both halves become new clusters
                (true, true) => {
                    relabel[child] = next_label;
                    next_label += 1;
                    condensed.push(CondensedEdge {
                        parent: cluster,
                        child: relabel[child],
                        lambda,
                        child_size,
                    });
                    queue.push_back(child);
                }
                // The parent cluster carries on under this child
                (true, false) => {
                    relabel[child] = cluster;
                    queue.push_back(child);
                }
                // Points falling out of the cluster
                (false, _) => {
                    for leaf in leaves_under(hierarchy, n, child) {
                        condensed.push(CondensedEdge {
                            parent: cluster,
                            child: leaf,
                            lambda,
                            child_size: 1,
                        });
                    }
                }
            }
        }
    }

    condensed
}

/// Excess-of-mass selection. Returns one flag per cluster label, offset by `n`.
fn select_clusters(condensed: &[CondensedEdge], n: usize, allow_single_cluster: bool) -> Vec<bool> {
    let cluster_count = condensed
        .iter()
        .map(|e| e.parent.max(if e.child >= n { e.child } else { 0 }))
        .max()
        .map_or(1, |max_label| max_label - n + 1);

    let mut birth = vec![0.0f64; cluster_count];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); cluster_count];
    for edge in condensed.iter().filter(|e| e.child >= n) {
        birth[edge.child - n] = edge.lambda;
        children[edge.parent - n].push(edge.child - n);
    }

    let mut stability = vec![0.0f64; cluster_count];
    for edge in condensed {
        let p = edge.parent - n;
        stability[p] += (edge.lambda - birth[p]) * edge.child_size as f64;
    }

    // The root is only a candidate when a single cluster is allowed
    let mut selected = vec![true; cluster_count];
    selected[0] = allow_single_cluster;

    let first = if allow_single_cluster { 0 } else { 1 };
    for cluster in (first..cluster_count).rev() {
        let subtree: f64 = children[cluster].iter().map(|&c| stability[c]).sum();

        if subtree > stability[cluster] {
            selected[cluster] = false;
            stability[cluster] = subtree;
        } else {
            let mut stack = children[cluster].clone();
            while let Some(descendant) = stack.pop() {
                selected[descendant] = false;
                stack.extend(children[descendant].iter().copied());
            }
        }
    }

    selected
}

fn label_points(
    condensed: &[CondensedEdge],
    selected: &[bool],
    n: usize,
    allow_single_cluster: bool,
) -> Vec<i32> {
    let cluster_count = selected.len();

    let mut cluster_parent = vec![None; cluster_count];
    let mut point_parent = vec![n; n];
    let mut point_lambda = vec![0.0f64; n];
    let mut root_child_lambda = 0.0f64;

    for edge in condensed {
        if edge.child >= n {
            cluster_parent[edge.child - n] = Some(edge.parent - n);
        } else {
            point_parent[edge.child] = edge.parent;
            point_lambda[edge.child] = edge.lambda;
        }
        if edge.parent == n {
            root_child_lambda = root_child_lambda.max(edge.lambda);
        }
    }

    let mut label_of = vec![NOISE_LABEL; cluster_count];
    let mut next_label = 0;
    for (cluster, is_selected) in selected.iter().enumerate() {
        if *is_selected {
            label_of[cluster] = next_label;
            next_label += 1;
        }
    }

    (0..n)
        .map(|point| {
            let mut cluster = Some(point_parent[point] - n);

            while let Some(current) = cluster {
                if selected[current] {
                    if current == 0 {
                        // The whole batch is one cluster; only its densest points belong
                        return if allow_single_cluster && point_lambda[point] >= root_child_lambda
                        {
                            label_of[0]
                        } else {
                            NOISE_LABEL
                        };
                    }
                    return label_of[current];
                }
                cluster = cluster_parent[current];
            }

            NOISE_LABEL
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn grid(origin: [f64; 2], rows: usize, cols: usize, spacing: f64) -> Vec<[f64; 2]> {
        (0..rows * cols)
            .map(|i| {
                [
                    origin[0] + (i / cols) as f64 * spacing,
                    origin[1] + (i % cols) as f64 * spacing,
                ]
            })
            .collect()
    }

    fn small_params() -> HdbscanParams {
        HdbscanParams {
            min_cluster_size: 10,
            min_samples: 5,
            allow_single_cluster: false,
        }
    }

    #[test]
    fn test_core_distance_counts_the_point_itself() {
        let points = [[0.0, 0.0], [1.0, 0.0], [3.0, 0.0], [6.0, 0.0]];

        assert_eq!(core_distances(&points, 1), vec![0.0; 4]);
        assert_eq!(core_distances(&points, 2), vec![1.0, 1.0, 2.0, 3.0]);
        assert_eq!(core_distances(&points, 3), vec![3.0, 2.0, 3.0, 5.0]);
        // Capped at the farthest other point
        assert_eq!(core_distances(&points, 10), vec![6.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_min_samples_one_still_clusters() {
        let mut points = vec![[0.0, 0.0]; 20];
        points.extend(std::iter::repeat([10.0, 10.0]).take(20));
        points.push([-80.0, 60.0]);

        let clusterer = Hdbscan::new(HdbscanParams {
            min_samples: 1,
            ..small_params()
        })
        .unwrap();
        let labels = clusterer.fit_predict(&points).unwrap();

        assert!(labels[..20].iter().all(|&l| l == labels[0] && l >= 0));
        assert!(labels[20..40].iter().all(|&l| l == labels[20] && l >= 0));
        assert_ne!(labels[0], labels[20]);
        assert_eq!(labels[40], NOISE_LABEL);
    }

    #[test]
    fn test_two_blobs_and_outliers() {
        let mut points = grid([0.0, 0.0], 5, 8, 0.01);
        points.extend(grid([10.0, 10.0], 5, 8, 0.01));
        points.push([50.0, -50.0]);
        points.push([-60.0, 40.0]);

        let clusterer = Hdbscan::new(small_params()).unwrap();
        let labels = clusterer.fit_predict(&points).unwrap();

        assert_eq!(labels.len(), 82);
        let first = labels[0];
        let second = labels[40];
        assert!(first >= 0 && second >= 0);
        assert_ne!(first, second);
        assert!(labels[..40].iter().all(|&l| l == first));
        assert!(labels[40..80].iter().all(|&l| l == second));
        assert_eq!(&labels[80..], &[NOISE_LABEL, NOISE_LABEL]);
    }

    #[test]
    fn test_too_few_points_is_all_noise() {
        let points = grid([5.0, 5.0], 3, 3, 0.001);
        let clusterer = Hdbscan::new(small_params()).unwrap();

        assert_eq!(clusterer.fit_predict(&points).unwrap(), vec![NOISE_LABEL; 9]);
        assert!(clusterer.fit_predict(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_points_cluster() {
        let mut points = Vec::new();
        for group in 0..3 {
            points.extend(std::iter::repeat([group as f64, 0.0]).take(20));
        }
        points.push([100.0, 100.0]);

        let clusterer = Hdbscan::new(small_params()).unwrap();
        let labels = clusterer.fit_predict(&points).unwrap();

        assert!(labels[..60].iter().all(|&l| l >= 0));
        assert_eq!(labels[60], NOISE_LABEL);

        let mut distinct: Vec<i32> = labels[..60].to_vec();
        distinct.sort_unstable();
        distinct.dedup();
        assert_eq!(distinct, vec![0, 1, 2]);
    }

    #[test]
    fn test_single_cluster_is_noise_unless_allowed() {
        // 15 points can never split into two clusters of 10
        let points = grid([1.0, 1.0], 3, 5, 0.01);

        let clusterer = Hdbscan::new(small_params()).unwrap();
        let labels = clusterer.fit_predict(&points).unwrap();
        assert!(labels.iter().all(|&l| l == NOISE_LABEL));

        let clusterer = Hdbscan::new(HdbscanParams {
            allow_single_cluster: true,
            ..small_params()
        })
        .unwrap();
        let labels = clusterer.fit_predict(&points).unwrap();
        assert!(labels.iter().any(|&l| l == 0));
        assert!(labels.iter().all(|&l| l == 0 || l == NOISE_LABEL));
    }

    #[test]
    fn test_deterministic() {
        let mut points = grid([0.0, 0.0], 5, 7, 0.02);
        points.extend(grid([3.0, -2.0], 5, 5, 0.05));
        points.extend(grid([-4.0, 6.0], 3, 4, 0.3));

        let clusterer = Hdbscan::new(small_params()).unwrap();
        let first = clusterer.fit_predict(&points).unwrap();
        for _ in 0..5 {
            assert_eq!(clusterer.fit_predict(&points).unwrap(), first);
        }
    }

    #[test]
    fn test_invalid_params() {
        assert!(Hdbscan::new(HdbscanParams {
            min_cluster_size: 1,
            ..HdbscanParams::default()
        })
        .is_err());
        assert!(Hdbscan::new(HdbscanParams {
            min_samples: 0,
            ..HdbscanParams::default()
        })
        .is_err());
        assert!(Hdbscan::new(HdbscanParams::default()).is_ok());
    }

    #[test]
    fn test_non_finite_points_rejected() {
        let clusterer = Hdbscan::new(small_params()).unwrap();
        let result = clusterer.fit_predict(&[[0.0, 0.0], [f64::NAN, 1.0]]);
        assert!(matches!(result, Err(ProcessingError::Clustering(_))));
    }
}
