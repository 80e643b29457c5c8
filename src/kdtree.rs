use crate::neighbors::NearestNeighbors;
use rayon::prelude::*;
use std::fmt;

/// Vacant child slot.
const NONE: u32 = u32::MAX;

/// Error produced when a tree cannot be built from its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A coordinate vector's length differs from the one fixed by the first point.
    DimensionMismatch {
        expected: usize,
        found: usize,
        index: usize,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::DimensionMismatch {
                expected,
                found,
                index,
            } => write!(
                f,
                "point {} has {} coordinates, expected {} like the first point",
                index, found, expected
            ),
        }
    }
}

impl std::error::Error for BuildError {}

#[derive(Clone, Copy, Debug)]
struct KdNode {
    /// Index of this node's point in the input order.
    point: u32,
    left: u32, // NONE if vacant
    right: u32,
}

/// A balanced k-d tree over opaque values, built once from a static point set.
///
/// Construction fixes the coordinate dimension from the first point and
/// median-splits on the axis cycling with depth, so the tree stays balanced
/// regardless of input order. The tree is immutable afterwards: queries are
/// read-only and any number of them may run concurrently.
///
/// Coordinates live in a flat buffer in input order; nodes reference points
/// by index, with the root pushed last by the recursive build.
#[derive(Debug)]
pub struct KdTree<V> {
    dims: usize,
    values: Vec<V>,
    coords: Vec<f64>,
    nodes: Vec<KdNode>,
}

impl<V> KdTree<V> {
    /// Builds a tree from `points`, extracting each value's coordinates with
    /// `coord_of`. The extraction function must be pure and return vectors of
    /// one fixed, non-zero length; the length of the first vector fixes the
    /// tree's dimension.
    ///
    /// An empty input yields a valid empty tree. A point whose vector length
    /// differs from the first point's fails with
    /// [`BuildError::DimensionMismatch`] rather than truncating or padding.
    ///
    /// # Panics
    ///
    /// Panics if `coord_of` returns an empty vector for the first point.
    pub fn build<I, F>(points: I, coord_of: F) -> Result<KdTree<V>, BuildError>
    where
        I: IntoIterator<Item = V>,
        F: Fn(&V) -> Vec<f64>,
    {
        let mut values = Vec::new();
        let mut coords = Vec::new();
        let mut dims = 0;

        for value in points {
            let point = coord_of(&value);
            if values.is_empty() {
                assert!(!point.is_empty(), "coordinate vectors must be non-empty");
                dims = point.len();
            } else if point.len() != dims {
                return Err(BuildError::DimensionMismatch {
                    expected: dims,
                    found: point.len(),
                    index: values.len(),
                });
            }
            coords.extend_from_slice(&point);
            values.push(value);
        }

        let mut nodes = Vec::with_capacity(values.len());
        if !values.is_empty() {
            let mut order: Vec<u32> = (0..values.len() as u32).collect();
            build_recursive(&mut nodes, &mut order, 0, &coords, dims);
        }

        Ok(KdTree {
            dims,
            values,
            coords,
            nodes,
        })
    }

    /// Number of points in the tree.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Coordinate dimension, fixed by the first input point. An empty tree
    /// has no defined dimension and reports 0.
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// All values, in input order.
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Coordinates of the point at `index`, in input order.
    pub fn point(&self, index: usize) -> &[f64] {
        &self.coords[index * self.dims..(index + 1) * self.dims]
    }

    /// Flat coordinate buffer, `dims()` values per point, in input order.
    pub fn points(&self) -> &[f64] {
        &self.coords
    }

    /// The up-to-`k` values nearest to `point`, ordered by non-decreasing
    /// distance. Equivalent to [`nearest_within`](Self::nearest_within) with
    /// an unbounded search radius.
    ///
    /// # Panics
    ///
    /// Panics if `point` has a different length than [`dims`](Self::dims) and
    /// the tree is non-empty.
    pub fn nearest(&self, point: &[f64], k: usize) -> Vec<&V> {
        self.nearest_within(point, k, f64::INFINITY)
    }

    /// The up-to-`k` values within `max_distance` of `point`, ordered by
    /// non-decreasing distance.
    ///
    /// The search is branch-and-bound: subtrees whose splitting plane lies
    /// beyond the current worst kept candidate are pruned, so a small `k`
    /// combined with a finite `max_distance` bounds the work per query. An
    /// empty tree and a radius that excludes every point both yield an empty
    /// vector, as does `k == 0`.
    ///
    /// # Panics
    ///
    /// Panics if `point` has a different length than [`dims`](Self::dims) and
    /// the tree is non-empty.
    pub fn nearest_within(&self, point: &[f64], k: usize, max_distance: f64) -> Vec<&V> {
        let (found, _) = self.search(point, k, max_distance);
        found
            .into_sorted()
            .into_iter()
            .map(|(_, p)| &self.values[p as usize])
            .collect()
    }

    /// Answers many queries against the same tree in parallel. `queries`
    /// holds [`dims`](Self::dims) coordinates per query point; the result
    /// holds one ordered vector per query, in query order. An empty tree
    /// yields an empty vector.
    ///
    /// # Panics
    ///
    /// Panics if `queries.len()` is not a multiple of [`dims`](Self::dims).
    pub fn nearest_batch(&self, queries: &[f64], k: usize, max_distance: f64) -> Vec<Vec<&V>>
    where
        V: Sync,
    {
        if self.is_empty() {
            return Vec::new();
        }
        assert!(
            queries.len() % self.dims == 0,
            "query buffer length {} is not a multiple of dimension {}",
            queries.len(),
            self.dims
        );
        queries
            .par_chunks(self.dims)
            .map(|q| self.nearest_within(q, k, max_distance))
            .collect()
    }

    /// Runs a query and also reports the number of nodes visited, which the
    /// test module uses to check that traversal cost scales with tree depth.
    fn search(&self, point: &[f64], k: usize, max_distance: f64) -> (NearestNeighbors, usize) {
        debug_assert!(max_distance >= 0.0);
        let mut found = NearestNeighbors::new(k, max_distance * max_distance);
        let mut visited = 0;
        if self.is_empty() || k == 0 {
            return (found, visited);
        }
        assert!(
            point.len() == self.dims,
            "query point has {} coordinates, tree holds {}-dimensional points",
            point.len(),
            self.dims
        );

        // Root is the last node pushed by the recursive build.
        let root = (self.nodes.len() - 1) as u32;
        self.search_recursive(root, 0, point, &mut found, &mut visited);
        (found, visited)
    }

    fn search_recursive(
        &self,
        node: u32,
        depth: usize,
        point: &[f64],
        found: &mut NearestNeighbors,
        visited: &mut usize,
    ) {
        let KdNode { point: p, left, right } = self.nodes[node as usize];
        *visited += 1;

        let base = p as usize * self.dims;
        let mut dist_sq = 0.0;
        for i in 0..self.dims {
            let d = point[i] - self.coords[base + i];
            dist_sq += d * d;
        }
        found.offer(dist_sq, p);

        let axis = depth % self.dims;
        let diff = point[axis] - self.coords[base + axis];

        // Visit the near side unconditionally; the far side only while the
        // splitting plane is within the current search radius. `<=` on both
        // sides matches the partition, so boundary ties are never skipped.
        let (near, far) = if diff <= 0.0 { (left, right) } else { (right, left) };
        if near != NONE {
            self.search_recursive(near, depth + 1, point, found, visited);
        }
        if far != NONE && diff * diff <= found.radius_sq() {
            self.search_recursive(far, depth + 1, point, found, visited);
        }
    }
}

/// Recursively median-splits `order` on the axis cycling with `depth` and
/// appends the subtree's nodes, returning its root index or `NONE`.
///
/// `select_nth_unstable_by` partitions in linear time per level, so the whole
/// build is `O(N log N)` without re-sorting the subset at every level.
fn build_recursive(
    nodes: &mut Vec<KdNode>,
    order: &mut [u32],
    depth: usize,
    coords: &[f64],
    dims: usize,
) -> u32 {
    if order.is_empty() {
        return NONE;
    }

    let axis = depth % dims;
    let mid = order.len() / 2;
    order.select_nth_unstable_by(mid, |&a, &b| {
        let va = coords[a as usize * dims + axis];
        let vb = coords[b as usize * dims + axis];
        va.partial_cmp(&vb).unwrap_or(std::cmp::Ordering::Equal)
    });

    let (lower, rest) = order.split_at_mut(mid);
    let (&mut point, upper) = rest.split_first_mut().unwrap();

    let left = build_recursive(nodes, lower, depth + 1, coords, dims);
    let right = build_recursive(nodes, upper, depth + 1, coords, dims);

    let index = nodes.len() as u32;
    nodes.push(KdNode { point, left, right });
    index
}
