use std::collections::BinaryHeap;

use crate::data_structures::bounded_heap::BoundedHeap;
use crate::data_structures::property_set::{PropertyHandle, PropertySet};
use crate::geometry::primitives::Box3;
use crate::geometry::traits::ClosestPoint3;
use crate::helpers::aliases::Point3f;

use super::{NodeIndex, TraversalEntry, INVALID_NODE_INDEX};

/// Node of a [`KdTree`]; leaves own a span of the tree's index permutation
#[derive(Debug, Clone, Copy)]
pub struct KdNode {
    aabb: Box3,
    first_point: usize,
    num_points: usize,
    children: [NodeIndex; 2],
    split_axis: u8,
    split_position: f32,
    is_leaf: bool,
}

impl Default for KdNode {
    fn default() -> Self {
        return Self {
            aabb: Box3::empty(),
            first_point: 0,
            num_points: 0,
            children: [INVALID_NODE_INDEX; 2],
            split_axis: 0,
            split_position: 0.0,
            is_leaf: true,
        };
    }
}

impl KdNode {
    #[inline]
    pub fn bbox(&self) -> &Box3 {
        return &self.aabb;
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        return self.is_leaf;
    }

    #[inline]
    pub fn first_point(&self) -> usize {
        return self.first_point;
    }

    #[inline]
    pub fn num_points(&self) -> usize {
        return self.num_points;
    }

    #[inline]
    pub fn children(&self) -> &[NodeIndex; 2] {
        return &self.children;
    }

    #[inline]
    pub fn split_axis(&self) -> u8 {
        return self.split_axis;
    }

    #[inline]
    pub fn split_position(&self) -> f32 {
        return self.split_position;
    }
}

///
/// Median-split kd-tree over a borrowed set of points. The tree stores a
/// permutation of point indices partitioned by the recursive splits; queries
/// return indices into the original slice.
///
/// ## Example
/// ```ignore
/// let mut tree = KdTree::new();
/// tree.build(&points, 16, 24);
/// let mut in_range = Vec::new();
/// tree.query_radius(&query, 0.5, &mut in_range);
/// ```
///
pub struct KdTree<'points> {
    nodes: Vec<KdNode>,
    node_props: PropertySet,
    point_indices: Vec<usize>,
    points: &'points [Point3f],
    max_points_per_leaf: usize,
    max_depth: usize,
}

impl<'points> Default for KdTree<'points> {
    fn default() -> Self {
        return Self::new();
    }
}

impl<'points> KdTree<'points> {
    pub fn new() -> Self {
        return Self {
            nodes: Vec::new(),
            node_props: PropertySet::new(),
            point_indices: Vec::new(),
            points: &[],
            max_points_per_leaf: 16,
            max_depth: 24,
        };
    }

    #[inline]
    pub fn max_points_per_leaf(&self) -> usize {
        return self.max_points_per_leaf;
    }

    #[inline]
    pub fn max_depth(&self) -> usize {
        return self.max_depth;
    }

    /// Permutation of `[0..N)` partitioned by the tree's splits
    #[inline]
    pub fn point_indices(&self) -> &[usize] {
        return &self.point_indices;
    }

    #[inline]
    pub fn nodes(&self) -> &[KdNode] {
        return &self.nodes;
    }

    // Per-node user attributes; they grow together with the node storage

    pub fn add_node_property<T: Clone + 'static>(
        &mut self,
        name: &str,
        default: T,
    ) -> Option<PropertyHandle<T>> {
        return self.node_props.add(name, default);
    }

    pub fn get_node_property<T: 'static>(&self, name: &str) -> Option<PropertyHandle<T>> {
        return self.node_props.get(name);
    }

    pub fn node_property<T: Clone + 'static>(
        &mut self,
        name: &str,
        default: T,
    ) -> Option<PropertyHandle<T>> {
        return self.node_props.get_or_add(name, default);
    }

    pub fn remove_node_property<T>(&mut self, handle: PropertyHandle<T>) {
        self.node_props.remove(handle);
    }

    pub fn has_node_property(&self, name: &str) -> bool {
        return self.node_props.exists(name);
    }

    pub fn node_property_values<T: 'static>(&self, handle: &PropertyHandle<T>) -> &[T] {
        return self.node_props.values(handle);
    }

    pub fn node_property_values_mut<T: 'static>(&mut self, handle: &PropertyHandle<T>) -> &mut [T] {
        return self.node_props.values_mut(handle);
    }

    /// Rebuilds the tree over `positions`. Returns `false` on empty input,
    /// leaving the tree empty; previously obtained node indices are invalid
    /// afterwards either way.
    pub fn build(
        &mut self,
        positions: &'points [Point3f],
        max_points_per_leaf: usize,
        max_depth: usize,
    ) -> bool {
        self.points = positions;
        self.max_points_per_leaf = max_points_per_leaf.max(1);
        self.max_depth = max_depth.max(1);

        self.nodes.clear();
        self.node_props.clear();

        let num_points = positions.len();
        if num_points == 0 {
            self.point_indices.clear();
            return false;
        }

        self.nodes.reserve(num_points / self.max_points_per_leaf * 2 + 1);
        self.point_indices.clear();
        self.point_indices.extend(0..num_points);

        let root = self.create_node();
        self.build_node(root, 0, 0, num_points);

        return true;
    }

    /// Collects every point contained inside the axis-aligned query volume
    pub fn query_box3(&self, region: &Box3, result: &mut Vec<usize>) {
        result.clear();
        if self.nodes.is_empty() {
            return;
        }

        let mut stack = vec![0];
        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];

            if !node.aabb.intersects_box3(region) {
                continue;
            }

            if node.is_leaf {
                for i in 0..node.num_points {
                    let pi = self.point_indices[node.first_point + i];
                    if region.contains_point(&self.points[pi]) {
                        result.push(pi);
                    }
                }
            } else {
                for child in node.children {
                    if child != INVALID_NODE_INDEX {
                        stack.push(child);
                    }
                }
            }
        }
    }

    /// Collects all points within `radius` of `query_point`
    pub fn query_radius(&self, query_point: &Point3f, radius: f32, result: &mut Vec<usize>) {
        result.clear();
        if self.nodes.is_empty() || radius < 0.0 {
            return;
        }

        let radius_sq = radius * radius;
        let mut stack = vec![0];
        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];

            if node.aabb.squared_distance(query_point) > radius_sq {
                continue;
            }

            if node.is_leaf {
                for i in 0..node.num_points {
                    let pi = self.point_indices[node.first_point + i];
                    if (self.points[pi] - query_point).norm_squared() <= radius_sq {
                        result.push(pi);
                    }
                }
            } else {
                for child in node.children {
                    if child != INVALID_NODE_INDEX {
                        stack.push(child);
                    }
                }
            }
        }
    }

    /// Indices of the `k` closest points, ascending by distance. Ties are
    /// broken towards the smaller point index.
    pub fn query_knn(&self, query_point: &Point3f, k: usize, results: &mut Vec<usize>) {
        results.clear();
        if self.nodes.is_empty() || k == 0 {
            return;
        }

        let mut heap = BoundedHeap::<(f32, usize)>::new(k);
        let mut queue = BinaryHeap::new();

        queue.push(TraversalEntry {
            dist_sq: self.node_distance(0, query_point),
            node: 0,
        });
        let mut tau = f32::INFINITY;

        while let Some(TraversalEntry { dist_sq: node_dist, node: node_idx }) = queue.pop() {
            if heap.len() == k && node_dist > tau {
                break;
            }

            let node = &self.nodes[node_idx];
            if node.is_leaf {
                for i in 0..node.num_points {
                    let pi = self.point_indices[node.first_point + i];
                    let dist = (self.points[pi] - query_point).norm_squared();
                    let candidate = (dist, pi);

                    let accept = match heap.top() {
                        Some(worst) => heap.len() < k || candidate < *worst,
                        None => true,
                    };
                    if accept {
                        heap.push(candidate);
                        if heap.len() == k {
                            tau = heap.top().map(|worst| worst.0).unwrap_or(f32::INFINITY);
                        }
                    }
                }
            } else {
                for child in node.children {
                    if child == INVALID_NODE_INDEX {
                        continue;
                    }

                    let child_dist = self.node_distance(child, query_point);
                    if child_dist <= tau {
                        queue.push(TraversalEntry {
                            dist_sq: child_dist,
                            node: child,
                        });
                    }
                }
            }
        }

        results.extend(heap.sorted().into_iter().map(|(_, pi)| pi));
    }

    /// Index of the closest point, or `None` for an empty tree
    pub fn query_nearest(&self, query_point: &Point3f) -> Option<usize> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut best_dist_sq = f64::MAX;
        let mut result = None;
        let mut queue = BinaryHeap::new();

        queue.push(TraversalEntry {
            dist_sq: self.node_distance(0, query_point),
            node: 0,
        });

        while let Some(TraversalEntry { dist_sq: node_dist, node: node_idx }) = queue.pop() {
            if node_dist as f64 >= best_dist_sq {
                break;
            }

            let node = &self.nodes[node_idx];
            if node.is_leaf {
                for i in 0..node.num_points {
                    let pi = self.point_indices[node.first_point + i];
                    let dist_sq = (self.points[pi] - query_point).norm_squared() as f64;
                    if dist_sq < best_dist_sq {
                        best_dist_sq = dist_sq;
                        result = Some(pi);
                    }
                }
            } else {
                for child in node.children {
                    if child == INVALID_NODE_INDEX {
                        continue;
                    }

                    let child_dist = self.node_distance(child, query_point);
                    if (child_dist as f64) < best_dist_sq {
                        queue.push(TraversalEntry {
                            dist_sq: child_dist,
                            node: child,
                        });
                    }
                }
            }
        }

        return result;
    }

    /// Checks that every internal node's children partition its span exactly
    pub fn validate_structure(&self) -> bool {
        if self.nodes.is_empty() {
            return self.point_indices.is_empty();
        }

        return self.validate_node(0);
    }

    #[inline]
    fn node_distance(&self, node_idx: NodeIndex, query_point: &Point3f) -> f32 {
        return self.nodes[node_idx].aabb.squared_distance(query_point);
    }

    fn create_node(&mut self) -> NodeIndex {
        self.nodes.push(KdNode::default());
        self.node_props.push();
        return self.nodes.len() - 1;
    }

    fn compute_bounds(&self, first: usize, count: usize) -> Box3 {
        let mut bounds = Box3::empty();
        for i in 0..count {
            let pi = self.point_indices[first + i];
            bounds.union_point3(&self.points[pi]);
        }

        return bounds;
    }

    fn build_node(&mut self, node_idx: NodeIndex, depth: usize, begin: usize, end: usize) {
        let count = end - begin;
        let bounds = self.compute_bounds(begin, count);

        {
            let node = &mut self.nodes[node_idx];
            node.first_point = begin;
            node.num_points = count;
            node.aabb = bounds;
        }

        if depth >= self.max_depth || count <= self.max_points_per_leaf {
            return;
        }

        let extent = bounds.size();
        let mut axis = 0;
        if extent[1] > extent[0] {
            axis = 1;
        }
        if extent[2] > extent[axis] {
            axis = 2;
        }

        // All points coincide along the longest axis
        if extent[axis] <= f32::EPSILON {
            return;
        }

        let mid = begin + count / 2;
        let points = self.points;
        self.point_indices[begin..end].select_nth_unstable_by(count / 2, |lhs, rhs| {
            return points[*lhs][axis].partial_cmp(&points[*rhs][axis]).unwrap();
        });

        if mid == begin || mid == end {
            return;
        }

        let median_index = self.point_indices[mid];
        {
            let node = &mut self.nodes[node_idx];
            node.is_leaf = false;
            node.split_axis = axis as u8;
            node.split_position = points[median_index][axis];
        }

        let left_child = self.create_node();
        self.nodes[node_idx].children[0] = left_child;
        self.build_node(left_child, depth + 1, begin, mid);

        let right_child = self.create_node();
        self.nodes[node_idx].children[1] = right_child;
        self.build_node(right_child, depth + 1, mid, end);
    }

    fn validate_node(&self, node_idx: NodeIndex) -> bool {
        let node = &self.nodes[node_idx];
        if node.first_point + node.num_points > self.point_indices.len() {
            return false;
        }

        if node.is_leaf {
            return true;
        }

        let [left, right] = node.children;
        if left == INVALID_NODE_INDEX || right == INVALID_NODE_INDEX {
            return false;
        }

        let left_node = &self.nodes[left];
        let right_node = &self.nodes[right];

        if left_node.first_point != node.first_point {
            return false;
        }
        if left_node.first_point + left_node.num_points != right_node.first_point {
            return false;
        }
        if right_node.first_point + right_node.num_points != node.first_point + node.num_points {
            return false;
        }

        return self.validate_node(left) && self.validate_node(right);
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use crate::helpers::aliases::Vec3f;

    use super::*;

    fn random_points(count: usize, rng: &mut StdRng) -> Vec<Point3f> {
        return (0..count)
            .map(|_| {
                Point3f::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                )
            })
            .collect();
    }

    fn brute_force_box3(points: &[Point3f], region: &Box3) -> Vec<usize> {
        return (0..points.len())
            .filter(|i| region.contains_point(&points[*i]))
            .collect();
    }

    fn brute_force_radius(points: &[Point3f], query: &Point3f, radius: f32) -> Vec<usize> {
        return (0..points.len())
            .filter(|i| (points[*i] - query).norm_squared() <= radius * radius)
            .collect();
    }

    fn brute_force_knn(points: &[Point3f], query: &Point3f, k: usize) -> Vec<usize> {
        let mut distances: Vec<(f32, usize)> = (0..points.len())
            .map(|i| ((points[i] - query).norm_squared(), i))
            .collect();
        distances.sort_by(|a, b| a.partial_cmp(b).unwrap());
        distances.truncate(k);
        return distances.into_iter().map(|(_, i)| i).collect();
    }

    #[test]
    fn box_query_on_unit_cube_corners() {
        let points: Vec<Point3f> = (0..8)
            .map(|i| {
                Point3f::new(
                    (i & 1) as f32,
                    ((i >> 1) & 1) as f32,
                    ((i >> 2) & 1) as f32,
                )
            })
            .collect();

        let mut tree = KdTree::new();
        assert!(tree.build(&points, 2, 8));
        assert!(tree.validate_structure());

        let region = Box3::new(Point3f::new(-0.1, -0.1, -0.1), Point3f::new(0.5, 0.5, 0.5));
        let mut result = Vec::new();
        tree.query_box3(&region, &mut result);

        assert_eq!(result, vec![0]);
    }

    #[test]
    fn radius_query_on_integer_grid() {
        let mut points = Vec::new();
        for x in 0..3 {
            for y in 0..3 {
                for z in 0..3 {
                    points.push(Point3f::new(x as f32, y as f32, z as f32));
                }
            }
        }

        let mut tree = KdTree::new();
        assert!(tree.build(&points, 4, 8));

        let mut result = Vec::new();
        tree.query_radius(&Point3f::new(1.0, 1.0, 1.0), 1.0, &mut result);
        result.sort_unstable();

        // Center plus its six axis neighbors
        let expected = brute_force_radius(&points, &Point3f::new(1.0, 1.0, 1.0), 1.0);
        assert_eq!(result.len(), 7);
        assert_eq!(result, expected);
    }

    #[test]
    fn knn_breaks_ties_by_index() {
        let points = [
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(2.0, 0.0, 0.0),
            Point3f::new(0.0, 2.0, 0.0),
            Point3f::new(0.0, 0.0, 2.0),
            Point3f::new(3.0, 3.0, 3.0),
        ];

        let mut tree = KdTree::new();
        assert!(tree.build(&points, 1, 8));

        let mut result = Vec::new();
        tree.query_knn(&Point3f::new(0.0, 0.0, 0.0), 3, &mut result);

        assert_eq!(result, vec![0, 1, 2]);
    }

    #[test]
    fn knn_with_k_larger_than_input_returns_everything() {
        let points = [
            Point3f::new(3.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(2.0, 0.0, 0.0),
        ];

        let mut tree = KdTree::new();
        assert!(tree.build(&points, 1, 8));

        let mut result = Vec::new();
        tree.query_knn(&Point3f::origin(), 10, &mut result);

        assert_eq!(result, vec![1, 2, 0]);
    }

    #[test]
    fn empty_build_leaves_queryable_tree() {
        let mut tree = KdTree::new();
        assert!(!tree.build(&[], 16, 24));
        assert!(tree.validate_structure());

        let mut result = vec![123];
        tree.query_box3(&Box3::new(Point3f::origin(), Point3f::new(1.0, 1.0, 1.0)), &mut result);
        assert!(result.is_empty());

        tree.query_radius(&Point3f::origin(), 1.0, &mut result);
        assert!(result.is_empty());

        tree.query_knn(&Point3f::origin(), 3, &mut result);
        assert!(result.is_empty());

        assert_eq!(tree.query_nearest(&Point3f::origin()), None);
    }

    #[test]
    fn degenerate_parameters_are_clamped() {
        let points = [Point3f::origin(), Point3f::new(1.0, 0.0, 0.0)];
        let mut tree = KdTree::new();

        assert!(tree.build(&points, 0, 0));
        assert_eq!(tree.max_points_per_leaf(), 1);
        assert_eq!(tree.max_depth(), 1);
        assert!(tree.validate_structure());
    }

    #[test]
    fn coincident_points_build_a_leaf() {
        let points = vec![Point3f::new(1.0, 2.0, 3.0); 100];
        let mut tree = KdTree::new();

        assert!(tree.build(&points, 4, 24));
        assert!(tree.validate_structure());

        let mut result = Vec::new();
        tree.query_radius(&Point3f::new(1.0, 2.0, 3.0), 0.1, &mut result);
        assert_eq!(result.len(), 100);
    }

    #[test]
    fn queries_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(42);
        let points = random_points(256, &mut rng);

        let mut tree = KdTree::new();
        assert!(tree.build(&points, 16, 24));
        assert!(tree.validate_structure());

        let mut result = Vec::new();
        for _ in 0..32 {
            let min_corner = Point3f::new(
                rng.gen_range(-1.25..0.75),
                rng.gen_range(-1.25..0.75),
                rng.gen_range(-1.25..0.75),
            );
            let region = Box3::new(min_corner, min_corner + Vec3f::new(0.5, 0.5, 0.5));

            tree.query_box3(&region, &mut result);
            result.sort_unstable();
            assert_eq!(result, brute_force_box3(&points, &region));

            let query = Point3f::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            let radius = rng.gen_range(0.0..0.8);

            tree.query_radius(&query, radius, &mut result);
            result.sort_unstable();
            assert_eq!(result, brute_force_radius(&points, &query, radius));

            let k = rng.gen_range(1..20);
            tree.query_knn(&query, k, &mut result);
            assert_eq!(result, brute_force_knn(&points, &query, k));

            assert_eq!(tree.query_nearest(&query), result.first().copied());
        }
    }

    #[test]
    fn point_indices_form_a_permutation() {
        let mut rng = StdRng::seed_from_u64(5);
        let points = random_points(100, &mut rng);

        let mut tree = KdTree::new();
        assert!(tree.build(&points, 8, 24));

        let mut indices = tree.point_indices().to_vec();
        indices.sort_unstable();
        assert_eq!(indices, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn node_properties_grow_with_the_tree() {
        let mut rng = StdRng::seed_from_u64(6);
        let points = random_points(64, &mut rng);

        let mut tree = KdTree::new();
        assert!(tree.build(&points, 4, 24));

        let visits = tree.add_node_property::<u32>("n:visits", 0).unwrap();
        assert_eq!(tree.node_property_values(&visits).len(), tree.nodes().len());

        tree.node_property_values_mut(&visits)[0] = 3;
        assert_eq!(tree.node_property_values(&visits)[0], 3);

        assert!(tree.has_node_property("n:visits"));
        assert!(tree.get_node_property::<f32>("n:visits").is_none());

        tree.remove_node_property(visits);
        assert!(!tree.has_node_property("n:visits"));
    }
}
