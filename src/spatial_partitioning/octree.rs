use std::collections::BinaryHeap;

use crate::data_structures::bounded_heap::BoundedHeap;
use crate::data_structures::property_set::{PropertyHandle, PropertySet};
use crate::geometry::primitives::{Box3, Sphere3};
use crate::geometry::traits::ClosestPoint3;
use crate::helpers::aliases::{Point3f, Vec3f};

use super::{NodeIndex, TraversalEntry, INVALID_NODE_INDEX};

/// Where a node places its split point when subdividing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPoint {
    /// Geometric center of the node's box
    Center,
    /// Mean of the element box centers
    Mean,
    /// Component-wise median of the element box centers
    Median,
}

#[derive(Debug, Clone, Copy)]
pub struct SplitPolicy {
    pub split_point: SplitPoint,
    /// Shrink child boxes to exactly fit their contents
    pub tight_children: bool,
    /// Optional padding when tightening
    pub epsilon: f32,
}

impl Default for SplitPolicy {
    fn default() -> Self {
        return Self {
            split_point: SplitPoint::Center,
            tight_children: false,
            epsilon: 0.0,
        };
    }
}

/// Node of an [`Octree`]. Straddlers sit at the front of the node's span and
/// are tested by every traversal that reaches the node.
#[derive(Debug, Clone, Copy)]
pub struct OctreeNode {
    aabb: Box3,
    first_element: usize,
    num_elements: usize,
    num_straddlers: usize,
    children: [NodeIndex; 8],
    is_leaf: bool,
}

impl Default for OctreeNode {
    fn default() -> Self {
        return Self {
            aabb: Box3::empty(),
            first_element: usize::MAX,
            num_elements: 0,
            num_straddlers: 0,
            children: [INVALID_NODE_INDEX; 8],
            is_leaf: true,
        };
    }
}

impl OctreeNode {
    #[inline]
    pub fn bbox(&self) -> &Box3 {
        return &self.aabb;
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        return self.is_leaf;
    }

    #[inline]
    pub fn first_element(&self) -> usize {
        return self.first_element;
    }

    #[inline]
    pub fn num_elements(&self) -> usize {
        return self.num_elements;
    }

    #[inline]
    pub fn num_straddlers(&self) -> usize {
        return self.num_straddlers;
    }

    #[inline]
    pub fn children(&self) -> &[NodeIndex; 8] {
        return &self.children;
    }
}

///
/// Loose octree over a borrowed set of element bounding boxes. Elements that
/// cross child boundaries stay on the parent as straddlers unless the split
/// policy tightens children, in which case they are pushed down by center.
///
/// ## Example
/// ```ignore
/// let mut tree = Octree::new();
/// tree.build(&boxes, SplitPolicy::default(), 8, 12);
/// let mut hits = Vec::new();
/// tree.query_box3(&region, &mut hits);
/// ```
///
pub struct Octree<'elements> {
    nodes: Vec<OctreeNode>,
    node_props: PropertySet,
    element_boxes: &'elements [Box3],
    element_indices: Vec<usize>,
    split_policy: SplitPolicy,
    max_elements_per_node: usize,
    max_depth: usize,
    // Straddler buffer reused across builds
    build_scratch: Vec<usize>,
}

impl<'elements> Default for Octree<'elements> {
    fn default() -> Self {
        return Self::new();
    }
}

impl<'elements> Octree<'elements> {
    pub fn new() -> Self {
        return Self {
            nodes: Vec::new(),
            node_props: PropertySet::new(),
            element_boxes: &[],
            element_indices: Vec::new(),
            split_policy: SplitPolicy::default(),
            max_elements_per_node: 32,
            max_depth: 10,
            build_scratch: Vec::new(),
        };
    }

    #[inline]
    pub fn max_elements_per_node(&self) -> usize {
        return self.max_elements_per_node;
    }

    #[inline]
    pub fn max_depth(&self) -> usize {
        return self.max_depth;
    }

    #[inline]
    pub fn split_policy(&self) -> &SplitPolicy {
        return &self.split_policy;
    }

    /// Permutation of `[0..N)` partitioned by the subdivision
    #[inline]
    pub fn element_indices(&self) -> &[usize] {
        return &self.element_indices;
    }

    #[inline]
    pub fn nodes(&self) -> &[OctreeNode] {
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

    /// Rebuilds the tree over `boxes`. Returns `false` on empty input,
    /// leaving the tree empty; previously obtained node indices are invalid
    /// afterwards either way.
    pub fn build(
        &mut self,
        boxes: &'elements [Box3],
        policy: SplitPolicy,
        max_elements_per_node: usize,
        max_depth: usize,
    ) -> bool {
        self.element_boxes = boxes;
        self.split_policy = policy;
        self.max_elements_per_node = max_elements_per_node;
        self.max_depth = max_depth;

        self.nodes.clear();
        self.node_props.clear();

        let num_elements = boxes.len();
        if num_elements == 0 {
            self.element_indices.clear();
            return false;
        }

        self.element_indices.clear();
        self.element_indices.extend(0..num_elements);

        let root = self.create_node();
        {
            let mut bounds = Box3::empty();
            for element in boxes {
                bounds.union_box3(element);
            }

            let node = &mut self.nodes[root];
            node.first_element = 0;
            node.num_elements = num_elements;
            node.aabb = bounds;
        }

        self.subdivide(root, 0);
        return true;
    }

    /// Collects the indices of every element whose box intersects the query
    /// box.
    ///
    /// When the query strictly contains a node's box the node's whole span is
    /// emitted without further tests. With loose children that span can hold
    /// straddlers whose own boxes do not touch the query; build with
    /// `tight_children` or post-filter when exact results are required.
    pub fn query_box3(&self, region: &Box3, result: &mut Vec<usize>) {
        result.clear();
        if self.nodes.is_empty() {
            return;
        }

        let query_volume = region.volume() as f64;

        let mut stack = vec![0];
        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];

            if !node.aabb.intersects_box3(region) {
                continue;
            }

            let node_volume = node.aabb.volume() as f64;
            let strictly_larger = query_volume > node_volume;

            if strictly_larger && region.contains_box3(&node.aabb) {
                for i in 0..node.num_elements {
                    result.push(self.element_indices[node.first_element + i]);
                }
                continue;
            }

            if node.is_leaf {
                for i in 0..node.num_elements {
                    let ei = self.element_indices[node.first_element + i];
                    if self.element_boxes[ei].intersects_box3(region) {
                        result.push(ei);
                    }
                }
            } else {
                for i in 0..node.num_straddlers {
                    let ei = self.element_indices[node.first_element + i];
                    if self.element_boxes[ei].intersects_box3(region) {
                        result.push(ei);
                    }
                }
                for child in node.children {
                    if child != INVALID_NODE_INDEX && self.nodes[child].aabb.intersects_box3(region)
                    {
                        stack.push(child);
                    }
                }
            }
        }
    }

    /// Collects the indices of every element whose box intersects the query
    /// sphere. Shares the emit-all containment shortcut of [`Self::query_box3`].
    pub fn query_sphere3(&self, region: &Sphere3, result: &mut Vec<usize>) {
        result.clear();
        if self.nodes.is_empty() {
            return;
        }

        let query_volume = region.volume() as f64;

        let mut stack = vec![0];
        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];

            if !node.aabb.intersects_sphere3(region) {
                continue;
            }

            let node_volume = node.aabb.volume() as f64;
            let strictly_larger = query_volume > node_volume;

            if strictly_larger && region.contains_box3(&node.aabb) {
                for i in 0..node.num_elements {
                    result.push(self.element_indices[node.first_element + i]);
                }
                continue;
            }

            if node.is_leaf {
                for i in 0..node.num_elements {
                    let ei = self.element_indices[node.first_element + i];
                    if self.element_boxes[ei].intersects_sphere3(region) {
                        result.push(ei);
                    }
                }
            } else {
                for i in 0..node.num_straddlers {
                    let ei = self.element_indices[node.first_element + i];
                    if self.element_boxes[ei].intersects_sphere3(region) {
                        result.push(ei);
                    }
                }
                for child in node.children {
                    if child != INVALID_NODE_INDEX
                        && self.nodes[child].aabb.intersects_sphere3(region)
                    {
                        stack.push(child);
                    }
                }
            }
        }
    }

    /// Indices of the `k` elements with the smallest box distance to
    /// `query_point`, ascending
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
            // The best remaining node is already worse than the kth best
            if heap.len() == k && node_dist >= tau {
                break;
            }

            let node = &self.nodes[node_idx];
            let scored = if node.is_leaf {
                node.num_elements
            } else {
                node.num_straddlers
            };

            for i in 0..scored {
                let ei = self.element_indices[node.first_element + i];
                let dist = self.element_boxes[ei].squared_distance(query_point);

                if heap.len() < k || dist < tau {
                    heap.push((dist, ei));
                    if heap.len() == k {
                        tau = heap.top().map(|worst| worst.0).unwrap_or(f32::INFINITY);
                    }
                }
            }

            if !node.is_leaf {
                for child in node.children {
                    if child == INVALID_NODE_INDEX {
                        continue;
                    }

                    let child_dist = self.node_distance(child, query_point);
                    if child_dist < tau {
                        queue.push(TraversalEntry {
                            dist_sq: child_dist,
                            node: child,
                        });
                    }
                }
            }
        }

        results.extend(heap.sorted().into_iter().map(|(_, ei)| ei));
    }

    /// Index of the element box closest to `query_point`, or `None` for an
    /// empty tree
    pub fn query_nearest(&self, query_point: &Point3f) -> Option<usize> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut min_dist_sq = f64::MAX;
        let mut result = None;
        let mut queue = BinaryHeap::new();

        queue.push(TraversalEntry {
            dist_sq: self.node_distance(0, query_point),
            node: 0,
        });

        while let Some(TraversalEntry { dist_sq: node_dist, node: node_idx }) = queue.pop() {
            if node_dist as f64 >= min_dist_sq {
                break;
            }

            let node = &self.nodes[node_idx];
            let scored = if node.is_leaf {
                node.num_elements
            } else {
                node.num_straddlers
            };

            for i in 0..scored {
                let ei = self.element_indices[node.first_element + i];
                let dist_sq = self.element_boxes[ei].squared_distance(query_point) as f64;
                if dist_sq < min_dist_sq {
                    min_dist_sq = dist_sq;
                    result = Some(ei);
                }
            }

            if !node.is_leaf {
                for child in node.children {
                    if child == INVALID_NODE_INDEX {
                        continue;
                    }

                    let child_dist = self.node_distance(child, query_point);
                    if (child_dist as f64) < min_dist_sq {
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

    /// Checks span bookkeeping: children cover consecutive sub-ranges after
    /// the straddlers, no child is empty, and element counts are conserved
    pub fn validate_structure(&self) -> bool {
        if self.nodes.is_empty() {
            return self.element_indices.is_empty();
        }

        return self.validate_node(0);
    }

    #[inline]
    fn node_distance(&self, node_idx: NodeIndex, query_point: &Point3f) -> f32 {
        return self.nodes[node_idx].aabb.squared_distance(query_point);
    }

    fn create_node(&mut self) -> NodeIndex {
        self.nodes.push(OctreeNode::default());
        self.node_props.push();
        return self.nodes.len() - 1;
    }

    fn subdivide(&mut self, node_idx: NodeIndex, depth: usize) {
        let (first_element, num_elements, node_aabb) = {
            let node = &self.nodes[node_idx];
            (node.first_element, node.num_elements, node.aabb)
        };

        if depth >= self.max_depth || num_elements <= self.max_elements_per_node {
            self.nodes[node_idx].is_leaf = true;
            return;
        }

        let mut split_point = self.choose_split_point(node_idx);

        // Nudge the split point off the node boundary when it lands on it
        for axis in 0..3 {
            let lo = node_aabb.get_min()[axis];
            let hi = node_aabb.get_max()[axis];
            let mut s = split_point[axis];

            if s <= lo || s >= hi {
                s = 0.5 * (lo + hi);
            }
            if s == lo {
                s = s.next_up();
            } else if s == hi {
                s = s.next_down();
            }

            split_point[axis] = s;
        }

        let octant_aabbs: [Box3; 8] = core::array::from_fn(|j| {
            let min = Point3f::new(
                if j & 1 != 0 { split_point.x } else { node_aabb.get_min().x },
                if j & 2 != 0 { split_point.y } else { node_aabb.get_min().y },
                if j & 4 != 0 { split_point.z } else { node_aabb.get_min().z },
            );
            let max = Point3f::new(
                if j & 1 != 0 { node_aabb.get_max().x } else { split_point.x },
                if j & 2 != 0 { node_aabb.get_max().y } else { split_point.y },
                if j & 4 != 0 { node_aabb.get_max().z } else { split_point.z },
            );
            return Box3::new(min, max);
        });

        let octant_code = |point: &Point3f| {
            let mut code = 0;
            if point.x >= split_point.x {
                code |= 1;
            }
            if point.y >= split_point.y {
                code |= 2;
            }
            if point.z >= split_point.z {
                code |= 4;
            }
            return code;
        };

        let mut child_elements: [Vec<usize>; 8] = core::array::from_fn(|_| Vec::new());
        let mut straddlers = std::mem::take(&mut self.build_scratch);
        straddlers.clear();

        for i in 0..num_elements {
            let elem_idx = self.element_indices[first_element + i];
            let elem_aabb = &self.element_boxes[elem_idx];

            if elem_aabb.get_min() == elem_aabb.get_max() {
                // Point element, assign directly by octant code
                child_elements[octant_code(elem_aabb.get_min())].push(elem_idx);
                continue;
            }

            let mut found_child = None;
            for (j, octant) in octant_aabbs.iter().enumerate() {
                if octant.contains_box3(elem_aabb) {
                    if found_child.is_none() {
                        found_child = Some(j);
                    } else {
                        // Contained by two octants within fp noise; treat as
                        // a straddler
                        found_child = None;
                        break;
                    }
                }
            }

            match found_child {
                Some(j) => child_elements[j].push(elem_idx),
                None => {
                    if self.split_policy.tight_children {
                        child_elements[octant_code(&elem_aabb.get_center())].push(elem_idx);
                    } else {
                        straddlers.push(elem_idx);
                    }
                }
            }
        }

        // Splitting that separates nothing only adds depth
        let num_straddlers = straddlers.len();
        let split_is_useless = num_straddlers == num_elements
            || child_elements.iter().any(|c| c.len() == num_elements);
        if split_is_useless {
            self.build_scratch = straddlers;
            self.nodes[node_idx].is_leaf = true;
            return;
        }

        // Rearrange the span: straddlers first, then each child in octant
        // order
        let mut current = first_element;
        for elem_idx in &straddlers {
            self.element_indices[current] = *elem_idx;
            current += 1;
        }

        let mut child_starts = [0usize; 8];
        for j in 0..8 {
            child_starts[j] = current;
            for elem_idx in &child_elements[j] {
                self.element_indices[current] = *elem_idx;
                current += 1;
            }
        }

        self.build_scratch = straddlers;

        {
            let node = &mut self.nodes[node_idx];
            node.is_leaf = false;
            node.num_straddlers = num_straddlers;
        }

        for j in 0..8 {
            if child_elements[j].is_empty() {
                continue;
            }

            let child_idx = self.create_node();
            self.nodes[node_idx].children[j] = child_idx;

            let child_aabb = if self.split_policy.tight_children {
                self.tight_child_aabb(&child_elements[j], self.split_policy.epsilon)
            } else {
                octant_aabbs[j]
            };

            {
                let child = &mut self.nodes[child_idx];
                child.first_element = child_starts[j];
                child.num_elements = child_elements[j].len();
                child.aabb = child_aabb;
            }

            self.subdivide(child_idx, depth + 1);
        }
    }

    fn choose_split_point(&self, node_idx: NodeIndex) -> Point3f {
        let node = &self.nodes[node_idx];
        let fallback_center = node.aabb.get_center();

        match self.split_policy.split_point {
            SplitPoint::Center => return fallback_center,
            SplitPoint::Mean => {
                return self.compute_mean_center(node.first_element, node.num_elements, fallback_center)
            }
            SplitPoint::Median => {
                return self.compute_median_center(
                    node.first_element,
                    node.num_elements,
                    fallback_center,
                )
            }
        }
    }

    fn compute_mean_center(&self, first: usize, size: usize, fallback_center: Point3f) -> Point3f {
        if size == 0 {
            return fallback_center;
        }

        let mut acc = Vec3f::zeros();
        for i in 0..size {
            let elem_idx = self.element_indices[first + i];
            acc += self.element_boxes[elem_idx].get_center().coords;
        }

        return Point3f::from(acc / size as f32);
    }

    fn compute_median_center(&self, first: usize, size: usize, fallback_center: Point3f) -> Point3f {
        if size == 0 {
            return fallback_center;
        }

        let mut centers: Vec<Point3f> = (0..size)
            .map(|i| self.element_boxes[self.element_indices[first + i]].get_center())
            .collect();

        let median_idx = centers.len() / 2;
        let mut kth = |dim: usize| {
            centers.select_nth_unstable_by(median_idx, |a, b| {
                return a[dim].partial_cmp(&b[dim]).unwrap();
            });
            return centers[median_idx][dim];
        };

        return Point3f::new(kth(0), kth(1), kth(2));
    }

    fn tight_child_aabb(&self, elements: &[usize], epsilon: f32) -> Box3 {
        let mut tight = Box3::empty();
        for elem_idx in elements {
            tight.union_box3(&self.element_boxes[*elem_idx]);
        }

        if epsilon > 0.0 && !tight.is_empty() {
            let padding = Vec3f::new(epsilon, epsilon, epsilon);
            tight = Box3::new(tight.get_min() - padding, tight.get_max() + padding);
        }

        return tight;
    }

    fn validate_node(&self, node_idx: NodeIndex) -> bool {
        let node = &self.nodes[node_idx];
        if node.first_element > self.element_indices.len() {
            return false;
        }
        if node.first_element + node.num_elements > self.element_indices.len() {
            return false;
        }

        if node.is_leaf {
            return node.num_straddlers == 0;
        }

        let mut accumulated = node.first_element + node.num_straddlers;
        let mut child_total = 0;
        for child_idx in node.children {
            if child_idx == INVALID_NODE_INDEX {
                continue;
            }

            let child = &self.nodes[child_idx];
            if child.first_element != accumulated {
                return false;
            }
            if child.num_elements == 0 {
                return false;
            }
            if child.first_element + child.num_elements > node.first_element + node.num_elements {
                return false;
            }
            if !self.validate_node(child_idx) {
                return false;
            }

            accumulated += child.num_elements;
            child_total += child.num_elements;
        }

        return accumulated == node.first_element + node.num_elements
            && child_total + node.num_straddlers == node.num_elements;
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    fn policies() -> [SplitPolicy; 6] {
        let mut all = [SplitPolicy::default(); 6];
        let mut idx = 0;
        for split_point in [SplitPoint::Center, SplitPoint::Mean, SplitPoint::Median] {
            for tight in [false, true] {
                all[idx] = SplitPolicy {
                    split_point,
                    tight_children: tight,
                    epsilon: if tight { 1e-4 } else { 0.0 },
                };
                idx += 1;
            }
        }
        return all;
    }

    fn cube_at(center: Point3f, half: f32) -> Box3 {
        let half = Vec3f::new(half, half, half);
        return Box3::new(center - half, center + half);
    }

    fn lattice_cubes() -> Vec<Box3> {
        let mut boxes = Vec::new();
        for x in 0..3 {
            for y in 0..3 {
                for z in 0..3 {
                    boxes.push(cube_at(Point3f::new(x as f32, y as f32, z as f32), 0.5));
                }
            }
        }
        return boxes;
    }

    fn random_boxes(count: usize, rng: &mut StdRng) -> Vec<Box3> {
        return (0..count)
            .map(|_| {
                let center = Point3f::new(
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                );
                let half = Vec3f::new(
                    rng.gen_range(0.05..1.5),
                    rng.gen_range(0.05..1.5),
                    rng.gen_range(0.05..1.5),
                );
                Box3::new(center - half, center + half)
            })
            .collect();
    }

    fn brute_force_box3(boxes: &[Box3], query: &Box3) -> Vec<usize> {
        return (0..boxes.len())
            .filter(|i| boxes[*i].intersects_box3(query))
            .collect();
    }

    fn brute_force_sphere3(boxes: &[Box3], query: &Sphere3) -> Vec<usize> {
        return (0..boxes.len())
            .filter(|i| boxes[*i].intersects_sphere3(query))
            .collect();
    }

    fn brute_force_knn(boxes: &[Box3], query: &Point3f, k: usize) -> Vec<usize> {
        let mut distances: Vec<(f32, usize)> = (0..boxes.len())
            .map(|i| (boxes[i].squared_distance(query), i))
            .collect();
        distances.sort_by(|a, b| a.partial_cmp(b).unwrap());
        distances.truncate(k);
        return distances.into_iter().map(|(_, i)| i).collect();
    }

    #[test]
    fn lattice_box_query_matches_brute_force() {
        let boxes = lattice_cubes();

        let mut tree = Octree::new();
        assert!(tree.build(&boxes, SplitPolicy::default(), 4, 8));
        assert!(tree.validate_structure());

        let query = Box3::new(Point3f::new(0.4, 0.4, 0.4), Point3f::new(0.6, 0.6, 0.6));
        let mut result = Vec::new();
        tree.query_box3(&query, &mut result);
        result.sort_unstable();

        assert_eq!(result, brute_force_box3(&boxes, &query));
    }

    #[test]
    fn knn_over_disjoint_cubes_on_an_axis() {
        let boxes: Vec<Box3> = (0..5)
            .map(|i| cube_at(Point3f::new(4.0 * i as f32, 0.0, 0.0), 0.5))
            .collect();

        let mut tree = Octree::new();
        assert!(tree.build(&boxes, SplitPolicy::default(), 1, 8));

        let mut result = Vec::new();
        tree.query_knn(&Point3f::new(9.0, 0.0, 0.0), 2, &mut result);

        // Nearest faces at x=8.5 and x=11.5: squared distances 0.25 and 6.25
        assert_eq!(result, vec![2, 3]);

        assert_eq!(tree.query_nearest(&Point3f::new(9.0, 0.0, 0.0)), Some(2));
    }

    #[test]
    fn empty_build_leaves_queryable_tree() {
        let mut tree = Octree::new();
        assert!(!tree.build(&[], SplitPolicy::default(), 8, 8));
        assert!(tree.validate_structure());

        let mut result = vec![7];
        tree.query_box3(&cube_at(Point3f::origin(), 1.0), &mut result);
        assert!(result.is_empty());

        tree.query_sphere3(&Sphere3::new(Point3f::origin(), 1.0), &mut result);
        assert!(result.is_empty());

        tree.query_knn(&Point3f::origin(), 4, &mut result);
        assert!(result.is_empty());

        assert_eq!(tree.query_nearest(&Point3f::origin()), None);
    }

    #[test]
    fn all_policies_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(1337);
        let boxes = random_boxes(200, &mut rng);

        for policy in policies() {
            let mut tree = Octree::new();
            assert!(tree.build(&boxes, policy, 8, 12));
            assert!(tree.validate_structure());

            let mut result = Vec::new();
            for _ in 0..24 {
                let center = Point3f::new(
                    rng.gen_range(-12.0..12.0),
                    rng.gen_range(-12.0..12.0),
                    rng.gen_range(-12.0..12.0),
                );
                let half = Vec3f::new(
                    rng.gen_range(0.05..5.0),
                    rng.gen_range(0.05..5.0),
                    rng.gen_range(0.05..5.0),
                );
                let query = Box3::new(center - half, center + half);

                tree.query_box3(&query, &mut result);
                result.sort_unstable();
                assert_eq!(result, brute_force_box3(&boxes, &query));

                let sphere = Sphere3::new(center, rng.gen_range(0.05..5.0));
                tree.query_sphere3(&sphere, &mut result);
                result.sort_unstable();
                assert_eq!(result, brute_force_sphere3(&boxes, &sphere));
            }
        }
    }

    #[test]
    fn knn_and_nearest_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(99);
        let boxes = random_boxes(150, &mut rng);

        for policy in policies() {
            let mut tree = Octree::new();
            assert!(tree.build(&boxes, policy, 8, 12));

            let mut result = Vec::new();
            for _ in 0..24 {
                let query = Point3f::new(
                    rng.gen_range(-12.0..12.0),
                    rng.gen_range(-12.0..12.0),
                    rng.gen_range(-12.0..12.0),
                );

                let k = rng.gen_range(1..12);
                tree.query_knn(&query, k, &mut result);

                let expected = brute_force_knn(&boxes, &query, k);
                assert_eq!(result.len(), expected.len());

                // Distances must agree even when equidistant boxes swap order
                for (actual, wanted) in result.iter().zip(expected.iter()) {
                    let actual_dist = boxes[*actual].squared_distance(&query);
                    let wanted_dist = boxes[*wanted].squared_distance(&query);
                    assert_eq!(actual_dist, wanted_dist);
                }

                let nearest = tree.query_nearest(&query);
                assert_eq!(
                    nearest.map(|i| boxes[i].squared_distance(&query)),
                    expected.first().map(|i| boxes[*i].squared_distance(&query))
                );
            }
        }
    }

    #[test]
    fn query_containing_everything_returns_all_elements() {
        let mut rng = StdRng::seed_from_u64(3);
        let boxes = random_boxes(64, &mut rng);

        let mut tree = Octree::new();
        assert!(tree.build(&boxes, SplitPolicy::default(), 4, 10));

        let everything = cube_at(Point3f::origin(), 100.0);
        let mut result = Vec::new();
        tree.query_box3(&everything, &mut result);
        result.sort_unstable();

        assert_eq!(result, (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn point_elements_are_assigned_by_octant() {
        let mut rng = StdRng::seed_from_u64(21);
        let points: Vec<Box3> = (0..120)
            .map(|_| {
                let p = Point3f::new(
                    rng.gen_range(-5.0..5.0),
                    rng.gen_range(-5.0..5.0),
                    rng.gen_range(-5.0..5.0),
                );
                Box3::new(p, p)
            })
            .collect();

        let mut tree = Octree::new();
        assert!(tree.build(&points, SplitPolicy::default(), 4, 10));
        assert!(tree.validate_structure());

        // Point elements never straddle
        for node in tree.nodes() {
            assert_eq!(node.num_straddlers(), 0);
        }

        let mut indices = tree.element_indices().to_vec();
        indices.sort_unstable();
        assert_eq!(indices, (0..120).collect::<Vec<_>>());
    }

    #[test]
    fn straddlers_sit_on_internal_nodes() {
        // Cubes centered on the lattice straddle the center split planes
        let boxes = lattice_cubes();

        let mut tree = Octree::new();
        assert!(tree.build(&boxes, SplitPolicy::default(), 4, 8));
        assert!(tree.validate_structure());

        let has_straddlers = tree.nodes().iter().any(|node| node.num_straddlers() > 0);
        assert!(has_straddlers);

        // Tight children push everything down instead
        let mut tight_tree = Octree::new();
        let tight_policy = SplitPolicy {
            split_point: SplitPoint::Center,
            tight_children: true,
            epsilon: 1e-4,
        };
        assert!(tight_tree.build(&boxes, tight_policy, 4, 8));
        assert!(tight_tree.validate_structure());

        for node in tight_tree.nodes() {
            assert_eq!(node.num_straddlers(), 0);
        }
    }

    #[test]
    fn identical_boxes_stop_subdividing() {
        let boxes = vec![cube_at(Point3f::new(1.0, 1.0, 1.0), 0.5); 50];

        let mut tree = Octree::new();
        assert!(tree.build(&boxes, SplitPolicy::default(), 4, 10));
        assert!(tree.validate_structure());

        let mut result = Vec::new();
        tree.query_box3(&cube_at(Point3f::new(1.0, 1.0, 1.0), 0.1), &mut result);
        assert_eq!(result.len(), 50);
    }

    #[test]
    fn node_properties_follow_node_creation() {
        let boxes = lattice_cubes();

        let mut tree = Octree::new();
        assert!(tree.build(&boxes, SplitPolicy::default(), 4, 8));

        let depths = tree.add_node_property::<u8>("n:depth", 0).unwrap();
        assert_eq!(tree.node_property_values(&depths).len(), tree.nodes().len());
        assert!(tree.has_node_property("n:depth"));
    }
}
