/// Fixed-capacity max-heap that retains the `k` smallest items pushed into
/// it. `top()` is the current worst retained item, which makes it a natural
/// pruning threshold for best-first searches.
#[derive(Debug, Clone)]
pub struct BoundedHeap<T> {
    capacity: usize,
    data: Vec<T>,
}

impl<T: PartialOrd + Clone> BoundedHeap<T> {
    pub fn new(capacity: usize) -> Self {
        return Self {
            capacity,
            data: Vec::with_capacity(capacity),
        };
    }

    /// Adds an item; ignored when the heap is full and the item is not
    /// better than the current worst. Zero capacity discards everything.
    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }

        if self.data.len() < self.capacity {
            self.data.push(item);
            self.sift_up(self.data.len() - 1);
        } else if item < self.data[0] {
            self.data[0] = item;
            self.sift_down(0);
        }
    }

    /// Current worst (largest) retained item
    #[inline]
    pub fn top(&self) -> Option<&T> {
        return self.data.first();
    }

    #[inline]
    pub fn len(&self) -> usize {
        return self.data.len();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        return self.data.is_empty();
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        return self.capacity;
    }

    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Contents in ascending order; the heap itself is left untouched
    pub fn sorted(&self) -> Vec<T> {
        let mut out = self.data.clone();
        out.sort_by(|a, b| a.partial_cmp(b).unwrap());
        return out;
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.data[index] > self.data[parent] {
                self.data.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut largest = index;

            if left < self.data.len() && self.data[left] > self.data[largest] {
                largest = left;
            }
            if right < self.data.len() && self.data[right] > self.data[largest] {
                largest = right;
            }

            if largest == index {
                return;
            }

            self.data.swap(index, largest);
            index = largest;
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    #[test]
    fn keeps_the_smallest_items() {
        let mut heap = BoundedHeap::new(3);

        for (i, value) in [5, 1, 4, 2, 3].into_iter().enumerate() {
            heap.push(value);
            assert_eq!(heap.len(), (i + 1).min(3));
        }

        assert_eq!(heap.sorted(), vec![1, 2, 3]);
        assert_eq!(heap.top(), Some(&3));

        // Extraction does not disturb the heap
        assert_eq!(heap.sorted(), vec![1, 2, 3]);
        assert_eq!(heap.len(), 3);
    }

    #[test]
    fn zero_capacity_discards_pushes() {
        let mut heap = BoundedHeap::new(0);
        heap.push(1);
        heap.push(2);

        assert_eq!(heap.len(), 0);
        assert!(heap.is_empty());
        assert_eq!(heap.top(), None);
    }

    #[test]
    fn ties_break_on_payload() {
        let mut heap = BoundedHeap::new(2);
        heap.push((1.0f32, 7usize));
        heap.push((1.0f32, 3usize));
        heap.push((1.0f32, 5usize));

        assert_eq!(heap.sorted(), vec![(1.0, 3), (1.0, 5)]);
    }

    #[test]
    fn matches_full_sort_on_random_input() {
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..20 {
            let values: Vec<(f32, usize)> = (0..100)
                .map(|i| (rng.gen_range(0.0..100.0f32), i))
                .collect();

            let mut heap = BoundedHeap::new(8);
            for value in &values {
                heap.push(*value);
            }

            let mut expected = values.clone();
            expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
            expected.truncate(8);

            assert_eq!(heap.sorted(), expected);
        }
    }
}
