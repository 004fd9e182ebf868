//! Array-backed binary heap that records every sift swap.
//!
//! Parent/child relationships are index arithmetic over a dense `Vec`:
//! `parent(i) = (i - 1) / 2`, `left(i) = 2i + 1`, `right(i) = 2i + 2`.
//! Heap order may be violated inside a sift but holds after every recorded
//! swap has been applied in full.

use rand::Rng;

/// Values the gallery heap starts with.
pub const SEED_VALUES: [i64; 12] = [50, 30, 20, 15, 10, 8, 16, 4, 5, 6, 100, 300];

/// Orientation of the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum HeapType {
    /// Largest value at the root.
    #[default]
    Max,
    /// Smallest value at the root.
    Min,
}

impl HeapType {
    /// Whether `a` belongs above `b`.
    #[inline]
    pub fn promotes(self, a: i64, b: i64) -> bool {
        match self {
            HeapType::Max => a > b,
            HeapType::Min => a < b,
        }
    }
}

/// Index of the parent slot. The root has no parent.
#[inline]
pub const fn parent(i: usize) -> Option<usize> {
    if i == 0 {
        None
    } else {
        Some((i - 1) / 2)
    }
}

#[inline]
pub const fn left(i: usize) -> usize {
    2 * i + 1
}

#[inline]
pub const fn right(i: usize) -> usize {
    2 * i + 2
}

/// One comparison that ended in a swap.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SiftSwap {
    /// Slot the value moved out of
    pub from: usize,
    /// Slot the value moved into
    pub to: usize,
    /// Array after the swap
    pub snapshot: Vec<i64>,
}

/// Everything a single sift did.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sift {
    /// Slot the moving value started in
    pub placed: usize,
    /// Array before the first swap
    pub initial: Vec<i64>,
    pub swaps: Vec<SiftSwap>,
}

impl Sift {
    /// Slot where the moving value came to rest.
    pub fn settled(&self) -> usize {
        self.swaps.last().map_or(self.placed, |s| s.to)
    }
}

/// Result of [`Heap::remove_root`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Removed {
    pub root: i64,
    pub sift: Sift,
}

/// Binary heap over `i64` values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Heap {
    items: Vec<i64>,
    heap_type: HeapType,
}

impl Heap {
    pub fn new(heap_type: HeapType) -> Self {
        Self {
            items: Vec::new(),
            heap_type,
        }
    }

    /// Build a heap by inserting values in order.
    pub fn from_values<I: IntoIterator<Item = i64>>(heap_type: HeapType, values: I) -> Self {
        let mut heap = Self::new(heap_type);
        for value in values {
            heap.insert(value);
        }
        heap
    }

    /// A heap of 10 to 48 random values below 1000.
    pub fn random<R: Rng + ?Sized>(heap_type: HeapType, rng: &mut R) -> Self {
        let count = rng.gen_range(10..49);
        Self::from_values(heap_type, (0..count).map(|_| rng.gen_range(0..1000)))
    }

    pub fn heap_type(&self) -> HeapType {
        self.heap_type
    }

    /// Switch orientation, rebuilding the heap from its current values.
    pub fn set_heap_type(&mut self, heap_type: HeapType) {
        if heap_type == self.heap_type {
            return;
        }
        let values = std::mem::take(&mut self.items);
        self.heap_type = heap_type;
        for value in values {
            self.insert(value);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn peek(&self) -> Option<i64> {
        self.items.first().copied()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.items
    }

    /// Number of levels: `floor(log2(n)) + 1`, or 0 when empty.
    pub fn depth(&self) -> usize {
        match self.items.len() {
            0 => 0,
            n => n.ilog2() as usize + 1,
        }
    }

    /// Whether `a` belongs above `b` under this heap's orientation.
    pub fn compare(&self, a: i64, b: i64) -> bool {
        self.heap_type.promotes(a, b)
    }

    fn swap(&mut self, from: usize, to: usize, swaps: &mut Vec<SiftSwap>) {
        self.items.swap(from, to);
        swaps.push(SiftSwap {
            from,
            to,
            snapshot: self.items.clone(),
        });
    }

    /// Append `value` and sift it up.
    pub fn insert(&mut self, value: i64) -> Sift {
        self.items.push(value);
        let placed = self.items.len() - 1;
        let initial = self.items.clone();
        let mut swaps = Vec::new();

        let mut i = placed;
        while let Some(p) = parent(i) {
            if !self.compare(self.items[i], self.items[p]) {
                break;
            }
            self.swap(i, p, &mut swaps);
            i = p;
        }

        Sift {
            placed,
            initial,
            swaps,
        }
    }

    /// Remove the root: the last value moves to the root and sifts down.
    pub fn remove_root(&mut self) -> Option<Removed> {
        let last = self.items.pop()?;
        let root = if self.items.is_empty() {
            last
        } else {
            std::mem::replace(&mut self.items[0], last)
        };
        let initial = self.items.clone();
        let mut swaps = Vec::new();

        let mut i = 0;
        loop {
            let mut target = i;
            for child in [left(i), right(i)] {
                if child < self.items.len() && self.compare(self.items[child], self.items[target]) {
                    target = child;
                }
            }
            if target == i {
                break;
            }
            self.swap(i, target, &mut swaps);
            i = target;
        }

        Some(Removed {
            root,
            sift: Sift {
                placed: 0,
                initial,
                swaps,
            },
        })
    }

    /// Whether every parent/child pair is in heap order.
    pub fn is_valid(&self) -> bool {
        (1..self.items.len()).all(|i| match parent(i) {
            Some(p) => !self.compare(self.items[i], self.items[p]),
            None => true,
        })
    }
}
