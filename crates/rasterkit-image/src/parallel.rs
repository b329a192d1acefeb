use rayon::prelude::*;

use crate::error::ImageError;

/// Controls how bulk operations over a [`PixelArray`] are executed.
///
/// Every bulk call partitions the index range into as many contiguous chunks
/// as there are workers and joins before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parallelism {
    /// Use the global Rayon thread pool with one chunk per Rayon thread.
    #[default]
    Auto,

    /// Run on a local thread pool with `n` threads and `n` chunks.
    ///
    /// # Warning
    /// Creates a new thread pool on every call. A count of zero is treated as one.
    Workers(usize),

    /// Run sequentially on the current thread.
    ///
    /// Useful for tests and for callbacks that depend on evaluation order.
    Serial,
}

impl Parallelism {
    /// The number of chunks a bulk operation is split into.
    pub fn num_workers(&self) -> usize {
        match self {
            Parallelism::Auto => rayon::current_num_threads().max(1),
            Parallelism::Workers(n) => (*n).max(1),
            Parallelism::Serial => 1,
        }
    }

    /// Length of each contiguous chunk for an array of `len` elements.
    ///
    /// The last chunk takes whatever remains.
    pub fn chunk_len(&self, len: usize) -> usize {
        len.div_ceil(self.num_workers()).max(1)
    }

    /// Run `op` inside the thread pool selected by this strategy.
    pub fn install<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match self {
            Parallelism::Workers(n) => {
                match rayon::ThreadPoolBuilder::new().num_threads((*n).max(1)).build() {
                    Ok(pool) => pool.install(op),
                    Err(e) => {
                        log::warn!("failed to build a pool of {n} workers, using the global pool: {e}");
                        op()
                    }
                }
            }
            _ => op(),
        }
    }
}

/// A flat, fixed-length container with parallel bulk operations.
///
/// The array carries its own [`Parallelism`] so callers decide once how bulk
/// work is scheduled. Results of [`PixelArray::map`] are always assembled in
/// index order, whatever the worker completion order.
///
/// # Examples
///
/// ```
/// use rasterkit_image::{Parallelism, PixelArray};
///
/// let a = PixelArray::from_vec(vec![1, 2, 3, 4]).with_parallelism(Parallelism::Workers(2));
/// let b = a.map(|v, i| v * 10 + i as i32);
/// assert_eq!(b.as_slice(), &[10, 21, 32, 43]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PixelArray<T> {
    data: Vec<T>,
    parallelism: Parallelism,
}

impl<T> PixelArray<T> {
    /// Wrap an existing vector using the default parallelism.
    pub fn from_vec(data: Vec<T>) -> Self {
        Self {
            data,
            parallelism: Parallelism::default(),
        }
    }

    /// Create an array of `len` copies of `value`.
    pub fn from_elem(len: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::from_vec(vec![value; len])
    }

    /// Replace the parallelism used by bulk operations.
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// The parallelism used by bulk operations.
    pub fn parallelism(&self) -> Parallelism {
        self.parallelism
    }

    /// Set the parallelism used by bulk operations.
    pub fn set_parallelism(&mut self, parallelism: Parallelism) {
        self.parallelism = parallelism;
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow the element at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.data.get(index)
    }

    /// Mutably borrow the element at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.data.get_mut(index)
    }

    /// The elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The elements as a mutable slice.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the array and return its elements.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Iterate the elements in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Apply `f` to every element in index order on the calling thread.
    ///
    /// Use this instead of [`PixelArray::for_each`] whenever `f` mutates shared
    /// state such as running statistics.
    pub fn for_each_sync<F>(&self, mut f: F)
    where
        F: FnMut(&T, usize),
    {
        self.data.iter().enumerate().for_each(|(i, v)| f(v, i));
    }
}

impl<T: Send + Sync> PixelArray<T> {
    /// Return a new array where element `i` is `f(&self[i], i)`.
    ///
    /// The index range is split into contiguous chunks, one per worker, and the
    /// per-chunk results are concatenated in index order.
    pub fn map<U, F>(&self, f: F) -> PixelArray<U>
    where
        U: Send,
        F: Fn(&T, usize) -> U + Send + Sync,
    {
        let parallelism = self.parallelism;
        if self.data.is_empty() {
            return PixelArray::from_vec(Vec::new()).with_parallelism(parallelism);
        }

        let data = match parallelism {
            Parallelism::Serial => self.data.iter().enumerate().map(|(i, v)| f(v, i)).collect(),
            _ => {
                let chunk = parallelism.chunk_len(self.data.len());
                let f = &f;
                let chunks: Vec<Vec<U>> = parallelism.install(|| {
                    self.data
                        .par_chunks(chunk)
                        .enumerate()
                        .map(|(c, values)| {
                            let base = c * chunk;
                            values
                                .iter()
                                .enumerate()
                                .map(|(j, v)| f(v, base + j))
                                .collect()
                        })
                        .collect()
                });
                chunks.into_iter().flatten().collect()
            }
        };

        PixelArray::from_vec(data).with_parallelism(parallelism)
    }

    /// Replace every element with `f(&self[i], i)` without allocating.
    pub fn map_in_place<F>(&mut self, f: F)
    where
        F: Fn(&T, usize) -> T + Send + Sync,
    {
        if self.data.is_empty() {
            return;
        }
        self.for_each_chunk_mut(|base, values| {
            for (j, v) in values.iter_mut().enumerate() {
                *v = f(v, base + j);
            }
        });
    }

    /// Apply `f` to every element for its side effects.
    ///
    /// Chunks run concurrently without a defined order between them, so `f`
    /// must only touch thread safe state.
    pub fn for_each<F>(&self, f: F)
    where
        F: Fn(&T, usize) + Send + Sync,
    {
        if self.data.is_empty() {
            return;
        }
        match self.parallelism {
            Parallelism::Serial => self.for_each_sync(f),
            parallelism => {
                let chunk = parallelism.chunk_len(self.data.len());
                let f = &f;
                parallelism.install(|| {
                    self.data.par_chunks(chunk).enumerate().for_each(|(c, values)| {
                        values
                            .iter()
                            .enumerate()
                            .for_each(|(j, v)| f(v, c * chunk + j));
                    })
                });
            }
        }
    }

    /// Run `f(base_index, chunk)` over disjoint mutable chunks.
    pub fn for_each_chunk_mut<F>(&mut self, f: F)
    where
        F: Fn(usize, &mut [T]) + Send + Sync,
    {
        if self.data.is_empty() {
            return;
        }
        let parallelism = self.parallelism;
        let chunk = parallelism.chunk_len(self.data.len());
        self.for_each_block_mut(chunk, |c, values| f(c * chunk, values));
    }

    /// Run `f(block_index, block)` over consecutive blocks of `block_len`
    /// elements, for instance image rows.
    ///
    /// Each block is written by exactly one worker.
    pub fn for_each_block_mut<F>(&mut self, block_len: usize, f: F)
    where
        F: Fn(usize, &mut [T]) + Send + Sync,
    {
        if self.data.is_empty() || block_len == 0 {
            return;
        }
        match self.parallelism {
            Parallelism::Serial => self
                .data
                .chunks_mut(block_len)
                .enumerate()
                .for_each(|(i, block)| f(i, block)),
            parallelism => {
                let data = &mut self.data;
                let f = &f;
                parallelism.install(|| {
                    data.par_chunks_mut(block_len)
                        .enumerate()
                        .for_each(|(i, block)| f(i, block))
                });
            }
        }
    }

    /// Combine two equal-length arrays elementwise into `f(&a[i], &b[i])`.
    ///
    /// The result uses the parallelism of `a`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::SizeMismatch`] if the lengths differ.
    pub fn binary_op<S, U, F>(a: &PixelArray<T>, b: &PixelArray<S>, f: F) -> Result<PixelArray<U>, ImageError>
    where
        S: Send + Sync,
        U: Send,
        F: Fn(&T, &S) -> U + Send + Sync,
    {
        if a.len() != b.len() {
            return Err(ImageError::SizeMismatch(a.len(), b.len()));
        }
        let other = b.as_slice();
        Ok(a.map(|v, i| f(v, &other[i])))
    }
}

impl<T> std::ops::Index<usize> for PixelArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.data[index]
    }
}

impl<T> std::ops::IndexMut<usize> for PixelArray<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.data[index]
    }
}

impl<T> From<Vec<T>> for PixelArray<T> {
    fn from(data: Vec<T>) -> Self {
        Self::from_vec(data)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn map_keeps_index_order() {
        let data: Vec<usize> = (0..1003).collect();
        for parallelism in [Parallelism::Serial, Parallelism::Workers(3), Parallelism::Auto] {
            let array = PixelArray::from_vec(data.clone()).with_parallelism(parallelism);
            let out = array.map(|v, i| v + i);
            let expected: Vec<usize> = (0..1003).map(|i| 2 * i).collect();
            assert_eq!(out.as_slice(), expected.as_slice());
            assert_eq!(out.parallelism(), parallelism);
        }
    }

    #[test]
    fn chunking_covers_remainder() {
        let p = Parallelism::Workers(4);
        assert_eq!(p.chunk_len(10), 3);
        assert_eq!(p.chunk_len(3), 1);
        assert_eq!(Parallelism::Serial.chunk_len(10), 10);
        assert_eq!(Parallelism::Workers(0).num_workers(), 1);
    }

    #[test]
    fn map_in_place() {
        let mut array = PixelArray::from_vec(vec![1u8; 17]).with_parallelism(Parallelism::Workers(4));
        array.map_in_place(|v, i| v + (i % 2) as u8);
        assert_eq!(array[0], 1);
        assert_eq!(array[1], 2);
        assert_eq!(array[16], 1);
    }

    #[test]
    fn for_each_visits_every_index_once() {
        let array = PixelArray::from_vec(vec![1usize; 100]).with_parallelism(Parallelism::Workers(3));
        let total = AtomicUsize::new(0);
        let indices = AtomicUsize::new(0);
        array.for_each(|v, i| {
            total.fetch_add(*v, Ordering::Relaxed);
            indices.fetch_add(i, Ordering::Relaxed);
        });
        assert_eq!(total.into_inner(), 100);
        assert_eq!(indices.into_inner(), 99 * 100 / 2);
    }

    #[test]
    fn for_each_sync_is_ordered() {
        let array = PixelArray::from_vec(vec![3, 1, 2]);
        let mut seen = Vec::new();
        array.for_each_sync(|v, i| seen.push((i, *v)));
        assert_eq!(seen, vec![(0, 3), (1, 1), (2, 2)]);
    }

    #[test]
    fn binary_op() -> Result<(), ImageError> {
        let a = PixelArray::from_vec(vec![1.0, 2.0, 3.0]);
        let b = PixelArray::from_vec(vec![4.0, 5.0, 6.0]);
        let c = PixelArray::binary_op(&a, &b, |x: &f64, y: &f64| x * y)?;
        assert_eq!(c.as_slice(), &[4.0, 10.0, 18.0]);

        let short = PixelArray::from_vec(vec![1.0]);
        assert_eq!(
            PixelArray::binary_op(&a, &short, |x: &f64, y: &f64| x + y),
            Err(ImageError::SizeMismatch(3, 1))
        );
        Ok(())
    }

    #[test]
    fn empty_short_circuits() {
        let array: PixelArray<u8> = PixelArray::from_vec(Vec::new());
        let out = array.map(|v, _| *v as u32);
        assert!(out.is_empty());
        array.for_each(|_, _| panic!("no element to visit"));
    }

    #[test]
    fn block_mut_rows() {
        let mut array = PixelArray::from_vec(vec![0usize; 12]).with_parallelism(Parallelism::Workers(2));
        array.for_each_block_mut(4, |row, values| values.iter_mut().for_each(|v| *v = row));
        assert_eq!(array.as_slice(), &[0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2]);
    }
}
