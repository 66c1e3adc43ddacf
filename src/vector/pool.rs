//! Pooling for fixed-dimension vector buffers.

use std::sync::Mutex;

/// A pool of `Vec<f32>` buffers of a single dimension, used to avoid
/// allocator pressure in the search path.
pub struct VectorPool {
    dims: usize,
    buffers: Mutex<Vec<Vec<f32>>>,
}

impl VectorPool {
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            buffers: Mutex::new(Vec::new()),
        }
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Retrieves a zeroed buffer of the pool's dimension.
    pub fn get(&self) -> Vec<f32> {
        let mut buffers = self.buffers.lock().unwrap();
        match buffers.pop() {
            Some(mut v) => {
                v.fill(0.0);
                v
            }
            None => vec![0.0; self.dims],
        }
    }

    /// Returns a buffer to the pool. Wrong-sized buffers are dropped
    /// silently.
    pub fn put(&self, v: Vec<f32>) {
        if v.len() != self.dims {
            return;
        }
        self.buffers.lock().unwrap().push(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_correct_dimension() {
        let pool = VectorPool::new(8);
        assert_eq!(pool.get().len(), 8);
    }

    #[test]
    fn test_reused_buffer_is_zeroed() {
        let pool = VectorPool::new(4);
        let mut v = pool.get();
        v.copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
        pool.put(v);
        assert_eq!(pool.get(), vec![0.0; 4]);
    }

    #[test]
    fn test_wrong_size_put_is_noop() {
        let pool = VectorPool::new(4);
        pool.put(vec![1.0; 3]);
        assert!(pool.buffers.lock().unwrap().is_empty());
    }
}
