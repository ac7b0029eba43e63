//! Typed flat-array storage contract.
//!
//! A genome's segment arrays and packed base array live behind `ArrayStore`,
//! the abstraction a persistent backend must satisfy. The on-disk byte layout
//! is the backend's business; this crate only requires random get/set/resize.
//! `MemoryStore` is the reference backend used by builds and tests.

/// Random-access typed array, the unit of storage a backend provides.
///
/// Implementations are expected to be cheap to read; every navigation
/// operation in this crate bottoms out in `get` calls.
pub trait ArrayStore<T>: Send + Sync {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<&T>;

    fn get_mut(&mut self, index: usize) -> Option<&mut T>;

    /// Overwrites one element; returns false if the index is out of bounds.
    fn set(&mut self, index: usize, value: T) -> bool;

    /// Grows or shrinks the array, default-filling new elements.
    fn resize(&mut self, new_len: usize);
}

/// Vec-backed reference implementation of `ArrayStore`.
#[derive(Debug, Default)]
pub struct MemoryStore<T> {
    data: Vec<T>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        MemoryStore { data: Vec::new() }
    }
}

impl<T: Clone + Default + Send + Sync> ArrayStore<T> for MemoryStore<T> {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn get(&self, index: usize) -> Option<&T> {
        self.data.get(index)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.data.get_mut(index)
    }

    fn set(&mut self, index: usize, value: T) -> bool {
        match self.data.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    fn resize(&mut self, new_len: usize) {
        self.data.resize(new_len, T::default());
    }
}

/// Scoped handle over a backend array.
///
/// Owned by a `Genome` and released with it, so the backend resource lives
/// exactly as long as the genome that acquired it.
pub struct ArrayHandle<T> {
    store: Box<dyn ArrayStore<T>>,
}

impl<T: Clone + Default + Send + Sync + 'static> ArrayHandle<T> {
    /// Opens a handle over the in-memory reference backend.
    pub fn in_memory() -> Self {
        ArrayHandle {
            store: Box::new(MemoryStore::new()),
        }
    }
}

impl<T> ArrayHandle<T> {
    /// Opens a handle over an externally provided backend array.
    pub fn from_store(store: Box<dyn ArrayStore<T>>) -> Self {
        ArrayHandle { store }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.store.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.store.get_mut(index)
    }

    pub fn set(&mut self, index: usize, value: T) -> bool {
        self.store.set(index, value)
    }

    pub fn resize(&mut self, new_len: usize) {
        self.store.resize(new_len);
    }
}

impl<T> std::fmt::Debug for ArrayHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayHandle").field("len", &self.len()).finish()
    }
}
