/// Configuration for a [`PathTree`](crate::PathTree).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of record slots reserved up front.
    pub initial_capacity: usize,
    /// Upper bound on bytes held by record slots and value buffers.
    ///
    /// Allocations that would cross it fail with
    /// [`Error::OutOfMemory`](crate::Error::OutOfMemory). `None` leaves only the system
    /// allocator as the limit.
    pub memory_limit: Option<usize>,
}

impl Config {
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_memory_limit(mut self, memory_limit: usize) -> Self {
        self.memory_limit = Some(memory_limit);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
            memory_limit: None,
        }
    }
}
