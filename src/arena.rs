use bumpalo::Bump;

/// Bump arena backing the transient syntax data of one input: tokens and
/// AST nodes are allocated here and reclaimed en bloc by `reset`.
pub struct Arena {
    bump: Bump,
}

impl Arena {
    pub fn new() -> Self {
        Arena { bump: Bump::new() }
    }

    /// Pre-sizes the backing storage. The arena still grows on demand.
    pub fn with_capacity(bytes: usize) -> Self {
        Arena {
            bump: Bump::with_capacity(bytes),
        }
    }

    pub fn alloc<T>(&self, value: T) -> &T {
        self.bump.alloc(value)
    }

    pub fn alloc_str(&self, value: &str) -> &str {
        self.bump.alloc_str(value)
    }

    pub fn alloc_slice<T, I>(&self, items: I) -> &[T]
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        self.bump.alloc_slice_fill_iter(items)
    }

    /// The raw bump allocator, for arena-backed growable vectors.
    pub fn bump(&self) -> &Bump {
        &self.bump
    }

    /// Resets the arena, invalidating all references but keeping allocated
    /// capacity. This lets the REPL and file runner reuse memory between
    /// statements.
    pub fn reset(&mut self) {
        self.bump.reset();
    }

    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}
