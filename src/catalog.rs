//! Genome-tree catalog contract.
//!
//! The catalog is an external collaborator: it resolves a genome name to its
//! parent, ordered children, and array dimensions. An `Alignment` consumes it
//! exactly once, at open time, the way an index loader consumes its metadata
//! tables.

/// Dimensions and linkage of one genome, as recorded by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomeDimensions {
    pub name: String,
    pub parent: Option<String>,
    /// Ordered (name, length) sequence table.
    pub sequences: Vec<(String, u64)>,
    pub num_top_segments: usize,
    pub num_bottom_segments: usize,
}

/// Read-only view of the genome-tree metadata.
pub trait GenomeCatalog {
    /// All genome names, parents listed before their children.
    fn names(&self) -> Vec<String>;

    fn lookup(&self, name: &str) -> Option<GenomeDimensions>;
}

/// In-memory catalog, filled by build tooling or tests.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    entries: Vec<GenomeDimensions>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        StaticCatalog { entries: Vec::new() }
    }

    pub fn push(&mut self, dimensions: GenomeDimensions) {
        self.entries.push(dimensions);
    }
}

impl GenomeCatalog for StaticCatalog {
    fn names(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.name.clone()).collect()
    }

    fn lookup(&self, name: &str) -> Option<GenomeDimensions> {
        self.entries.iter().find(|entry| entry.name == name).cloned()
    }
}
