//! ferrous-hal: in-memory core of a hierarchical multiple-genome alignment
//! store.
//!
//! An alignment is a rooted tree of genomes. Each genome's DNA is tiled by
//! two complementary run arrays: top segments link up to the homologous run
//! in the parent genome (and sideways along paralogy cycles), bottom segments
//! link down to homologous runs in child genomes. Homology lookups are O(1)
//! index dereferences; there is no base-by-base alignment matrix.
//!
//! Navigation is done with cheap value cursors obtained from an
//! [`Alignment`]: [`TopSegmentIterator`] and [`BottomSegmentIterator`] for
//! the run arrays, [`SequenceIterator`] for the per-genome contig table, and
//! [`DnaIterator`] for raw bases. Invariant checking is an explicit pass in
//! [`validate`], run by build tooling before a genome is published for reads.

pub mod alignment;
pub mod catalog;
pub mod dna;
pub mod error;
pub mod genome;
pub mod segment;
pub mod segment_iterator;
pub mod sequence;
pub mod storage;
pub mod validate;

pub use alignment::Alignment;
pub use catalog::{GenomeCatalog, GenomeDimensions, StaticCatalog};
pub use dna::{complement, DnaIterator, PackedDna};
pub use error::{HalError, HalResult};
pub use genome::{Genome, GenomeId};
pub use segment::{BottomSegmentRecord, ChildLink, Segment, TopSegmentRecord};
pub use segment_iterator::{BottomSegmentIterator, TopSegmentIterator};
pub use sequence::{Sequence, SequenceIterator};
pub use storage::{ArrayHandle, ArrayStore, MemoryStore};
