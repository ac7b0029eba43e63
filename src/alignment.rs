//! The alignment arena: the rooted tree of genomes and cursor construction.

use std::collections::HashMap;

use crate::catalog::GenomeCatalog;
use crate::error::{HalError, HalResult};
use crate::genome::{Genome, GenomeId};
use crate::segment_iterator::{BottomSegmentIterator, TopSegmentIterator};

/// A rooted tree of genomes connected by homology.
///
/// Genomes are arena-allocated; (genome id, array index) is the only durable
/// identity in the system, and every cursor is a cheap value borrowing this
/// arena.
#[derive(Debug, Default)]
pub struct Alignment {
    genomes: Vec<Genome>,
    by_name: HashMap<String, GenomeId>,
    root: Option<GenomeId>,
}

impl Alignment {
    pub fn new() -> Self {
        Alignment::default()
    }

    /// Opens an alignment from the tree catalog: builds the genome tree,
    /// then sizes every genome's arrays. The catalog is not consulted again.
    pub fn open(catalog: &dyn GenomeCatalog) -> HalResult<Self> {
        let mut alignment = Alignment::new();
        let names = catalog.names();
        for name in &names {
            let dimensions = catalog.lookup(name).ok_or_else(|| HalError::CorruptTopology {
                genome: name.clone(),
                reason: "listed by the catalog but not resolvable".to_string(),
            })?;
            alignment.add_genome(name, dimensions.parent.as_deref())?;
        }
        // Arrays are sized after the whole tree is known so bottom records
        // get one child slot per child genome.
        for name in &names {
            let dimensions = catalog.lookup(name).ok_or_else(|| HalError::CorruptTopology {
                genome: name.clone(),
                reason: "listed by the catalog but not resolvable".to_string(),
            })?;
            let id = alignment.by_name[name.as_str()];
            let genome = &mut alignment.genomes[id];
            for (sequence_name, length) in &dimensions.sequences {
                genome.add_sequence(sequence_name, *length)?;
            }
            genome.allocate_top_segments(dimensions.num_top_segments);
            genome.allocate_bottom_segments(dimensions.num_bottom_segments);
        }
        log::info!("opened alignment with {} genomes", alignment.genomes.len());
        Ok(alignment)
    }

    /// Adds a genome to the tree. Parents must be added before children;
    /// exactly one genome may be parentless (the root).
    pub fn add_genome(&mut self, name: &str, parent: Option<&str>) -> HalResult<GenomeId> {
        if self.by_name.contains_key(name) {
            return Err(HalError::CorruptTopology {
                genome: name.to_string(),
                reason: "duplicate genome name".to_string(),
            });
        }
        let parent_id = match parent {
            Some(parent_name) => Some(self.genome_id(parent_name).ok_or_else(|| {
                HalError::CorruptTopology {
                    genome: name.to_string(),
                    reason: format!("parent genome '{parent_name}' not found"),
                }
            })?),
            None => {
                if let Some(root) = self.root {
                    return Err(HalError::CorruptTopology {
                        genome: name.to_string(),
                        reason: format!(
                            "second parentless genome (root is '{}')",
                            self.genomes[root].name()
                        ),
                    });
                }
                None
            }
        };
        let id = self.genomes.len();
        self.genomes.push(Genome::new(id, name.to_string(), parent_id));
        self.by_name.insert(name.to_string(), id);
        match parent_id {
            Some(parent_id) => self.genomes[parent_id].add_child(id),
            None => self.root = Some(id),
        }
        log::debug!("added genome '{name}' (id {id}, parent {parent_id:?})");
        Ok(id)
    }

    pub fn num_genomes(&self) -> usize {
        self.genomes.len()
    }

    pub fn root(&self) -> Option<GenomeId> {
        self.root
    }

    pub fn genome(&self, id: GenomeId) -> &Genome {
        &self.genomes[id]
    }

    pub fn genome_mut(&mut self, id: GenomeId) -> &mut Genome {
        &mut self.genomes[id]
    }

    pub fn genome_id(&self, name: &str) -> Option<GenomeId> {
        self.by_name.get(name).copied()
    }

    pub fn genome_by_name(&self, name: &str) -> Option<&Genome> {
        self.genome_id(name).map(|id| &self.genomes[id])
    }

    pub fn genomes(&self) -> impl Iterator<Item = &Genome> {
        self.genomes.iter()
    }

    /// Top-segment cursor at an array index.
    pub fn top_iterator(&self, genome: GenomeId, index: usize) -> HalResult<TopSegmentIterator<'_>> {
        TopSegmentIterator::new(self, genome, index)
    }

    /// Top-segment cursor positioned at the run overlapping a genome position.
    pub fn top_iterator_at(
        &self,
        genome: GenomeId,
        position: u64,
    ) -> HalResult<TopSegmentIterator<'_>> {
        let index = self.genome(genome).top_index_at(position)?;
        TopSegmentIterator::new(self, genome, index)
    }

    /// Bottom-segment cursor at an array index.
    pub fn bottom_iterator(
        &self,
        genome: GenomeId,
        index: usize,
    ) -> HalResult<BottomSegmentIterator<'_>> {
        BottomSegmentIterator::new(self, genome, index)
    }

    /// Bottom-segment cursor positioned at the run overlapping a genome
    /// position.
    pub fn bottom_iterator_at(
        &self,
        genome: GenomeId,
        position: u64,
    ) -> HalResult<BottomSegmentIterator<'_>> {
        let index = self.genome(genome).bottom_index_at(position)?;
        BottomSegmentIterator::new(self, genome, index)
    }
}
