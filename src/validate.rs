//! Opt-in topology validation.
//!
//! Mutation-time checking would slow bulk builds down, so none happens
//! there; build tooling runs this pass once before publishing a genome for
//! read access. Checks the mutual-consistency invariants across the three
//! linked arrays: tiling of the coordinate space, sequence boundaries,
//! parse symmetry, parent/child back-reference symmetry, paralogy-cycle
//! closure, and the root/leaf rules.

use rayon::prelude::*;

use crate::alignment::Alignment;
use crate::error::{HalError, HalResult};
use crate::genome::{Genome, GenomeId};

fn corrupt(genome: &Genome, reason: String) -> HalError {
    HalError::CorruptTopology {
        genome: genome.name().to_string(),
        reason,
    }
}

/// Validates every genome of the alignment, in parallel.
pub fn validate_alignment(alignment: &Alignment) -> HalResult<()> {
    let ids: Vec<GenomeId> = alignment.genomes().map(|genome| genome.id()).collect();
    ids.par_iter()
        .map(|&id| validate_genome(alignment, id))
        .collect::<HalResult<Vec<()>>>()?;
    log::info!("validated {} genomes", ids.len());
    Ok(())
}

/// Validates one genome against its neighbors in the tree.
pub fn validate_genome(alignment: &Alignment, id: GenomeId) -> HalResult<()> {
    let genome = alignment.genome(id);
    log::debug!("validating genome '{}'", genome.name());
    check_sequence_table(genome)?;
    check_tiling(genome)?;
    check_parse_symmetry(genome)?;
    check_parent_edges(alignment, genome)?;
    check_child_edges(alignment, genome)?;
    check_paralogy_cycles(genome)?;
    Ok(())
}

/// Sequence table must be sorted, contiguous from 0, and sum to the base
/// array length.
fn check_sequence_table(genome: &Genome) -> HalResult<()> {
    let mut expected_start = 0u64;
    for sequence in genome.sequences() {
        if sequence.start_position() != expected_start {
            return Err(corrupt(
                genome,
                format!(
                    "sequence '{}' starts at {}, expected {expected_start}",
                    sequence.name(),
                    sequence.start_position()
                ),
            ));
        }
        expected_start += sequence.length();
    }
    if expected_start != genome.length() {
        return Err(corrupt(
            genome,
            format!(
                "sequence table covers {expected_start} bases but the base array holds {}",
                genome.length()
            ),
        ));
    }
    Ok(())
}

/// Both run arrays must tile [0, length) exactly, and no run may cross a
/// sequence boundary.
fn check_tiling(genome: &Genome) -> HalResult<()> {
    check_tiling_of(genome, "top", genome.num_top_segments(), |index| {
        let record = genome.top(index)?;
        Ok((record.start_position(), record.length()))
    })?;
    check_tiling_of(genome, "bottom", genome.num_bottom_segments(), |index| {
        let record = genome.bottom(index)?;
        Ok((record.start_position(), record.length()))
    })
}

fn check_tiling_of(
    genome: &Genome,
    kind: &str,
    count: usize,
    span_of: impl Fn(usize) -> HalResult<(u64, u64)>,
) -> HalResult<()> {
    if count == 0 {
        return Ok(());
    }
    let mut expected_start = 0u64;
    for index in 0..count {
        let (start, length) = span_of(index)?;
        if length == 0 {
            return Err(corrupt(genome, format!("{kind} segment {index} has zero length")));
        }
        if start != expected_start {
            return Err(corrupt(
                genome,
                format!("{kind} segment {index} starts at {start}, expected {expected_start} (gap or overlap)"),
            ));
        }
        let owner = genome.sequence_at(start)?;
        if !owner.contains(start + length - 1) {
            return Err(corrupt(
                genome,
                format!(
                    "{kind} segment {index} crosses the boundary of sequence '{}'",
                    owner.name()
                ),
            ));
        }
        expected_start += length;
    }
    if expected_start != genome.length() {
        return Err(corrupt(
            genome,
            format!(
                "{kind} segments cover {expected_start} bases but the genome holds {}",
                genome.length()
            ),
        ));
    }
    Ok(())
}

/// The top and bottom run covering the same start position must reference
/// each other, with correct intra-run offsets.
fn check_parse_symmetry(genome: &Genome) -> HalResult<()> {
    let num_top = genome.num_top_segments();
    let num_bottom = genome.num_bottom_segments();
    for index in 0..num_top {
        let top = genome.top(index)?;
        match top.bottom_parse_index() {
            None => {
                if num_bottom > 0 {
                    return Err(corrupt(
                        genome,
                        format!("top segment {index} lacks a parse-down link"),
                    ));
                }
            }
            Some(parse_index) => {
                let bottom = genome.bottom(parse_index).map_err(|_| {
                    corrupt(
                        genome,
                        format!("top segment {index} parse-down link {parse_index} is out of bounds"),
                    )
                })?;
                let offset = top.bottom_parse_offset();
                if bottom.start_position() + offset != top.start_position()
                    || offset >= bottom.length()
                {
                    return Err(corrupt(
                        genome,
                        format!("top segment {index} parse-down offset {offset} does not land on its start"),
                    ));
                }
            }
        }
    }
    for index in 0..num_bottom {
        let bottom = genome.bottom(index)?;
        match bottom.top_parse_index() {
            None => {
                if num_top > 0 {
                    return Err(corrupt(
                        genome,
                        format!("bottom segment {index} lacks a parse-up link"),
                    ));
                }
            }
            Some(parse_index) => {
                let top = genome.top(parse_index).map_err(|_| {
                    corrupt(
                        genome,
                        format!("bottom segment {index} parse-up link {parse_index} is out of bounds"),
                    )
                })?;
                let offset = bottom.top_parse_offset();
                if top.start_position() + offset != bottom.start_position()
                    || offset >= top.length()
                {
                    return Err(corrupt(
                        genome,
                        format!("bottom segment {index} parse-up offset {offset} does not land on its start"),
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Every parent link must be mirrored by the parent genome's child slot,
/// with matching orientation. Root genomes must carry no parent links.
fn check_parent_edges(alignment: &Alignment, genome: &Genome) -> HalResult<()> {
    let parent = genome.parent().map(|parent_id| alignment.genome(parent_id));
    for index in 0..genome.num_top_segments() {
        let top = genome.top(index)?;
        let parent_index = match top.parent_index() {
            Some(parent_index) => parent_index,
            None => continue,
        };
        let parent = parent.ok_or_else(|| {
            corrupt(
                genome,
                format!("root genome top segment {index} has a parent link"),
            )
        })?;
        let slot = parent.child_slot(genome.id()).ok_or_else(|| {
            corrupt(
                genome,
                format!("not registered as a child of '{}'", parent.name()),
            )
        })?;
        let bottom = parent.bottom(parent_index).map_err(|_| {
            corrupt(
                genome,
                format!("top segment {index} parent link {parent_index} is out of bounds"),
            )
        })?;
        if bottom.child_index(slot) != Some(index) {
            return Err(corrupt(
                genome,
                format!(
                    "back-reference mismatch: top segment {index} -> bottom segment {parent_index} of '{}', which points back at {:?}",
                    parent.name(),
                    bottom.child_index(slot)
                ),
            ));
        }
        if bottom.child_reversed(slot) != top.parent_reversed() {
            return Err(corrupt(
                genome,
                format!("orientation mismatch on the parent edge of top segment {index}"),
            ));
        }
    }
    Ok(())
}

/// Every child link must be mirrored by the child genome's parent link.
/// Leaf genomes must carry no child slots.
fn check_child_edges(alignment: &Alignment, genome: &Genome) -> HalResult<()> {
    let num_children = genome.num_children();
    for index in 0..genome.num_bottom_segments() {
        let bottom = genome.bottom(index)?;
        if bottom.num_children() != num_children {
            return Err(corrupt(
                genome,
                format!(
                    "bottom segment {index} has {} child slots, expected {num_children}",
                    bottom.num_children()
                ),
            ));
        }
        for slot in 0..num_children {
            let child_index = match bottom.child_index(slot) {
                Some(child_index) => child_index,
                None => continue,
            };
            let child_id = match genome.child(slot) {
                Some(child_id) => child_id,
                None => continue,
            };
            let child = alignment.genome(child_id);
            let top = child.top(child_index).map_err(|_| {
                corrupt(
                    genome,
                    format!(
                        "bottom segment {index} child link {child_index} is out of bounds in '{}'",
                        child.name()
                    ),
                )
            })?;
            if top.parent_index() != Some(index) {
                return Err(corrupt(
                    genome,
                    format!(
                        "back-reference mismatch: bottom segment {index} -> top segment {child_index} of '{}', which points back at {:?}",
                        child.name(),
                        top.parent_index()
                    ),
                ));
            }
            if top.parent_reversed() != bottom.child_reversed(slot) {
                return Err(corrupt(
                    genome,
                    format!("orientation mismatch on child slot {slot} of bottom segment {index}"),
                ));
            }
        }
    }
    Ok(())
}

/// Every paralogy link must lie on a cycle that closes within the array
/// length. Each closed cycle should carry exactly one canonical member.
fn check_paralogy_cycles(genome: &Genome) -> HalResult<()> {
    let count = genome.num_top_segments();
    let mut seen = vec![false; count];
    for origin in 0..count {
        if seen[origin] || !genome.top(origin)?.has_next_paralogy() {
            continue;
        }
        let mut canonical = 0usize;
        let mut current = origin;
        for step in 0..=count {
            let record = genome.top(current)?;
            if record.is_canonical_paralog() {
                canonical += 1;
            }
            seen[current] = true;
            let next = record.next_paralogy_index().ok_or_else(|| {
                corrupt(
                    genome,
                    format!("paralogy cycle from top segment {origin} broke at segment {current}"),
                )
            })?;
            if next >= count {
                return Err(corrupt(
                    genome,
                    format!("paralogy link of top segment {current} points past the array at {next}"),
                ));
            }
            if next == origin {
                break;
            }
            if step == count {
                return Err(corrupt(
                    genome,
                    format!("paralogy cycle from top segment {origin} did not close within {count} steps"),
                ));
            }
            current = next;
        }
        if canonical != 1 {
            log::warn!(
                "genome '{}': paralogy cycle through segment {origin} has {canonical} canonical members",
                genome.name()
            );
        }
    }
    Ok(())
}
