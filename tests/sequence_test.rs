// Sequence table resolution and the sequence cursor.

use ferrous_hal::{Alignment, HalError, Segment};

fn build_multi_contig() -> Alignment {
    let mut alignment = Alignment::new();
    let root = alignment.add_genome("Root", None).unwrap();
    let genome = alignment.genome_mut(root);
    genome.add_sequence("chr1", 4).unwrap();
    genome.add_sequence("chr2", 2).unwrap();
    genome.add_sequence("chr3", 6).unwrap();
    genome.append_dna("ACGTACGTACGT").unwrap();
    genome.allocate_top_segments(3);
    genome.top_mut(0).unwrap().set_coordinates(0, 4);
    genome.top_mut(1).unwrap().set_coordinates(4, 2);
    genome.top_mut(2).unwrap().set_coordinates(6, 6);
    alignment
}

#[test]
fn binary_search_resolves_every_region() {
    let alignment = build_multi_contig();
    let genome = alignment.genome_by_name("Root").unwrap();
    for (position, name) in [
        (0u64, "chr1"),
        (3, "chr1"),
        (4, "chr2"),
        (5, "chr2"),
        (6, "chr3"),
        (9, "chr3"),
        (11, "chr3"),
    ] {
        assert_eq!(genome.sequence_at(position).unwrap().name(), name);
    }
    assert!(matches!(
        genome.sequence_at(12),
        Err(HalError::OutOfRange { .. })
    ));
}

#[test]
fn lookup_by_name() {
    let alignment = build_multi_contig();
    let genome = alignment.genome_by_name("Root").unwrap();
    let chr2 = genome.sequence("chr2").unwrap();
    assert_eq!(chr2.start_position(), 4);
    assert_eq!(chr2.length(), 2);
    assert_eq!(chr2.end_position(), 5);
    assert!(genome.sequence("chrM").is_none());
}

#[test]
fn cursor_steps_through_the_table() {
    let alignment = build_multi_contig();
    let genome = alignment.genome_by_name("Root").unwrap();
    let mut cursor = genome.sequence_iterator(5).unwrap();
    assert_eq!(cursor.sequence().unwrap().name(), "chr2");

    cursor.to_next().unwrap();
    assert_eq!(cursor.sequence().unwrap().name(), "chr3");
    assert!(matches!(cursor.to_next(), Err(HalError::OutOfRange { .. })));
    assert!(matches!(
        cursor.sequence(),
        Err(HalError::InvalidIterator { .. })
    ));

    cursor.to_prev().unwrap();
    cursor.to_prev().unwrap();
    cursor.to_prev().unwrap();
    assert_eq!(cursor.sequence().unwrap().name(), "chr1");
    assert!(matches!(cursor.to_prev(), Err(HalError::OutOfRange { .. })));
}

#[test]
fn cursor_equality_is_per_genome_index() {
    let alignment = build_multi_contig();
    let genome = alignment.genome_by_name("Root").unwrap();
    let first = genome.sequence_iterator(0).unwrap();
    let second = genome.sequence_iterator_at_index(0).unwrap();
    let third = genome.sequence_iterator(4).unwrap();
    assert!(first.equals(&second));
    assert!(!first.equals(&third));
}

#[test]
fn segments_resolve_their_owning_sequence() {
    let alignment = build_multi_contig();
    let root = alignment.genome_id("Root").unwrap();
    let cursor = alignment.top_iterator(root, 1).unwrap();
    assert_eq!(cursor.sequence().unwrap().name(), "chr2");

    let mut reversed = alignment.top_iterator(root, 2).unwrap();
    reversed.to_reverse();
    assert_eq!(reversed.sequence().unwrap().name(), "chr3");
}
