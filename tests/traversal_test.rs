// Traversal semantics across a small genome tree: parent/child navigation,
// parse view switches, paralogy cycles, and orientation-aware string
// materialization.

use ferrous_hal::{Alignment, HalError, Segment};

// Root -> Leaf, one run each, forward orientation.
fn build_pair() -> Alignment {
    let mut alignment = Alignment::new();
    let root = alignment.add_genome("Root", None).unwrap();
    let leaf = alignment.add_genome("Leaf", Some("Root")).unwrap();

    {
        let genome = alignment.genome_mut(root);
        genome.add_sequence("rchr", 10).unwrap();
        genome.append_dna("ACGTACGTAC").unwrap();
        genome.allocate_bottom_segments(1);
        let bottom = genome.bottom_mut(0).unwrap();
        bottom.set_coordinates(0, 10);
        bottom.set_child_index(0, Some(0));
        bottom.set_child_reversed(0, false);
    }
    {
        let genome = alignment.genome_mut(leaf);
        genome.add_sequence("lchr", 10).unwrap();
        genome.append_dna("ACGTACGTAC").unwrap();
        genome.allocate_top_segments(1);
        let top = genome.top_mut(0).unwrap();
        top.set_coordinates(0, 10);
        top.set_parent_index(Some(0));
        top.set_parent_reversed(false);
    }
    alignment
}

// Root -> Mid -> Leaf. Mid carries both run arrays plus a paralogy cycle
// over its three top segments, so every navigation kind is reachable.
fn build_chain() -> Alignment {
    let mut alignment = Alignment::new();
    let root = alignment.add_genome("Root", None).unwrap();
    let mid = alignment.add_genome("Mid", Some("Root")).unwrap();
    let leaf = alignment.add_genome("Leaf", Some("Mid")).unwrap();

    {
        let genome = alignment.genome_mut(root);
        genome.add_sequence("rchr", 12).unwrap();
        genome.append_dna("AAAACCCCGGGG").unwrap();
        genome.allocate_bottom_segments(3);
        for index in 0..3 {
            let bottom = genome.bottom_mut(index).unwrap();
            bottom.set_coordinates(index as u64 * 4, 4);
            bottom.set_child_index(0, Some(index));
            bottom.set_child_reversed(0, false);
        }
    }
    {
        let genome = alignment.genome_mut(mid);
        genome.add_sequence("m1", 12).unwrap();
        genome.append_dna("ACGTACGTACGT").unwrap();
        genome.allocate_top_segments(3);
        genome.allocate_bottom_segments(2);
        for index in 0..3 {
            let top = genome.top_mut(index).unwrap();
            top.set_coordinates(index as u64 * 4, 4);
            top.set_parent_index(Some(index));
            top.set_parent_reversed(false);
            top.set_next_paralogy_index(Some((index + 1) % 3));
            top.set_canonical_paralog(index == 0);
        }
        genome.top_mut(0).unwrap().set_bottom_parse_index(Some(0));
        genome.top_mut(0).unwrap().set_bottom_parse_offset(0);
        genome.top_mut(1).unwrap().set_bottom_parse_index(Some(0));
        genome.top_mut(1).unwrap().set_bottom_parse_offset(4);
        genome.top_mut(2).unwrap().set_bottom_parse_index(Some(1));
        genome.top_mut(2).unwrap().set_bottom_parse_offset(2);
        for index in 0..2 {
            let bottom = genome.bottom_mut(index).unwrap();
            bottom.set_coordinates(index as u64 * 6, 6);
            bottom.set_child_index(0, Some(index));
            bottom.set_child_reversed(0, false);
        }
        genome.bottom_mut(0).unwrap().set_top_parse_index(Some(0));
        genome.bottom_mut(0).unwrap().set_top_parse_offset(0);
        genome.bottom_mut(1).unwrap().set_top_parse_index(Some(1));
        genome.bottom_mut(1).unwrap().set_top_parse_offset(2);
    }
    {
        let genome = alignment.genome_mut(leaf);
        genome.add_sequence("l1", 12).unwrap();
        genome.append_dna("ACGTACGTACGT").unwrap();
        genome.allocate_top_segments(2);
        for index in 0..2 {
            let top = genome.top_mut(index).unwrap();
            top.set_coordinates(index as u64 * 6, 6);
            top.set_parent_index(Some(index));
            top.set_parent_reversed(false);
        }
    }

    ferrous_hal::validate::validate_alignment(&alignment).unwrap();
    alignment
}

#[test]
fn to_parent_lands_on_root_bottom_segment() {
    // Scenario A.
    let alignment = build_pair();
    let root = alignment.genome_id("Root").unwrap();
    let leaf = alignment.genome_id("Leaf").unwrap();

    let top = alignment.top_iterator(leaf, 0).unwrap();
    let bottom = top.to_parent().unwrap();
    assert_eq!(bottom.genome().name(), "Root");
    assert_eq!(bottom.array_index(), 0);
    assert!(!bottom.is_reversed());

    let first = alignment.bottom_iterator(root, 0).unwrap();
    let second = alignment.bottom_iterator(root, 0).unwrap();
    assert!(first.equals(&second));
    assert!(first.equals(&bottom));
}

#[test]
fn to_parent_composes_orientation() {
    let mut alignment = build_pair();
    let leaf = alignment.genome_id("Leaf").unwrap();
    alignment
        .genome_mut(leaf)
        .top_mut(0)
        .unwrap()
        .set_parent_reversed(true);
    alignment
        .genome_mut(alignment.genome_id("Root").unwrap())
        .bottom_mut(0)
        .unwrap()
        .set_child_reversed(0, true);

    let top = alignment.top_iterator(leaf, 0).unwrap();
    assert!(top.to_parent().unwrap().is_reversed());

    let mut reversed_top = top.copy();
    reversed_top.to_reverse();
    assert!(!reversed_top.to_parent().unwrap().is_reversed());
}

#[test]
fn to_parent_without_parent_fails() {
    let mut alignment = Alignment::new();
    let root = alignment.add_genome("Root", None).unwrap();
    {
        let genome = alignment.genome_mut(root);
        genome.add_sequence("chr", 4).unwrap();
        genome.append_dna("ACGT").unwrap();
        genome.allocate_top_segments(1);
        genome.top_mut(0).unwrap().set_coordinates(0, 4);
    }
    let top = alignment.top_iterator(root, 0).unwrap();
    assert!(!top.has_parent().unwrap());
    assert!(matches!(top.to_parent(), Err(HalError::NoSuchParent { .. })));
}

#[test]
fn to_child_round_trips_the_parent_edge() {
    let alignment = build_chain();
    let root = alignment.genome_id("Root").unwrap();
    for index in 0..3 {
        let bottom = alignment.bottom_iterator(root, index).unwrap();
        let top = bottom.to_child(0).unwrap();
        assert_eq!(top.genome().name(), "Mid");
        assert_eq!(top.array_index(), index as i64);
        let back = top.to_parent().unwrap();
        assert!(back.equals(&bottom));
    }
}

#[test]
fn to_child_on_absent_slot_fails_and_preserves_cursor() {
    // Scenario D: Root has two children but links only the first.
    let mut alignment = Alignment::new();
    let root = alignment.add_genome("Root", None).unwrap();
    let left = alignment.add_genome("Left", Some("Root")).unwrap();
    let _right = alignment.add_genome("Right", Some("Root")).unwrap();
    {
        let genome = alignment.genome_mut(root);
        genome.add_sequence("chr", 6).unwrap();
        genome.append_dna("ACGTAC").unwrap();
        genome.allocate_bottom_segments(1);
        let bottom = genome.bottom_mut(0).unwrap();
        bottom.set_coordinates(0, 6);
        bottom.set_child_index(0, Some(0));
    }
    {
        let genome = alignment.genome_mut(left);
        genome.add_sequence("chr", 6).unwrap();
        genome.append_dna("ACGTAC").unwrap();
        genome.allocate_top_segments(1);
        let top = genome.top_mut(0).unwrap();
        top.set_coordinates(0, 6);
        top.set_parent_index(Some(0));
    }

    let bottom = alignment.bottom_iterator(root, 0).unwrap();
    let before = bottom.copy();
    assert_eq!(bottom.num_children(), 2);
    assert!(!bottom.has_child(1).unwrap());
    assert!(matches!(
        bottom.to_child(1),
        Err(HalError::NoSuchChild { slot: 1, .. })
    ));
    assert!(bottom.equals_exact(&before));
}

#[test]
fn parse_round_trip_restores_index_and_offset() {
    let alignment = build_chain();
    let mid = alignment.genome_id("Mid").unwrap();

    for index in 0..3 {
        let top = alignment.top_iterator(mid, index).unwrap();
        let down = top.to_parse_down().unwrap();
        let up = down.to_parse_up().unwrap();
        assert_eq!(up.array_index(), top.array_index());
        assert_eq!(up.start_offset(), top.start_offset());
        assert_eq!(up.start_position().unwrap(), top.start_position().unwrap());
    }

    for index in 0..2 {
        let bottom = alignment.bottom_iterator(mid, index).unwrap();
        let up = bottom.to_parse_up().unwrap();
        let down = up.to_parse_down().unwrap();
        assert_eq!(down.array_index(), bottom.array_index());
        assert_eq!(down.start_offset(), bottom.start_offset());
    }
}

#[test]
fn parse_round_trip_under_reversal() {
    let alignment = build_chain();
    let mid = alignment.genome_id("Mid").unwrap();

    let mut top = alignment.top_iterator(mid, 1).unwrap();
    top.to_reverse();
    assert_eq!(top.start_position().unwrap(), 7);

    let down = top.to_parse_down().unwrap();
    assert!(down.is_reversed());
    assert_eq!(down.start_position().unwrap(), 7);

    let up = down.to_parse_up().unwrap();
    assert_eq!(up.array_index(), 1);
    assert_eq!(up.start_offset(), 0);
    assert!(up.is_reversed());
}

#[test]
fn parse_down_in_a_leaf_fails() {
    let alignment = build_chain();
    let leaf = alignment.genome_id("Leaf").unwrap();
    let top = alignment.top_iterator(leaf, 0).unwrap();
    assert!(!top.has_parse_down().unwrap());
    assert!(matches!(
        top.to_parse_down(),
        Err(HalError::NoSuchChild { .. })
    ));
}

#[test]
fn paralogy_cycle_closes_exactly() {
    // Scenario C.
    let alignment = build_chain();
    let mid = alignment.genome_id("Mid").unwrap();

    for origin in 0..3 {
        let cursor = alignment.top_iterator(mid, origin).unwrap();
        assert_eq!(cursor.num_paralogs().unwrap(), 3);
    }

    let mut cursor = alignment.top_iterator(mid, 0).unwrap();
    assert!(cursor.is_canonical_paralog().unwrap());
    cursor.to_next_paralogy().unwrap();
    assert_eq!(cursor.array_index(), 1);
    assert!(!cursor.is_canonical_paralog().unwrap());
    cursor.to_next_paralogy().unwrap();
    assert_eq!(cursor.array_index(), 2);
    cursor.to_next_paralogy().unwrap();
    assert_eq!(cursor.array_index(), 0);
}

#[test]
fn unique_segment_has_one_paralog() {
    let alignment = build_pair();
    let leaf = alignment.genome_id("Leaf").unwrap();
    let mut cursor = alignment.top_iterator(leaf, 0).unwrap();
    assert_eq!(cursor.num_paralogs().unwrap(), 1);
    assert!(!cursor.has_next_paralogy().unwrap());
    assert!(matches!(
        cursor.to_next_paralogy(),
        Err(HalError::OutOfRange { .. })
    ));
    assert_eq!(cursor.array_index(), 0);
}

#[test]
fn stepping_inverts_under_reversal_and_fails_past_the_ends() {
    let alignment = build_chain();
    let mid = alignment.genome_id("Mid").unwrap();

    let mut cursor = alignment.top_iterator(mid, 1).unwrap();
    cursor.to_next().unwrap();
    assert_eq!(cursor.array_index(), 2);
    assert!(matches!(cursor.to_next(), Err(HalError::OutOfRange { .. })));
    // The cursor is parked one past the end; dereference is invalid.
    assert!(matches!(
        cursor.record(),
        Err(HalError::InvalidIterator { .. })
    ));
    cursor.to_prev().unwrap();
    assert_eq!(cursor.array_index(), 2);

    let mut reversed = alignment.top_iterator(mid, 1).unwrap();
    reversed.to_reverse();
    reversed.to_next().unwrap();
    assert_eq!(reversed.array_index(), 0);
}

#[test]
fn equals_ignores_orientation_but_equals_exact_does_not() {
    let alignment = build_chain();
    let mid = alignment.genome_id("Mid").unwrap();
    let plain = alignment.top_iterator(mid, 1).unwrap();
    let mut reversed = alignment.top_iterator(mid, 1).unwrap();
    reversed.to_reverse();
    assert!(plain.equals(&reversed));
    assert!(!plain.equals_exact(&reversed));
    assert!(plain.equals_exact(&plain.copy()));
}

#[test]
fn cursors_from_different_alignments_never_compare_equal() {
    // Two arenas hand out coinciding genome ids and indices; identity is
    // still per alignment.
    let first = build_pair();
    let second = build_pair();
    let leaf = first.genome_id("Leaf").unwrap();
    assert_eq!(leaf, second.genome_id("Leaf").unwrap());

    let ours = first.top_iterator(leaf, 0).unwrap();
    let theirs = second.top_iterator(leaf, 0).unwrap();
    assert!(!ours.equals(&theirs));
    assert!(!ours.equals_exact(&theirs));
    assert!(ours.equals(&ours.copy()));

    let root = first.genome_id("Root").unwrap();
    let our_bottom = first.bottom_iterator(root, 0).unwrap();
    let their_bottom = second.bottom_iterator(root, 0).unwrap();
    assert!(!our_bottom.equals(&their_bottom));
}

#[test]
fn positional_accessors_reject_an_unpopulated_record() {
    let mut alignment = Alignment::new();
    let root = alignment.add_genome("Root", None).unwrap();
    alignment.genome_mut(root).allocate_top_segments(1);

    // Allocated but never given coordinates: no position to report.
    let mut cursor = alignment.top_iterator(root, 0).unwrap();
    assert!(matches!(
        cursor.start_position(),
        Err(HalError::CorruptTopology { .. })
    ));
    assert!(matches!(
        cursor.end_position(),
        Err(HalError::CorruptTopology { .. })
    ));
    cursor.to_reverse();
    assert!(matches!(
        cursor.start_position(),
        Err(HalError::CorruptTopology { .. })
    ));
    let mut out = String::new();
    assert!(matches!(
        cursor.get_string(&mut out),
        Err(HalError::CorruptTopology { .. })
    ));
}

#[test]
fn get_string_materializes_reverse_complement() {
    // Scenario B.
    let mut alignment = Alignment::new();
    let root = alignment.add_genome("Root", None).unwrap();
    {
        let genome = alignment.genome_mut(root);
        genome.add_sequence("chr", 4).unwrap();
        genome.append_dna("AAGG").unwrap();
        genome.allocate_top_segments(1);
        genome.top_mut(0).unwrap().set_coordinates(0, 4);
    }
    let mut cursor = alignment.top_iterator(root, 0).unwrap();
    let mut forward = String::new();
    cursor.get_string(&mut forward).unwrap();
    assert_eq!(forward, "AAGG");

    cursor.to_reverse();
    let mut reversed = String::new();
    cursor.get_string(&mut reversed).unwrap();
    assert_eq!(reversed, "CCTT");
}

#[test]
fn reversed_string_equals_external_reverse_complement() {
    let alignment = build_chain();
    let mid = alignment.genome_id("Mid").unwrap();
    for index in 0..3 {
        let mut cursor = alignment.top_iterator(mid, index).unwrap();
        let mut forward = String::new();
        cursor.get_string(&mut forward).unwrap();
        assert_eq!(forward.len() as u64, cursor.length().unwrap());

        cursor.to_reverse();
        let mut reversed = String::new();
        cursor.get_string(&mut reversed).unwrap();

        let external: String = forward
            .chars()
            .rev()
            .map(|base| match base {
                'A' => 'T',
                'C' => 'G',
                'G' => 'C',
                _ => 'A',
            })
            .collect();
        assert_eq!(reversed, external);
    }
}

#[test]
fn slice_trims_the_materialized_range() {
    let alignment = build_chain();
    let mid = alignment.genome_id("Mid").unwrap();
    let mut cursor = alignment.top_iterator(mid, 0).unwrap();
    cursor.slice(1, 1).unwrap();
    assert_eq!(cursor.length().unwrap(), 2);
    assert_eq!(cursor.start_position().unwrap(), 1);
    assert_eq!(cursor.end_position().unwrap(), 2);

    let mut out = String::new();
    cursor.get_string(&mut out).unwrap();
    assert_eq!(out, "CG"); // middle of ACGT

    cursor.to_reverse();
    assert_eq!(cursor.start_offset(), 1);
    assert_eq!(cursor.start_position().unwrap(), 2);
    let mut reversed = String::new();
    cursor.get_string(&mut reversed).unwrap();
    assert_eq!(reversed, "CG"); // reverse complement of CG is itself

    assert!(matches!(
        cursor.slice(3, 1),
        Err(HalError::OutOfRange { .. })
    ));
}

#[test]
fn interval_tests_respect_orientation() {
    let alignment = build_chain();
    let mid = alignment.genome_id("Mid").unwrap();
    let mut cursor = alignment.top_iterator(mid, 1).unwrap(); // [4, 8)
    for (position, expected) in [(3u64, false), (4, true), (7, true), (8, false)] {
        assert_eq!(cursor.overlaps(position).unwrap(), expected);
    }
    assert!(cursor.left_of(9).unwrap());
    assert!(cursor.right_of(2).unwrap());

    cursor.to_reverse();
    assert!(cursor.overlaps(5).unwrap());
    assert!(cursor.left_of(9).unwrap());
}

#[test]
fn position_lookup_finds_the_covering_run() {
    let alignment = build_chain();
    let mid = alignment.genome_id("Mid").unwrap();
    assert_eq!(alignment.top_iterator_at(mid, 0).unwrap().array_index(), 0);
    assert_eq!(alignment.top_iterator_at(mid, 5).unwrap().array_index(), 1);
    assert_eq!(alignment.top_iterator_at(mid, 11).unwrap().array_index(), 2);
    assert_eq!(alignment.bottom_iterator_at(mid, 6).unwrap().array_index(), 1);
    assert!(matches!(
        alignment.top_iterator_at(mid, 12),
        Err(HalError::OutOfRange { .. })
    ));
}
