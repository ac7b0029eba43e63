// Opening an alignment from the tree catalog and arena bookkeeping.

use ferrous_hal::{Alignment, GenomeCatalog, GenomeDimensions, HalError, StaticCatalog};

fn two_level_catalog() -> StaticCatalog {
    let mut catalog = StaticCatalog::new();
    catalog.push(GenomeDimensions {
        name: "Anc0".to_string(),
        parent: None,
        sequences: vec![("chr".to_string(), 8)],
        num_top_segments: 0,
        num_bottom_segments: 2,
    });
    catalog.push(GenomeDimensions {
        name: "Mouse".to_string(),
        parent: Some("Anc0".to_string()),
        sequences: vec![("chr19".to_string(), 5), ("chrM".to_string(), 3)],
        num_top_segments: 2,
        num_bottom_segments: 0,
    });
    catalog.push(GenomeDimensions {
        name: "Rat".to_string(),
        parent: Some("Anc0".to_string()),
        sequences: vec![("chr1".to_string(), 8)],
        num_top_segments: 1,
        num_bottom_segments: 0,
    });
    catalog
}

#[test]
fn open_builds_the_tree_and_sizes_the_arrays() {
    let catalog = two_level_catalog();
    let alignment = Alignment::open(&catalog).unwrap();
    assert_eq!(alignment.num_genomes(), 3);

    let root_id = alignment.root().unwrap();
    let root = alignment.genome(root_id);
    assert_eq!(root.name(), "Anc0");
    assert_eq!(root.num_children(), 2);
    assert_eq!(root.num_bottom_segments(), 2);
    assert_eq!(root.num_top_segments(), 0);
    // Every bottom record carries one slot per child genome.
    assert_eq!(root.bottom(0).unwrap().num_children(), 2);

    let mouse = alignment.genome_by_name("Mouse").unwrap();
    assert_eq!(mouse.parent(), Some(root_id));
    assert_eq!(mouse.num_top_segments(), 2);
    assert_eq!(mouse.num_sequences(), 2);
    assert_eq!(mouse.sequence("chrM").unwrap().start_position(), 5);

    // Child-slot resolution is by id, built at open time.
    let mouse_id = alignment.genome_id("Mouse").unwrap();
    let rat_id = alignment.genome_id("Rat").unwrap();
    assert_eq!(root.child_slot(mouse_id), Some(0));
    assert_eq!(root.child_slot(rat_id), Some(1));
    assert_eq!(root.child(1), Some(rat_id));
    assert_eq!(root.child_slot(root_id), None);
}

#[test]
fn open_rejects_a_dangling_catalog_entry() {
    let mut catalog = StaticCatalog::new();
    catalog.push(GenomeDimensions {
        name: "Orphan".to_string(),
        parent: Some("Nowhere".to_string()),
        sequences: vec![("chr".to_string(), 4)],
        num_top_segments: 1,
        num_bottom_segments: 0,
    });
    assert!(matches!(
        Alignment::open(&catalog),
        Err(HalError::CorruptTopology { .. })
    ));
}

#[test]
fn catalog_lookup_round_trips() {
    let catalog = two_level_catalog();
    assert_eq!(catalog.names(), vec!["Anc0", "Mouse", "Rat"]);
    let rat = catalog.lookup("Rat").unwrap();
    assert_eq!(rat.parent.as_deref(), Some("Anc0"));
    assert!(catalog.lookup("Cow").is_none());
}

#[test]
fn duplicate_names_are_rejected() {
    let mut alignment = Alignment::new();
    alignment.add_genome("Root", None).unwrap();
    assert!(matches!(
        alignment.add_genome("Root", Some("Root")),
        Err(HalError::CorruptTopology { .. })
    ));
}

#[test]
fn empty_iterator_construction_is_invalid() {
    let mut alignment = Alignment::new();
    let root = alignment.add_genome("Root", None).unwrap();
    assert!(matches!(
        alignment.top_iterator(root, 0),
        Err(HalError::InvalidIterator { .. })
    ));
    assert!(matches!(
        alignment.bottom_iterator(root, 0),
        Err(HalError::InvalidIterator { .. })
    ));
}
