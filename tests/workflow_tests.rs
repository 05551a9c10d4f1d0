use logid::fs::MemFileSystem;
use logid::{
    allocate, allocate_by_name, assign_id, build_reverse_index, reconcile, Error, FormatDescriptor, Id,
    IdConfig, IdTable, LocationInfo, LocationTable, SearchMethod,
};
use std::path::Path;

static LIST: &str = "til.json";
static LOCATIONS: &str = "li.json";

fn descriptor_table(ids: &[u32]) -> IdTable {
    ids.iter()
        .map(|&n| (Id(n), FormatDescriptor::new("TRICE8", format!("event {n}"))))
        .collect()
}

#[test]
fn test_documented_allocation_examples() {
    let mut diag = Vec::new();
    let cases = [
        (&[3, 4, 5][..], SearchMethod::Upward, 1),
        (&[1, 2, 3][..], SearchMethod::Upward, 4),
        (&[6, 7, 8][..], SearchMethod::Downward, 10),
        (&[9, 10][..], SearchMethod::Downward, 8),
    ];
    for (ids, method, expected) in cases {
        let id = allocate(&descriptor_table(ids), Id(1), Id(10), method, &mut diag).unwrap();
        assert_eq!(id, Id(expected), "{method} on {ids:?}");
    }
    let id = allocate(&descriptor_table(&[1, 2, 3, 4]), Id(1), Id(5), SearchMethod::Random, &mut diag).unwrap();
    assert_eq!(id, Id(5));
}

#[test]
fn test_random_collisions_are_reported() {
    // 9 of 10 taken: the random search almost surely redraws at least once
    // over 50 runs.
    let table = descriptor_table(&[1, 2, 3, 4, 5, 6, 7, 8, 9]);
    let mut diag = Vec::new();
    for _ in 0..50 {
        assert_eq!(allocate(&table, Id(1), Id(10), SearchMethod::Random, &mut diag).unwrap(), Id(10));
    }
    let text = String::from_utf8(diag).unwrap();
    assert!(text.contains("used, next try"));
    assert!(text.contains("Less than 25%"));
}

#[test]
fn test_unknown_method_leaves_table_untouched() {
    let table = descriptor_table(&[1]);
    let err = allocate_by_name(&table, Id(1), Id(10), "Upward", &mut Vec::new()).unwrap_err();
    assert!(matches!(err, Error::UnknownSearchMethod(_)));
    assert_eq!(table.len(), 1);
}

#[test]
fn test_reverse_index_groups_duplicates() {
    let table: IdTable = [
        (Id(5), FormatDescriptor::new("trice16_1", "temp=%d")),
        (Id(9), FormatDescriptor::new("TRICE16_1", "temp=%d")),
        (Id(7), FormatDescriptor::new("TRICE16_1", "humidity=%d")),
    ]
    .into_iter()
    .collect();

    let index = build_reverse_index(&table);
    assert_eq!(index.len(), 2);
    let ids = index.get(&FormatDescriptor::new("TRICE16_1", "temp=%d")).unwrap();
    assert!(ids.contains(&Id(5)) && ids.contains(&Id(9)));
    assert_eq!(ids.len(), 2);
}

#[test]
fn test_update_cycle() {
    let fs = MemFileSystem::new().with_file(
        LIST,
        br#"{"1000": {"Type": "TRICE16", "Strg": "speed=%d"}}"#.to_vec(),
    );
    let config = IdConfig {
        min: 1000,
        max: 1003,
        method: SearchMethod::Downward,
    };
    let mut diag = Vec::new();

    let mut table = IdTable::load_from_file(&fs, Path::new(LIST), &mut diag).unwrap();
    let mut li = LocationTable::load_from_file(&fs, Path::new(LOCATIONS), &mut diag).unwrap();
    assert!(li.is_empty());

    // Identical format (tag case differs) keeps its ID.
    let reused = assign_id(&mut table, FormatDescriptor::new("trice16", "speed=%d"), &config, &mut diag).unwrap();
    assert_eq!(reused, Id(1000));

    let a = assign_id(&mut table, FormatDescriptor::new("TRICE8", "a=%u b=%u"), &config, &mut diag).unwrap();
    let b = assign_id(&mut table, FormatDescriptor::new("TRICE32", "ready"), &config, &mut diag).unwrap();
    assert_eq!((a, b), (Id(1003), Id(1002)));
    li.insert(a, LocationInfo::new("src/motor.c", 42));

    let report = reconcile(&mut table, &mut diag);
    assert_eq!(report.updated, vec![Id(1000), Id(1002), Id(1003)]);

    table.save_to_file(&fs, Path::new(LIST)).unwrap();
    li.save_to_file(&fs, Path::new(LOCATIONS)).unwrap();

    let table = IdTable::load_from_file(&fs, Path::new(LIST), &mut diag).unwrap();
    assert_eq!(table.get(Id(1000)).unwrap().type_tag(), "TRICE16_1");
    assert_eq!(table.get(Id(1002)).unwrap().type_tag(), "TRICE32_0");
    assert_eq!(table.get(Id(1003)).unwrap().type_tag(), "TRICE8_2");

    let li = LocationTable::load_from_file(&fs, Path::new(LOCATIONS), &mut diag).unwrap();
    assert_eq!(li.get(Id(1003)).unwrap().line, 42);

    // One slot left, then the range is exhausted.
    let mut table = table;
    let c = assign_id(&mut table, FormatDescriptor::new("TRICE8", "c"), &config, &mut diag).unwrap();
    assert_eq!(c, Id(1001));
    let err = assign_id(&mut table, FormatDescriptor::new("TRICE8", "d"), &config, &mut diag).unwrap_err();
    assert!(matches!(err, Error::RangeExhausted { used: 4, .. }));
}
