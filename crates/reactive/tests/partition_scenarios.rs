//! Scenarios for sectioned views.

mod common;

use common::{keys, Recorder};
use rivulet_core::{field_map, FieldMap, Item, Keyed, StreamItem};
use rivulet_reactive::{
    IndexPath, ManualScheduler, OrderBy, PartitionedView, Stream, StreamConfig, StreamEvent,
    StreamSource,
};
use std::rc::Rc;

fn group(g: i64) -> FieldMap {
    field_map([("g", g)])
}

fn by_group(item: &Item) -> usize {
    item.field("g").as_i64().unwrap_or(0) as usize
}

fn titles() -> Vec<String> {
    vec!["first".to_string(), "second".to_string()]
}

fn section_keys(view: &PartitionedView<Item>, section: usize) -> Vec<String> {
    view.section(section)
        .unwrap_or_default()
        .iter()
        .map(|i| i.key().to_string())
        .collect()
}

/// A stream holding a in group 0 and b, c in group 1, with a partition over it.
fn populated() -> (Stream<Item>, PartitionedView<Item>, Rc<ManualScheduler>) {
    let scheduler = Rc::new(ManualScheduler::new());
    let stream: Stream<Item> = Stream::new(StreamConfig::new(), scheduler.clone()).unwrap();
    let view = PartitionedView::new(stream.clone(), titles(), by_group).unwrap();
    stream.child_added("c", &group(1)).unwrap();
    stream.child_added("a", &group(0)).unwrap();
    stream.child_added("b", &group(1)).unwrap();
    scheduler.run_until_idle();
    (stream, view, scheduler)
}

#[test]
fn test_live_adds_build_partition_map() {
    let scheduler = Rc::new(ManualScheduler::new());
    let stream: Stream<Item> = Stream::new(StreamConfig::new(), scheduler.clone()).unwrap();
    let view = PartitionedView::new(stream.clone(), titles(), by_group).unwrap();
    let recorder = Recorder::attach(&view);

    stream.child_added("c", &group(1)).unwrap();
    stream.child_added("a", &group(0)).unwrap();
    stream.child_added("b", &group(1)).unwrap();
    scheduler.run_until_idle();

    let expected = vec![
        IndexPath::new(0, 0),
        IndexPath::new(1, 0),
        IndexPath::new(1, 1),
    ];
    assert_eq!(view.partition_map(), expected);
    assert_eq!(
        recorder.borrow_mut().take(),
        vec![
            StreamEvent::WillChange,
            StreamEvent::ItemsAdded(expected),
            StreamEvent::DidChange,
        ]
    );
    assert_eq!(section_keys(&view, 0), vec!["a"]);
    assert_eq!(section_keys(&view, 1), vec!["b", "c"]);
    assert_eq!(keys(&view), vec!["a", "b", "c"]);
}

#[test]
fn test_change_within_section_is_in_place() {
    let (stream, view, _scheduler) = populated();
    let recorder = Recorder::attach(&view);

    stream.child_changed("c", &field_map([("g", 1i64), ("note", 7i64)]));

    assert_eq!(
        recorder.borrow_mut().take(),
        vec![StreamEvent::ItemsChanged(vec![IndexPath::new(1, 1)])]
    );
    let c = view.get_item(1, 1).unwrap();
    assert_eq!(c.field("note").as_i64(), Some(7));
}

#[test]
fn test_change_across_sections_moves_item() {
    let (stream, view, _scheduler) = populated();
    let recorder = Recorder::attach(&view);

    stream.child_changed("b", &group(0));

    assert_eq!(
        recorder.borrow_mut().take(),
        vec![
            StreamEvent::WillChange,
            StreamEvent::ItemsDeleted(vec![IndexPath::new(1, 0)]),
            StreamEvent::ItemsAdded(vec![IndexPath::new(0, 1)]),
            StreamEvent::DidChange,
        ]
    );
    assert_eq!(section_keys(&view, 0), vec!["a", "b"]);
    assert_eq!(section_keys(&view, 1), vec!["c"]);
    assert_eq!(
        view.partition_map(),
        vec![
            IndexPath::new(0, 0),
            IndexPath::new(0, 1),
            IndexPath::new(1, 0),
        ]
    );
    assert_eq!(view.find_index_path("c"), Some(IndexPath::new(1, 0)));
}

#[test]
fn test_batched_deletes_use_old_layout() {
    let (stream, view, scheduler) = populated();
    let recorder = Recorder::attach(&view);

    stream.child_removed("a");
    stream.child_removed("c");
    scheduler.run_until_idle();

    assert_eq!(
        recorder.borrow_mut().take(),
        vec![
            StreamEvent::WillChange,
            StreamEvent::ItemsDeleted(vec![IndexPath::new(0, 0), IndexPath::new(1, 1)]),
            StreamEvent::DidChange,
        ]
    );
    assert_eq!(view.partition_map(), vec![IndexPath::new(1, 0)]);
    assert_eq!(view.section_len(0), 0);
    assert_eq!(section_keys(&view, 1), vec!["b"]);
}

#[test]
fn test_middle_insert_shifts_later_rows() {
    let (stream, view, scheduler) = populated();

    stream.child_added("bb", &group(1)).unwrap();
    scheduler.run_until_idle();

    assert_eq!(section_keys(&view, 1), vec!["b", "bb", "c"]);
    assert_eq!(view.find_index_path("c"), Some(IndexPath::new(1, 2)));
    assert_eq!(view.get_at(IndexPath::new(1, 1)).map(|i| i.key().to_string()), Some("bb".into()));
}

#[test]
fn test_initial_load_passes_through_and_replays() {
    let (stream, view, scheduler) = populated();
    let early = Recorder::attach(&view);

    stream.initial_load_complete(None);
    scheduler.run_until_idle();
    assert_eq!(early.borrow().initial_loads(), vec![None]);

    let late = Recorder::attach(&view);
    assert_eq!(late.borrow().initial_loads(), vec![None]);
}

#[test]
fn test_views_over_a_filtered_stream() {
    let (stream, view, scheduler) = populated();
    let only_a: rivulet_reactive::Predicate<Item> = Rc::new(|item: &Item| item.key() == "a");

    stream.set_predicate(Some(only_a));
    scheduler.run_until_idle();

    assert_eq!(view.len(), 1);
    assert_eq!(section_keys(&view, 0), vec!["a"]);
    assert_eq!(view.section_len(1), 0);
    assert_eq!(view.num_sections(), 2);
}

fn grouped(g: i64, n: i64) -> FieldMap {
    field_map([("g", g), ("n", n)])
}

/// Asserts that every linear position resolves to the same item through the
/// partition map.
fn assert_map_consistent(stream: &Stream<Item>, view: &PartitionedView<Item>) {
    let map = view.partition_map();
    assert_eq!(map.len(), stream.len());
    for (row, path) in map.iter().enumerate() {
        let linear = stream.get(row).map(|i| i.key().to_string());
        let sectioned = view.get_at(*path).map(|i| i.key().to_string());
        assert_eq!(linear, sectioned, "row {} mapped to {:?}", row, path);
    }
}

#[test]
fn test_reordering_change_within_section() {
    let config = StreamConfig::new()
        .order_by(OrderBy::field("n"))
        .batch_delay(None);
    let stream: Stream<Item> = Stream::new(config, Rc::new(ManualScheduler::new())).unwrap();
    stream.child_added("a", &grouped(0, 1)).unwrap();
    stream.child_added("b", &grouped(1, 2)).unwrap();
    stream.child_added("c", &grouped(0, 3)).unwrap();
    let view = PartitionedView::new(stream.clone(), titles(), by_group).unwrap();
    let recorder = Recorder::attach(&view);

    stream.child_changed("a", &grouped(0, 5));

    assert_eq!(
        recorder.borrow_mut().take(),
        vec![
            StreamEvent::WillChange,
            StreamEvent::ItemsDeleted(vec![IndexPath::new(0, 0)]),
            StreamEvent::ItemsAdded(vec![IndexPath::new(0, 1)]),
            StreamEvent::DidChange,
        ]
    );
    assert_eq!(section_keys(&view, 0), vec!["c", "a"]);
    assert_map_consistent(&stream, &view);

    stream.child_added("d", &grouped(0, 0)).unwrap();
    assert_eq!(section_keys(&view, 0), vec!["d", "c", "a"]);
    assert_eq!(
        view.partition_map(),
        vec![
            IndexPath::new(0, 0),
            IndexPath::new(1, 0),
            IndexPath::new(0, 1),
            IndexPath::new(0, 2),
        ]
    );
    assert_map_consistent(&stream, &view);
    assert_eq!(view.find_index_path("a"), Some(IndexPath::new(0, 2)));
}
