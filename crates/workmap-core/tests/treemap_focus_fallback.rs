use workmap_core::prelude::*;

fn ids(layout: &TreemapLayout) -> Vec<u64> {
    let mut v: Vec<u64> = layout.tiles.iter().map(|t| t.item.id).collect();
    v.sort_unstable();
    v
}

#[test]
fn only_tasks_are_shown_when_present() {
    let items = vec![
        WorkItem::new(1, "User Story", 5.0, 5.0),
        WorkItem::new(2, "Task", 1.0, 1.0),
        WorkItem::new(3, "Bug", 3.0, 0.0),
        WorkItem::new(4, "task", 0.0, 2.0),
    ];
    let out = layout_treemap(&items, 400.0, 300.0, &LayoutConfig::default()).expect("layout");
    assert_eq!(ids(&out), vec![2, 4]);
    let covered: f64 = out.tiles.iter().map(|t| t.rect.area()).sum();
    assert!((covered - 120_000.0).abs() < 1e-6);
}

#[test]
fn falls_back_to_every_item_without_tasks() {
    let items = vec![
        WorkItem::new(10, "User Story", 5.0, 5.0),
        WorkItem::new(11, "Bug", 1.0, 0.0),
        WorkItem::new(12, "Epic", 0.0, 0.0),
    ];
    let out = layout_treemap(&items, 200.0, 200.0, &LayoutConfig::default()).expect("layout");
    assert_eq!(ids(&out), vec![10, 11, 12]);
}

#[test]
fn custom_focus_type() {
    let items = vec![
        WorkItem::new(1, "Task", 1.0, 0.0),
        WorkItem::new(2, "Bug", 1.0, 0.0),
        WorkItem::new(3, "Bug", 2.0, 0.0),
    ];
    let cfg = LayoutConfig::builder().focus_type(Some("bug".into())).build();
    let out = layout_treemap(&items, 100.0, 100.0, &cfg).expect("layout");
    assert_eq!(ids(&out), vec![2, 3]);

    let cfg = LayoutConfig::builder().focus_type(None).build();
    let out = layout_treemap(&items, 100.0, 100.0, &cfg).expect("layout");
    assert_eq!(ids(&out), vec![1, 2, 3]);
}

#[test]
fn empty_input_gives_empty_layout() {
    let out = layout_treemap(&[], 400.0, 400.0, &LayoutConfig::default()).expect("layout");
    assert!(out.tiles.is_empty());
    assert_eq!(out.width, 400.0);
    assert_eq!(out.height, 400.0);
}
