use workmap_core::prelude::*;

fn board_items() -> Vec<WorkItem> {
    vec![
        WorkItem::new(11, "Task", 3.0, 1.0).with_priority(Priority::High),
        WorkItem::new(12, "Bug", 0.5, 0.0),
        WorkItem::new(13, "Epic", 20.0, 0.0),
    ]
}

#[test]
fn export_json_and_json_by_id_smoke() {
    let items = board_items();
    let cfg = LayoutConfig::default();
    let blocks = layout_blocks(&items, 400.0, Some(60.0), &cfg).expect("layout");

    // array form
    let v = to_json(&blocks);
    let obj = v.as_object().expect("object");
    assert!(obj.contains_key("canvas"));
    assert!(obj.contains_key("stats"));
    let tiles = obj["tiles"].as_array().expect("tiles");
    assert_eq!(tiles.len(), 2);
    assert_eq!(tiles[0]["id"], 11);
    assert_eq!(tiles[0]["type"], "Task");
    assert_eq!(tiles[0]["priority"], "High");
    assert!(tiles[1]["priority"].is_null());
    assert_eq!(obj["unplaced"].as_array().expect("unplaced").len(), 0);
    assert_eq!(obj["canvas"]["w"], 400.0);

    // keyed form
    let v = to_json_by_id(&blocks);
    let tiles = v["tiles"].as_object().expect("tiles");
    assert!(tiles.contains_key("11"));
    assert!(tiles.contains_key("12"));
    assert!(!tiles.contains_key("13"));
    assert_eq!(tiles["11"]["order"], 0);
    assert!(tiles["11"].get("id").is_none());
}

#[test]
fn export_treemap_and_unplaced() {
    let items = board_items();
    let tm = layout_treemap(&items, 300.0, 200.0, &LayoutConfig::default()).expect("layout");
    let v = to_json(&tm);
    assert_eq!(v["tiles"].as_array().expect("tiles").len(), 1);
    assert_eq!(v["stats"]["num_tiles"], 1);
    assert!((v["stats"]["coverage"].as_f64().expect("coverage") - 1.0).abs() < 1e-9);

    let big: Vec<WorkItem> = (1..=9).map(|i| WorkItem::new(i, "Task", 10.0, 0.0)).collect();
    let blocks = layout_blocks(&big, 320.0, None, &LayoutConfig::default()).expect("layout");
    let v = to_json(&blocks);
    assert_eq!(v["unplaced"], serde_json::json!([9]));
    assert_eq!(to_json_by_id(&blocks)["unplaced"], serde_json::json!([9]));
}

#[test]
fn board_layout_serializes_with_kind_tag() {
    let board = Board::new("sprint", board_items());
    let cfg = LayoutConfig::builder().kind(LayoutKind::Treemap).build();
    let out = layout_board(&board, &cfg).expect("layout");
    let v = serde_json::to_value(&out).expect("serialize");
    assert_eq!(v["kind"], "treemap");
    assert_eq!(v["tiles"][0]["item"]["id"], 11);
    assert_eq!(v["tiles"][0]["item"]["completedWork"], 3.0);
}
