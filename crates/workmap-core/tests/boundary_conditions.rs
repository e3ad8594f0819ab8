use workmap_core::layout::blocks::BlockPacker;
use workmap_core::layout::treemap::SquarifiedTreemap;
use workmap_core::prelude::*;
use workmap_core::{SizeBucket, WorkmapError};

fn items() -> Vec<WorkItem> {
    vec![
        WorkItem::new(1, "Task", 1.0, 0.0),
        WorkItem::new(2, "Task", 2.0, 2.0),
    ]
}

#[test]
fn invalid_dimensions_are_rejected() {
    let cfg = LayoutConfig::default();
    let items = items();
    for (w, h) in [(0.0, 100.0), (100.0, -1.0), (f64::NAN, 100.0), (f64::INFINITY, 10.0)] {
        let err = layout_treemap(&items, w, h, &cfg).unwrap_err();
        assert!(matches!(err, WorkmapError::InvalidDimensions { .. }), "{w}x{h}");
    }
    for size in [0.0, -50.0, f64::NAN] {
        let err = layout_blocks(&items, size, None, &cfg).unwrap_err();
        assert!(matches!(err, WorkmapError::InvalidDimensions { .. }), "{size}");
    }
}

#[test]
fn empty_inputs_give_empty_layouts() {
    let cfg = LayoutConfig::default();
    assert!(layout_blocks(&[], 400.0, None, &cfg).expect("layout").tiles.is_empty());
    assert!(layout_treemap(&[], 1.0, 1.0, &cfg).expect("layout").tiles.is_empty());
}

#[test]
fn config_validation() {
    let bad = [
        LayoutConfig::builder().max_aspect_ratio(0.5).build(),
        LayoutConfig::builder().min_weight(0.0).build(),
        LayoutConfig::builder().block_padding(-1.0).build(),
        LayoutConfig::builder().fill_range(50.0, 20.0).build(),
        LayoutConfig::builder().fill_range(0.0, 100.0).build(),
        LayoutConfig::builder().row_headroom(0).build(),
        LayoutConfig::builder().max_columns(8).build(),
        LayoutConfig::builder()
            .size_buckets(vec![SizeBucket::new(2.0, 1), SizeBucket::new(1.0, 2)], 4)
            .build(),
        LayoutConfig::builder()
            .size_buckets(vec![SizeBucket::new(1.0, 0)], 4)
            .build(),
        LayoutConfig::builder().size_buckets(vec![], 0).build(),
        LayoutConfig::builder().with_canvas(0.0, 10.0).build(),
    ];
    for cfg in &bad {
        let err = cfg.validate().unwrap_err();
        assert!(
            matches!(
                err,
                WorkmapError::InvalidConfig(_) | WorkmapError::InvalidDimensions { .. }
            ),
            "{cfg:?}"
        );
    }
    assert!(LayoutConfig::default().validate().is_ok());
    let small = LayoutConfig::builder()
        .size_buckets(vec![SizeBucket::new(1.0, 1)], 2)
        .max_columns(2)
        .build();
    assert!(small.validate().is_ok());
    assert_eq!(small.largest_size_class(), 2);
}

#[test]
fn bad_config_fails_the_layout_call() {
    let cfg = LayoutConfig::builder().max_aspect_ratio(f64::NAN).build();
    assert!(matches!(
        layout_treemap(&items(), 100.0, 100.0, &cfg),
        Err(WorkmapError::InvalidConfig(_))
    ));
}

#[test]
fn negative_and_nan_hours_count_as_zero() {
    let items = vec![
        WorkItem::new(1, "Task", -5.0, f64::NAN),
        WorkItem::new(2, "Task", 0.0, 0.0),
    ];
    let cfg = LayoutConfig::default();
    let tm = layout_treemap(&items, 100.0, 100.0, &cfg).expect("layout");
    for t in &tm.tiles {
        assert_eq!(t.weight, 1.0);
        assert!((t.rect.area() - 5000.0).abs() < 1e-9);
    }
    let blocks = layout_blocks(&items, 100.0, Some(f64::NAN), &cfg).expect("layout");
    assert!(blocks.tiles.iter().all(|t| t.weight == 1.0));
    assert_eq!(blocks.target_fill, 1.0);
}

#[test]
fn tiny_canvas_with_many_items() {
    let items: Vec<WorkItem> = (0..50).map(|i| WorkItem::new(i, "Task", 1.0, 0.0)).collect();
    let tm = layout_treemap(&items, 3.0, 2.0, &LayoutConfig::default()).expect("layout");
    assert_eq!(tm.tiles.len(), 50);
    let canvas = Rect::new(0.0, 0.0, 3.0, 2.0);
    for t in &tm.tiles {
        assert!(t.rect.w.is_finite() && t.rect.h.is_finite());
        assert!(t.rect.w >= 0.0 && t.rect.h >= 0.0);
        assert!(t.rect.contained_in(&canvas, 1e-9), "{:?}", t.rect);
    }
    for i in 0..tm.tiles.len() {
        for j in (i + 1)..tm.tiles.len() {
            assert!(!tm.tiles[i].rect.overlaps(&tm.tiles[j].rect, 1e-9));
        }
    }
}

#[test]
fn layout_structs_check_their_inputs() {
    let items = items();
    let refs: Vec<&WorkItem> = items.iter().collect();
    let cfg = LayoutConfig::default();

    let packer = BlockPacker::new(&cfg).expect("config");
    for size in [-300.0, 0.0, f64::NAN] {
        assert!(matches!(
            packer.layout(&refs, size, None),
            Err(WorkmapError::InvalidDimensions { .. })
        ));
    }
    let treemap = SquarifiedTreemap::new(&cfg).expect("config");
    assert!(matches!(
        treemap.layout(&refs, 0.0, 400.0),
        Err(WorkmapError::InvalidDimensions { .. })
    ));

    let bad = LayoutConfig::builder().row_headroom(0).build();
    assert!(BlockPacker::new(&bad).is_err());
    let bad = LayoutConfig::builder().max_aspect_ratio(0.0).build();
    assert!(SquarifiedTreemap::new(&bad).is_err());
}

#[test]
fn error_messages() {
    let err = layout_treemap(&items(), 0.0, 5.0, &LayoutConfig::default()).unwrap_err();
    assert_eq!(err.to_string(), "Invalid canvas dimensions: 0x5");
}
