use rand::{Rng, SeedableRng};
use workmap_core::prelude::*;

fn random_items(seed: u64, n: u64) -> Vec<WorkItem> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let kind = if rng.gen_bool(0.7) { "Task" } else { "Bug" };
            WorkItem::new(i, kind, rng.gen_range(0.0..10.0), rng.gen_range(0.0..5.0))
        })
        .collect()
}

#[test]
fn repeated_calls_are_identical() {
    let items = random_items(42, 60);
    let cfg = LayoutConfig::default();

    let a = layout_treemap(&items, 500.0, 350.0, &cfg).expect("layout");
    let b = layout_treemap(&items, 500.0, 350.0, &cfg).expect("layout");
    assert_eq!(a, b);

    let a = layout_blocks(&items, 480.0, Some(70.0), &cfg).expect("layout");
    let b = layout_blocks(&items, 480.0, Some(70.0), &cfg).expect("layout");
    assert_eq!(a, b);
    assert_eq!(to_json(&a), to_json(&b));
}

#[test]
fn cloned_input_gives_same_rects() {
    let items = random_items(9, 25);
    let copy = items.clone();
    let cfg = LayoutConfig::default();
    let a = layout_blocks(&items, 400.0, None, &cfg).expect("layout");
    let b = layout_blocks(&copy, 400.0, None, &cfg).expect("layout");
    let ra: Vec<(u64, Rect)> = a.tiles.iter().map(|t| (t.item.id, t.rect)).collect();
    let rb: Vec<(u64, Rect)> = b.tiles.iter().map(|t| (t.item.id, t.rect)).collect();
    assert_eq!(ra, rb);
}
