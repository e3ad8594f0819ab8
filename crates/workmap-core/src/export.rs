use crate::layout::TileSet;
use crate::model::Tile;
use serde_json::{Value, json};

fn tile_value(t: &Tile<'_>) -> Value {
    json!({
        "id": t.item.id,
        "type": t.item.kind,
        "priority": t.item.priority,
        "x": t.rect.x,
        "y": t.rect.y,
        "w": t.rect.w,
        "h": t.rect.h,
        "weight": t.weight,
    })
}

/// Serialize a layout as `{ canvas, tiles: [...], unplaced: [id...], stats }`.
/// Tiles keep placement order, which is what renderers paint in.
pub fn to_json<'a, L: TileSet<'a>>(layout: &L) -> Value {
    let canvas = layout.canvas();
    let tiles: Vec<Value> = layout.tiles().iter().map(tile_value).collect();
    let unplaced: Vec<u64> = layout.unplaced().iter().map(|it| it.id).collect();
    json!({
        "canvas": {"w": canvas.w, "h": canvas.h},
        "tiles": tiles,
        "unplaced": unplaced,
        "stats": layout.stats(),
    })
}

/// Tiles keyed by work item id.
/// Shape: `{ tiles: { "<id>": { type, priority, x, y, w, h, weight, order } }, unplaced, canvas }`.
pub fn to_json_by_id<'a, L: TileSet<'a>>(layout: &L) -> Value {
    let canvas = layout.canvas();
    let mut tiles = serde_json::Map::new();
    for (order, t) in layout.tiles().iter().enumerate() {
        let mut v = tile_value(t);
        if let Some(obj) = v.as_object_mut() {
            obj.remove("id");
            obj.insert("order".into(), json!(order));
        }
        tiles.insert(t.item.id.to_string(), v);
    }
    let unplaced: Vec<u64> = layout.unplaced().iter().map(|it| it.id).collect();
    json!({
        "tiles": tiles,
        "unplaced": unplaced,
        "canvas": {"w": canvas.w, "h": canvas.h},
    })
}
