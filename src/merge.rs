use serde_json::Value;

/// Deep-merge `overlay` on top of `base`.
/// If both sides have an object for the same key, recurse.
/// A `null` in the overlay leaves the base untouched.
/// Otherwise, `overlay`'s value wins.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_obj), Value::Object(overlay_obj)) => {
            for (key, overlay_val) in overlay_obj {
                let merged = match base_obj.remove(&key) {
                    Some(base_val) => deep_merge(base_val, overlay_val),
                    None => overlay_val,
                };
                base_obj.insert(key, merged);
            }
            Value::Object(base_obj)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}
