//! Bidirectional value translation between host values and Lua.
//!
//! Both directions funnel through a JSON-shaped intermediate form
//! (`serde_json::Value`), so a single array-vs-map classification rule and a
//! single numeric representation (double precision) cover the whole boundary.
//! Integers above 2^53 lose precision crossing it; this is the documented
//! wire contract, not an accident.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let lua = Lua::new();
//! let value = convert::to_lua(&lua, &record)?;
//! // ... hand `value` to a script, get a table back ...
//! let mut out = Record::default();
//! convert::from_lua(&lua, &modified, &mut out)?;
//! ```

use crate::error::{Error, Result};
use mlua::{Lua, LuaSerdeExt, Table, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Convert a host value into a Lua value owned by `lua`.
///
/// Fails with [`Error::Serialization`] when the value cannot be represented
/// in the intermediate form (non-string map keys, serializer-rejecting
/// types).
pub fn to_lua<T: Serialize + ?Sized>(lua: &Lua, value: &T) -> Result<Value> {
    let json = serde_json::to_value(value).map_err(|e| Error::Serialization(e.to_string()))?;
    json_to_lua(lua, &json)
}

/// Convert a Lua value back into a host value, assigning into `out`.
///
/// A `Nil` source is a no-op: `out` keeps its current value and no error is
/// raised. Shape mismatches surface as [`Error::Deserialization`] with the
/// underlying decoder message.
pub fn from_lua<T: DeserializeOwned>(lua: &Lua, value: &Value, out: &mut T) -> Result<()> {
    if matches!(value, Value::Nil) {
        return Ok(());
    }
    let json = lua_to_json(lua, value)?;
    *out = serde_json::from_value(json).map_err(|e| Error::Deserialization(e.to_string()))?;
    Ok(())
}

/// Recursively convert an intermediate-form node into a Lua value.
///
/// Arrays become 1-based sequence tables carrying mlua's array metatable, so
/// an empty sequence keeps its kind on the way back (see [`lua_to_json`]).
/// A null inside a container elides: a nil-valued Lua table entry is absent.
pub fn json_to_lua(lua: &Lua, json: &JsonValue) -> Result<Value> {
    Ok(match json {
        JsonValue::Null => Value::Nil,
        JsonValue::Bool(b) => Value::Boolean(*b),
        JsonValue::Number(n) => {
            let f = n
                .as_f64()
                .ok_or_else(|| Error::Serialization(format!("number {n} does not fit a double")))?;
            Value::Number(f)
        }
        JsonValue::String(s) => Value::String(lua.create_string(s)?),
        JsonValue::Array(items) => {
            let table = lua.create_table_with_capacity(items.len(), 0)?;
            for (i, item) in items.iter().enumerate() {
                table.raw_set(i + 1, json_to_lua(lua, item)?)?;
            }
            let _ = table.set_metatable(Some(lua.array_metatable()));
            Value::Table(table)
        }
        JsonValue::Object(map) => {
            let table = lua.create_table_with_capacity(0, map.len())?;
            for (key, item) in map {
                table.raw_set(key.as_str(), json_to_lua(lua, item)?)?;
            }
            Value::Table(table)
        }
    })
}

/// Recursively convert a Lua value into the intermediate form.
///
/// Tables classify as arrays when every key is an integer in 1..=N with all
/// N entries present; the array metatable settles the empty case. Everything
/// else is an object with stringified keys.
pub fn lua_to_json(lua: &Lua, value: &Value) -> Result<JsonValue> {
    Ok(match value {
        Value::Nil => JsonValue::Null,
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Integer(i) => JsonValue::Number((*i).into()),
        Value::Number(f) => number_to_json(*f)?,
        Value::String(s) => JsonValue::String(lua_string(s)?),
        Value::Table(table) => table_to_json(lua, table)?,
        other => {
            return Err(Error::Deserialization(format!(
                "unsupported value kind: {}",
                other.type_name()
            )))
        }
    })
}

/// Integral doubles become integer nodes so typed integer targets decode;
/// everything else stays a double. Non-finite values are unrepresentable.
fn number_to_json(f: f64) -> Result<JsonValue> {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        return Ok(JsonValue::Number((f as i64).into()));
    }
    serde_json::Number::from_f64(f)
        .map(JsonValue::Number)
        .ok_or_else(|| {
            Error::Deserialization(format!("number {f} is not representable in the intermediate form"))
        })
}

fn lua_string(s: &mlua::String) -> Result<String> {
    let s = s
        .to_str()
        .map_err(|e| Error::Deserialization(format!("invalid string: {e}")))?;
    Ok(s.to_string())
}

fn table_to_json(lua: &Lua, table: &Table) -> Result<JsonValue> {
    let mut entries: Vec<(Value, Value)> = Vec::new();
    for pair in table.clone().pairs::<Value, Value>() {
        entries.push(pair?);
    }

    let all_int = entries
        .iter()
        .all(|(k, _)| matches!(k, Value::Integer(i) if *i >= 1));
    let max = entries
        .iter()
        .filter_map(|(k, _)| match k {
            Value::Integer(i) => Some(*i),
            _ => None,
        })
        .max()
        .unwrap_or(0);
    let contiguous = all_int && max as usize == entries.len();

    if contiguous && (max > 0 || is_array_tagged(lua, table)) {
        let mut items = vec![JsonValue::Null; max as usize];
        for (key, item) in entries {
            if let Value::Integer(i) = key {
                items[(i - 1) as usize] = lua_to_json(lua, &item)?;
            }
        }
        return Ok(JsonValue::Array(items));
    }

    let mut map = serde_json::Map::new();
    for (key, item) in entries {
        let key = match key {
            Value::String(s) => lua_string(&s)?,
            Value::Integer(i) => i.to_string(),
            Value::Number(f) => f.to_string(),
            other => {
                return Err(Error::Deserialization(format!(
                    "unsupported table key: {}",
                    other.type_name()
                )))
            }
        };
        map.insert(key, lua_to_json(lua, &item)?);
    }
    Ok(JsonValue::Object(map))
}

fn is_array_tagged(lua: &Lua, table: &Table) -> bool {
    table
        .metatable()
        .is_some_and(|mt| mt.to_pointer() == lua.array_metatable().to_pointer())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    struct Child {
        label: String,
        weight: f64,
    }

    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    struct Record {
        name: String,
        count: i64,
        ratio: f64,
        enabled: bool,
        nickname: Option<String>,
        children: Vec<Child>,
        scores: HashMap<String, i64>,
    }

    fn sample() -> Record {
        Record {
            name: "alpha".to_string(),
            count: 42,
            ratio: 2.5,
            enabled: true,
            nickname: Some("al".to_string()),
            children: vec![
                Child {
                    label: "first".to_string(),
                    weight: 1.0,
                },
                Child {
                    label: "second".to_string(),
                    weight: 0.5,
                },
            ],
            scores: HashMap::from([("a".to_string(), 1), ("b".to_string(), 2)]),
        }
    }

    #[test]
    fn test_round_trip_record() {
        let lua = Lua::new();
        let original = sample();

        let value = to_lua(&lua, &original).unwrap();
        let mut decoded = Record::default();
        from_lua(&lua, &value, &mut decoded).unwrap();

        assert_eq!(decoded.name, original.name);
        assert_eq!(decoded.count, original.count);
        assert!((decoded.ratio - original.ratio).abs() < f64::EPSILON);
        assert_eq!(decoded.enabled, original.enabled);
        assert_eq!(decoded.nickname, original.nickname);
        assert_eq!(decoded.children, original.children);
        assert_eq!(decoded.scores, original.scores);
    }

    #[test]
    fn test_sequence_converts_to_one_based_array() {
        let lua = Lua::new();
        let value = to_lua(&lua, &vec![10i64, 20, 30]).unwrap();

        let Value::Table(table) = value else {
            panic!("expected a table");
        };
        assert_eq!(table.raw_len(), 3);
        assert_eq!(table.raw_get::<f64>(1).unwrap(), 10.0);
        assert_eq!(table.raw_get::<f64>(3).unwrap(), 30.0);
    }

    #[test]
    fn test_empty_containers_keep_their_kind() {
        let lua = Lua::new();

        let value = to_lua(&lua, &Vec::<i64>::new()).unwrap();
        assert!(matches!(value, Value::Table(_)));
        let mut seq = vec![1i64];
        from_lua(&lua, &value, &mut seq).unwrap();
        assert!(seq.is_empty());

        let value = to_lua(&lua, &HashMap::<String, i64>::new()).unwrap();
        assert!(matches!(value, Value::Table(_)));
        let mut map = HashMap::from([("x".to_string(), 1i64)]);
        from_lua(&lua, &value, &mut map).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_nil_propagation() {
        let lua = Lua::new();

        let value = to_lua(&lua, &Option::<i64>::None).unwrap();
        assert!(matches!(value, Value::Nil));

        let mut target = 0i64;
        from_lua(&lua, &Value::Nil, &mut target).unwrap();
        assert_eq!(target, 0);

        let mut text = String::new();
        from_lua(&lua, &Value::Nil, &mut text).unwrap();
        assert!(text.is_empty());
    }

    #[test]
    fn test_script_table_classification() {
        let lua = Lua::new();

        lua.load("seq = {1, 2, 3}").exec().unwrap();
        let value: Value = lua.globals().get("seq").unwrap();
        let mut seq = Vec::<i64>::new();
        from_lua(&lua, &value, &mut seq).unwrap();
        assert_eq!(seq, vec![1, 2, 3]);

        lua.load("obj = { name = 'x', count = 2 }").exec().unwrap();
        let value: Value = lua.globals().get("obj").unwrap();
        let json = lua_to_json(&lua, &value).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "x", "count": 2 }));
    }

    #[test]
    fn test_sparse_and_mixed_tables_become_objects() {
        let lua = Lua::new();

        lua.load("sparse = { [1] = 'a', [3] = 'c' }").exec().unwrap();
        let value: Value = lua.globals().get("sparse").unwrap();
        let json = lua_to_json(&lua, &value).unwrap();
        assert_eq!(json, serde_json::json!({ "1": "a", "3": "c" }));

        lua.load("mixed = { 'a', name = 'x' }").exec().unwrap();
        let value: Value = lua.globals().get("mixed").unwrap();
        let json = lua_to_json(&lua, &value).unwrap();
        assert_eq!(json, serde_json::json!({ "1": "a", "name": "x" }));
    }

    #[test]
    fn test_boolean_table_key_is_an_error() {
        let lua = Lua::new();
        lua.load("bad = { [true] = 1 }").exec().unwrap();
        let value: Value = lua.globals().get("bad").unwrap();
        let err = lua_to_json(&lua, &value).unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));
    }

    #[test]
    fn test_shape_mismatch_is_an_error() {
        let lua = Lua::new();
        lua.load("obj = { name = 'x' }").exec().unwrap();
        let value: Value = lua.globals().get("obj").unwrap();
        let mut target = 0i64;
        let err = from_lua(&lua, &value, &mut target).unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));
    }

    #[test]
    fn test_function_value_is_an_error() {
        let lua = Lua::new();
        lua.load("f = function() end").exec().unwrap();
        let value: Value = lua.globals().get("f").unwrap();
        let err = lua_to_json(&lua, &value).unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));
    }

    #[test]
    fn test_precision_truncates_above_2_pow_53() {
        let lua = Lua::new();
        let big: i64 = (1i64 << 53) + 1;

        let value = to_lua(&lua, &big).unwrap();
        let mut decoded = 0i64;
        from_lua(&lua, &value, &mut decoded).unwrap();

        // The double-precision intermediate cannot hold 2^53 + 1.
        assert_eq!(decoded, 1i64 << 53);
        assert_ne!(decoded, big);
    }

    // Nulls are excluded: inside a container they elide (nil entries are
    // absent in Lua). Integers stay within the double-exact range.
    fn json_leaf() -> impl Strategy<Value = JsonValue> {
        prop_oneof![
            any::<bool>().prop_map(JsonValue::Bool),
            (-(1i64 << 53)..(1i64 << 53)).prop_map(|i| JsonValue::Number(i.into())),
            "[a-z]{0,8}".prop_map(JsonValue::String),
        ]
    }

    fn json_value() -> impl Strategy<Value = JsonValue> {
        json_leaf().prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..4).prop_map(JsonValue::Array),
                proptest::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                    .prop_map(|m| JsonValue::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_intermediate_form_round_trips(json in json_value()) {
            let lua = Lua::new();
            let value = json_to_lua(&lua, &json).unwrap();
            let back = lua_to_json(&lua, &value).unwrap();
            prop_assert_eq!(back, json);
        }
    }
}
