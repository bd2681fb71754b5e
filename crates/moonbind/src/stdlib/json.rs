//! JSON encoding and decoding for Lua scripts.
//!
//! @luamodule json
//!
//! ## Usage in Lua
//!
//! ```lua
//! local obj = json.decode('{"name": "Alice"}')
//! obj.visits = (obj.visits or 0) + 1
//! local text = json.encode(obj)
//! local pretty = json.pretty(obj)
//! ```

use crate::convert::{json_to_lua, lua_to_json};
use crate::error::Result;
use mlua::{Lua, Value};

/// Encode a Lua value as compact JSON text.
///
/// @luafunc encode
/// @luaparam value any Value to encode.
/// @luareturn string Compact JSON text.
fn encode(lua: &Lua, value: Value) -> mlua::Result<String> {
    let json = lua_to_json(lua, &value).map_err(mlua::Error::external)?;
    serde_json::to_string(&json).map_err(mlua::Error::external)
}

/// Encode a Lua value as pretty-printed JSON text.
///
/// @luafunc pretty
/// @luaparam value any Value to encode.
/// @luareturn string Indented JSON text.
fn pretty(lua: &Lua, value: Value) -> mlua::Result<String> {
    let json = lua_to_json(lua, &value).map_err(mlua::Error::external)?;
    serde_json::to_string_pretty(&json).map_err(mlua::Error::external)
}

/// Parse JSON text into a Lua value.
///
/// @luafunc decode
/// @luaparam text string JSON text to parse.
/// @luareturn any Decoded value.
fn decode(lua: &Lua, text: String) -> mlua::Result<Value> {
    let json: serde_json::Value = serde_json::from_str(&text).map_err(mlua::Error::external)?;
    json_to_lua(lua, &json).map_err(mlua::Error::external)
}

/// Register the `json` global table.
pub fn register(lua: &Lua) -> Result<()> {
    let module = lua.create_table()?;
    module.set("encode", lua.create_function(encode)?)?;
    module.set("pretty", lua.create_function(pretty)?)?;
    module.set("decode", lua.create_function(decode)?)?;
    lua.globals().set("json", module)?;
    Ok(())
}
