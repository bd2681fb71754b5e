//! Lua VM wrapper.
//!
//! Owns one `mlua::Lua` instance with the stdlib modules registered, and
//! moves data across the boundary through the value translator so scripts
//! receive and return plain Rust values.
//!
//! A VM instance is not safe for concurrent use: construct one [`Engine`]
//! per logical thread and never share it.

use crate::convert;
use crate::error::Result;
use crate::stdlib;
use mlua::{Lua, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A Lua VM with the moonbind stdlib registered.
pub struct Engine {
    lua: Lua,
}

impl Engine {
    pub fn new() -> Result<Self> {
        let lua = Lua::new();
        stdlib::register_all(&lua)?;
        Ok(Self { lua })
    }

    /// The underlying VM, for direct mlua access.
    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    /// Execute a chunk of Lua source.
    pub fn exec(&self, source: &str) -> Result<()> {
        self.lua.load(source).exec()?;
        Ok(())
    }

    /// Evaluate a Lua expression and translate the result back into a host
    /// value. A nil result leaves the default value untouched.
    pub fn eval<T: DeserializeOwned + Default>(&self, source: &str) -> Result<T> {
        let value: Value = self.lua.load(source).eval()?;
        let mut out = T::default();
        convert::from_lua(&self.lua, &value, &mut out)?;
        Ok(out)
    }

    /// Set a global from a host value.
    pub fn set_global<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let value = convert::to_lua(&self.lua, value)?;
        self.lua.globals().set(name, value)?;
        Ok(())
    }

    /// Read a global back into a host value.
    pub fn global<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        let value: Value = self.lua.globals().get(name)?;
        let mut out = T::default();
        convert::from_lua(&self.lua, &value, &mut out)?;
        Ok(out)
    }
}
