//! Lua standard-library modules.
//!
//! Direct, stateless wrappers over host libraries, registered as global
//! tables in the VM. Each module's source carries the `@luamodule` /
//! `@luafunc` annotation tags, so scanning this crate's own tree produces
//! their editor stubs.

pub mod json;
pub mod log;

use crate::error::Result;
use mlua::Lua;

/// Register every stdlib module into a VM.
pub fn register_all(lua: &Lua) -> Result<()> {
    json::register(lua)?;
    log::register(lua)?;
    Ok(())
}
