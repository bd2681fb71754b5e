//! Script-side logging.
//!
//! @luamodule log
//!
//! Messages are forwarded to the host's `tracing` subscriber under the
//! `moonbind::script` target, so script output follows whatever filtering
//! and formatting the host configured.

use crate::error::Result;
use mlua::Lua;
use tracing::{debug, error, info, warn};

/// Record a message at debug level.
///
/// @luafunc debug
/// @luaparam message string Message to record.
fn log_debug(_lua: &Lua, message: String) -> mlua::Result<()> {
    debug!(target: "moonbind::script", "{message}");
    Ok(())
}

/// Record a message at info level.
///
/// @luafunc info
/// @luaparam message string Message to record.
fn log_info(_lua: &Lua, message: String) -> mlua::Result<()> {
    info!(target: "moonbind::script", "{message}");
    Ok(())
}

/// Record a message at warn level.
///
/// @luafunc warn
/// @luaparam message string Message to record.
fn log_warn(_lua: &Lua, message: String) -> mlua::Result<()> {
    warn!(target: "moonbind::script", "{message}");
    Ok(())
}

/// Record a message at error level.
///
/// @luafunc error
/// @luaparam message string Message to record.
fn log_error(_lua: &Lua, message: String) -> mlua::Result<()> {
    error!(target: "moonbind::script", "{message}");
    Ok(())
}

/// Register the `log` global table.
pub fn register(lua: &Lua) -> Result<()> {
    let module = lua.create_table()?;
    module.set("debug", lua.create_function(log_debug)?)?;
    module.set("info", lua.create_function(log_info)?)?;
    module.set("warn", lua.create_function(log_warn)?)?;
    module.set("error", lua.create_function(log_error)?)?;
    lua.globals().set("log", module)?;
    Ok(())
}
