//! Typed Lua scripting bridge for Rust hosts.
//!
//! Moonbind exposes typed Rust data and functions to an embedded Lua 5.4
//! runtime and hands modified data back, and generates LuaCATS editor stubs
//! describing the exposed surface.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  host record (serde + #[derive(LuaTyped)])   │
//! └──────────────────────────────────────────────┘
//!        │ convert                │ registry
//!        ▼                        ▼
//! ┌─────────────────┐   ┌─────────────────────────┐
//! │ JSON-shaped     │   │ TypeInfo walk            │
//! │ intermediate    │   │ (cycle-safe, dedup'd)    │
//! └─────────────────┘   └─────────────────────────┘
//!        │                        │
//!        ▼                        ▼
//! ┌─────────────────┐   ┌─────────────────────────┐
//! │ mlua::Value     │   │ ---@class / ---@field    │
//! │ (scripts)       │   │ stubs (editor tooling)   │
//! └─────────────────┘   └─────────────────────────┘
//! ```
//!
//! The annotation extractor mines `@luamodule` / `@luafunc` tags out of Rust
//! doc comments, and the stub generator merges both outputs into one stub
//! file per scripting module.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use moonbind::{convert, Engine, LuaTyped, TypeRegistry};
//!
//! #[derive(serde::Serialize, serde::Deserialize, LuaTyped, Default)]
//! struct Task {
//!     title: String,
//!     done: bool,
//! }
//!
//! let engine = Engine::new()?;
//! engine.set_global("task", &Task { title: "ship".into(), done: false })?;
//! engine.exec("task.done = true")?;
//! let task: Task = engine.global("task")?;
//!
//! let mut registry = TypeRegistry::new();
//! registry.register::<Task>()?;
//! registry.process()?;
//! let stubs = registry.generate_stubs()?;
//! ```

pub mod annotations;
pub mod convert;
pub mod engine;
mod error;
pub mod registry;
pub mod stdlib;
pub mod stubgen;
pub mod typeinfo;

pub use annotations::{AnnotationExtractor, FunctionDoc, ModuleDoc, ParamDoc, ReturnDoc};
pub use engine::Engine;
pub use error::{Error, Result};
pub use registry::{FieldDescriptor, TypeDescriptor, TypeRegistry};
pub use stubgen::StubGenerator;
pub use typeinfo::{Field, LuaTyped, Primitive, RecordInfo, TypeInfo};

pub use moonbind_macros::LuaTyped;
