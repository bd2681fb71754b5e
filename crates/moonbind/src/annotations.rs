//! Annotation discovery for Lua-facing Rust functions.
//!
//! Scans a Rust source tree for doc comments carrying script-export tags and
//! turns them into per-module documentation, ready to render as editor
//! stubs.
//!
//! ## Annotation Format
//!
//! ```rust,ignore
//! //! String helpers for scripts.
//! //!
//! //! @luamodule strings
//!
//! /// Upper-case a string.
//! ///
//! /// @luafunc upper
//! /// @luaparam s string Input text.
//! /// @luareturn string Upper-cased text.
//! fn upper(_lua: &Lua, s: String) -> mlua::Result<String> {
//!     Ok(s.to_uppercase())
//! }
//! ```
//!
//! A `@luamodule <name>` line establishes the module for every annotated
//! function that follows, until the next marker or the end of the file.
//! `@luaannotation <text>` lines are forwarded verbatim into the generated
//! stub, letting the host emit any docstring dialect the editor tooling
//! understands without this module knowing that dialect.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Documentation for one scripting module.
#[derive(Debug, Clone)]
pub struct ModuleDoc {
    /// Module name (the `@luamodule` argument).
    pub name: String,
    /// Functions in source encounter order.
    pub functions: Vec<FunctionDoc>,
    /// Verbatim module-level annotation lines.
    pub annotations: Vec<String>,
}

/// Documentation for one exported function.
#[derive(Debug, Clone)]
pub struct FunctionDoc {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamDoc>,
    pub returns: Vec<ReturnDoc>,
    /// Verbatim function-level annotation lines.
    pub annotations: Vec<String>,
}

/// One `@luaparam name type description` entry.
#[derive(Debug, Clone)]
pub struct ParamDoc {
    pub name: String,
    pub ty: String,
    pub description: String,
}

/// One `@luareturn type description` entry.
#[derive(Debug, Clone)]
pub struct ReturnDoc {
    pub ty: String,
    pub description: String,
}

/// Extracts script-export annotations from a Rust source tree.
#[derive(Debug, Default)]
pub struct AnnotationExtractor {
    modules: BTreeMap<String, ModuleDoc>,
}

impl AnnotationExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discovered modules by name. Function order within a module follows
    /// source encounter order, which mirrors the author's intended reading
    /// order.
    pub fn modules(&self) -> &BTreeMap<String, ModuleDoc> {
        &self.modules
    }

    /// Scan a directory tree for annotated functions.
    ///
    /// Test code is excluded: `tests/` directories, `tests.rs` and
    /// `*_test(s).rs` files, and `#[cfg(test)]` modules. Files that fail to
    /// parse are skipped with a warning; discovery is best-effort.
    pub fn scan_directory(&mut self, root: impl AsRef<Path>) -> Result<()> {
        let root = root.as_ref();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry));

        for entry in walker {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().map(|e| e == "rs").unwrap_or(false) {
                self.scan_file(path);
            }
        }

        debug!(
            "annotation scan of {} found {} modules",
            root.display(),
            self.modules.len()
        );
        Ok(())
    }

    /// Scan a single source file. The module marker resets at each file
    /// boundary; a module may span files by repeating its marker.
    fn scan_file(&mut self, path: &Path) {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                warn!("failed to read {}: {}", path.display(), e);
                return;
            }
        };
        let file = match syn::parse_file(&source) {
            Ok(file) => file,
            Err(e) => {
                warn!("failed to parse {}: {}", path.display(), e);
                return;
            }
        };

        let mut current: Option<String> = None;
        self.absorb_comment(&doc_lines(&file.attrs), &mut current);
        self.walk_items(&file.items, &mut current);
    }

    fn walk_items(&mut self, items: &[syn::Item], current: &mut Option<String>) {
        for item in items {
            match item {
                syn::Item::Fn(f) => {
                    self.absorb_comment(&doc_lines(&f.attrs), current);
                }
                syn::Item::Mod(m) => {
                    if m.attrs.iter().any(is_cfg_test) {
                        continue;
                    }
                    self.absorb_comment(&doc_lines(&m.attrs), current);
                    if let Some((_, items)) = &m.content {
                        self.walk_items(items, current);
                    }
                }
                syn::Item::Impl(i) => {
                    for impl_item in &i.items {
                        if let syn::ImplItem::Fn(f) = impl_item {
                            self.absorb_comment(&doc_lines(&f.attrs), current);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Run the tag state machine over one doc comment.
    fn absorb_comment(&mut self, lines: &[String], current: &mut Option<String>) {
        let mut pending: Vec<String> = Vec::new();
        let mut function: Option<FunctionDoc> = None;
        let mut module_declared_here = false;

        for line in lines {
            if let Some(rest) = tag_rest(line, "@luamodule") {
                self.finish_function(function.take(), current);
                let Some(name) = rest.split_whitespace().next() else {
                    warn!("@luamodule without a name");
                    continue;
                };
                self.modules
                    .entry(name.to_string())
                    .or_insert_with(|| ModuleDoc {
                        name: name.to_string(),
                        functions: Vec::new(),
                        annotations: Vec::new(),
                    });
                *current = Some(name.to_string());
                module_declared_here = true;
                pending.clear();
            } else if let Some(rest) = tag_rest(line, "@luafunc") {
                self.finish_function(function.take(), current);
                let Some(name) = rest.split_whitespace().next() else {
                    warn!("@luafunc without a name");
                    pending.clear();
                    continue;
                };
                if current.is_none() {
                    warn!("@luafunc {name} found before any @luamodule marker; dropped");
                    pending.clear();
                    continue;
                }
                function = Some(FunctionDoc {
                    name: name.to_string(),
                    description: pending.join(" "),
                    params: Vec::new(),
                    returns: Vec::new(),
                    annotations: Vec::new(),
                });
                pending.clear();
            } else if let Some(rest) = tag_rest(line, "@luaparam") {
                if let Some(function) = &mut function {
                    if let Some(param) = parse_param(rest) {
                        function.params.push(param);
                    } else {
                        warn!("malformed @luaparam: {rest}");
                    }
                }
            } else if let Some(rest) = tag_rest(line, "@luareturn") {
                if let Some(function) = &mut function {
                    if let Some(ret) = parse_return(rest) {
                        function.returns.push(ret);
                    } else {
                        warn!("malformed @luareturn: {rest}");
                    }
                }
            } else if let Some(rest) = tag_rest(line, "@luaannotation") {
                if let Some(function) = &mut function {
                    function.annotations.push(rest.to_string());
                } else if module_declared_here {
                    if let Some(name) = current.as_ref() {
                        if let Some(module) = self.modules.get_mut(name) {
                            module.annotations.push(rest.to_string());
                        }
                    }
                }
            } else if !line.starts_with('@') && !line.is_empty() {
                pending.push(line.clone());
            }
        }

        self.finish_function(function, current);
    }

    fn finish_function(&mut self, function: Option<FunctionDoc>, current: &Option<String>) {
        let Some(function) = function else { return };
        let Some(name) = current.as_ref() else { return };
        if let Some(module) = self.modules.get_mut(name) {
            debug!("discovered {}.{}", module.name, function.name);
            module.functions.push(function);
        }
    }

    /// Render one module as a function stub block.
    ///
    /// No `---@meta` header here; the stub generator (or a standalone
    /// caller) prepends one.
    pub fn generate_module_stub(&self, name: &str) -> Result<String> {
        let module = self
            .modules
            .get(name)
            .ok_or_else(|| Error::ModuleNotFound(name.to_string()))?;

        let mut out = String::new();
        for annotation in &module.annotations {
            writeln!(out, "---{annotation}")?;
        }
        writeln!(out, "local {} = {{}}", module.name)?;
        writeln!(out)?;

        for function in &module.functions {
            if !function.description.is_empty() {
                writeln!(out, "---{}", function.description)?;
            }
            for param in &function.params {
                if param.description.is_empty() {
                    writeln!(out, "---@param {} {}", param.name, param.ty)?;
                } else {
                    writeln!(out, "---@param {} {} {}", param.name, param.ty, param.description)?;
                }
            }
            for ret in &function.returns {
                if ret.description.is_empty() {
                    writeln!(out, "---@return {}", ret.ty)?;
                } else {
                    writeln!(out, "---@return {} {}", ret.ty, ret.description)?;
                }
            }
            for annotation in &function.annotations {
                writeln!(out, "---{annotation}")?;
            }
            let params: Vec<&str> = function.params.iter().map(|p| p.name.as_str()).collect();
            writeln!(
                out,
                "function {}.{}({}) end",
                module.name,
                function.name,
                params.join(", ")
            )?;
            writeln!(out)?;
        }

        writeln!(out, "return {}", module.name)?;
        Ok(out)
    }
}

/// Strip a tag prefix, requiring a word boundary after it.
fn tag_rest<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(tag)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

/// Parse `name type Description text`.
fn parse_param(rest: &str) -> Option<ParamDoc> {
    let parts: Vec<&str> = rest.splitn(3, ' ').collect();
    if parts.len() < 2 {
        return None;
    }
    Some(ParamDoc {
        name: parts[0].to_string(),
        ty: parts[1].to_string(),
        description: parts.get(2).map(|s| s.trim().to_string()).unwrap_or_default(),
    })
}

/// Parse `type Description text`.
fn parse_return(rest: &str) -> Option<ReturnDoc> {
    let parts: Vec<&str> = rest.splitn(2, ' ').collect();
    if parts.is_empty() || parts[0].is_empty() {
        return None;
    }
    Some(ReturnDoc {
        ty: parts[0].to_string(),
        description: parts.get(1).map(|s| s.trim().to_string()).unwrap_or_default(),
    })
}

/// Collect `#[doc]` attribute values in order, trimmed.
fn doc_lines(attrs: &[syn::Attribute]) -> Vec<String> {
    let mut lines = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        if let syn::Meta::NameValue(nv) = &attr.meta {
            if let syn::Expr::Lit(lit) = &nv.value {
                if let syn::Lit::Str(s) = &lit.lit {
                    lines.push(s.value().trim().to_string());
                }
            }
        }
    }
    lines
}

fn is_cfg_test(attr: &syn::Attribute) -> bool {
    attr.path().is_ident("cfg")
        && attr
            .parse_args::<syn::Ident>()
            .map(|ident| ident == "test")
            .unwrap_or(false)
}

fn is_excluded(entry: &walkdir::DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    if entry.file_type().is_dir() {
        return name == "tests" || name == "target" || name.starts_with('.');
    }
    name == "tests.rs" || name.ends_with("_test.rs") || name.ends_with("_tests.rs")
}
