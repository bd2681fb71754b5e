//! Type registry and class-annotation generation.
//!
//! Hosts register root types, then [`TypeRegistry::process`] walks their
//! [`TypeInfo`](crate::typeinfo::TypeInfo) trees, discovering nested and
//! cyclic records, and [`TypeRegistry::generate_stubs`] renders the result
//! as LuaCATS `---@class` / `---@field` annotations for editor tooling.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut registry = TypeRegistry::new();
//! registry.register::<Deployment>()?;
//! registry.process()?;
//! let stubs = registry.generate_stubs()?;
//! ```
//!
//! Output is deterministic: stable identity keys plus name-sorted emission
//! mean regenerated files diff cleanly in version control.

use std::collections::{BTreeMap, VecDeque};
use std::fmt::Write as _;

use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::typeinfo::{LuaTyped, RecordInfo, TypeInfo};

/// First line of the export-table boilerplate; the stub generator strips
/// everything from this line on when building per-module files.
pub(crate) const EXPORT_TABLE_MARKER: &str = "local types = {}";

/// A discovered record type.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    /// Display name, e.g. `appsv1.Deployment`.
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

/// One field of a discovered record.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// External (serialized) field name.
    pub name: String,
    /// Type marker: `string`, `number`, `Node[]`, `table<string, any>`, ...
    pub ty: String,
}

/// Registry of host types exposed to Lua.
pub struct TypeRegistry {
    /// Roots awaiting processing, FIFO.
    queue: VecDeque<TypeInfo>,
    /// Discovered records by identity key.
    types: BTreeMap<String, TypeDescriptor>,
    /// Matches grouped-API version segments (v1, v2alpha1, v1beta2, ...).
    version_re: Regex,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            types: BTreeMap::new(),
            version_re: Regex::new(r"^v\d+(?:(?:alpha|beta)\d+)?$").unwrap(),
        }
    }

    /// Enqueue a root type for the next [`process`](Self::process) run.
    ///
    /// Fails only when the root is untyped (resolves straight to the `any`
    /// marker); the registry is left unchanged in that case.
    pub fn register<T: LuaTyped>(&mut self) -> Result<()> {
        self.register_info(T::type_info())
    }

    /// Enqueue an already-built type description.
    pub fn register_info(&mut self, info: TypeInfo) -> Result<()> {
        if matches!(info, TypeInfo::Any) {
            return Err(Error::Registration(
                "cannot register an untyped root".to_string(),
            ));
        }
        self.queue.push_back(info);
        Ok(())
    }

    /// Drain the registration queue, discovering nested and cyclic records.
    ///
    /// Never fails: unknown shapes degrade to the `any` marker, since stub
    /// generation is advisory tooling rather than a correctness path.
    pub fn process(&mut self) -> Result<()> {
        while let Some(info) = self.queue.pop_front() {
            let marker = self.resolve(&info);
            debug!("processed root type: {marker}");
        }
        Ok(())
    }

    /// Number of discovered record types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Resolve a type description to its annotation marker, registering any
    /// records encountered along the way.
    fn resolve(&mut self, info: &TypeInfo) -> String {
        match info {
            TypeInfo::Primitive(p) => p.marker().to_string(),
            TypeInfo::Sequence(element) => format!("{}[]", self.resolve(element)),
            TypeInfo::Mapping(value) => format!("table<string, {}>", self.resolve(value)),
            TypeInfo::Record(record) => self.resolve_record(record),
            TypeInfo::Any => "any".to_string(),
        }
    }

    fn resolve_record(&mut self, record: &RecordInfo) -> String {
        // Cycle break: a previously seen identity resolves to its display
        // name without recursing into fields.
        if let Some(existing) = self.types.get(record.id) {
            return existing.name.clone();
        }

        let display = self.display_name(record);

        // Insert before walking fields so cyclic visits find the entry.
        self.types.insert(
            record.id.to_string(),
            TypeDescriptor {
                name: display.clone(),
                fields: Vec::new(),
            },
        );

        let mut fields = Vec::new();
        for field in (record.fields)() {
            let marker = self.resolve(&(field.info)());
            fields.push(FieldDescriptor {
                name: field.name.to_string(),
                ty: marker,
            });
        }

        if let Some(descriptor) = self.types.get_mut(record.id) {
            descriptor.fields = fields;
        }

        display
    }

    /// Display name for a record: `segment.TypeName`, where types under a
    /// grouped-API convention (a trailing version segment like `v1` or
    /// `v1beta2`) collapse to `groupversion.TypeName` for readability. The
    /// identity key stays the full origin path and is never displayed.
    fn display_name(&self, record: &RecordInfo) -> String {
        let segments: Vec<&str> = record.module_path.split("::").collect();
        match segments.as_slice() {
            [.., group, version] if self.version_re.is_match(version) => {
                format!("{group}{version}.{}", record.name)
            }
            [.., last] => format!("{last}.{}", record.name),
            [] => record.name.to_string(),
        }
    }

    /// Render every discovered record as a `---@class` block, fields sorted
    /// by name, followed by the export table listing all type names.
    ///
    /// Two calls with identical registrations produce byte-identical text.
    pub fn generate_stubs(&self) -> Result<String> {
        let mut descriptors: Vec<(&String, &TypeDescriptor)> = self.types.iter().collect();
        descriptors.sort_by(|(id_a, a), (id_b, b)| a.name.cmp(&b.name).then(id_a.cmp(id_b)));

        let mut out = String::new();
        writeln!(out, "---@meta")?;
        writeln!(out)?;

        for (_, descriptor) in &descriptors {
            writeln!(out, "---@class {}", descriptor.name)?;
            let mut fields: Vec<&FieldDescriptor> = descriptor.fields.iter().collect();
            fields.sort_by(|a, b| a.name.cmp(&b.name));
            for field in fields {
                writeln!(out, "---@field {} {}", field.name, field.ty)?;
            }
            writeln!(out)?;
        }

        writeln!(out, "{EXPORT_TABLE_MARKER}")?;
        writeln!(out)?;
        for (_, descriptor) in &descriptors {
            writeln!(out, "types[\"{}\"] = {{}}", descriptor.name)?;
        }
        writeln!(out)?;
        writeln!(out, "return types")?;

        Ok(out)
    }
}
