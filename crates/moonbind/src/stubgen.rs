//! Stub file composition.
//!
//! Pure composition over the type registry and the annotation extractor:
//! per-module stub files carry the registered class definitions followed by
//! the module's function signatures, while the export table appears only in
//! the shared types file.

use crate::annotations::AnnotationExtractor;
use crate::error::Result;
use crate::registry::{TypeRegistry, EXPORT_TABLE_MARKER};

/// Composes registry and extractor output into stub files.
pub struct StubGenerator<'a> {
    registry: &'a TypeRegistry,
    extractor: &'a AnnotationExtractor,
}

impl<'a> StubGenerator<'a> {
    pub fn new(registry: &'a TypeRegistry, extractor: &'a AnnotationExtractor) -> Self {
        Self {
            registry,
            extractor,
        }
    }

    /// Self-contained stub for one module: type definitions first, then
    /// function definitions. The registry's trailing export table is
    /// stripped so it appears only in the shared file.
    ///
    /// Fails with [`Error::ModuleNotFound`](crate::Error::ModuleNotFound)
    /// if the module was never discovered.
    pub fn module_stub(&self, name: &str) -> Result<String> {
        let functions = self.extractor.generate_module_stub(name)?;
        let types = self.registry.generate_stubs()?;

        let mut out = String::from(strip_export_table(&types));
        out.push_str(&functions);
        Ok(out)
    }

    /// The shared types file: every class definition plus the export table.
    pub fn types_stub(&self) -> Result<String> {
        self.registry.generate_stubs()
    }
}

/// Drop the export-table boilerplate from registry output.
fn strip_export_table(stubs: &str) -> &str {
    match stubs.find(EXPORT_TABLE_MARKER) {
        Some(index) => &stubs[..index],
        None => stubs,
    }
}
