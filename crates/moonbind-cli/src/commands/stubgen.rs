//! Stub generation command.

use anyhow::{Context, Result};
use moonbind::AnnotationExtractor;
use std::path::Path;
use tracing::{info, warn};

/// Scan `source` for annotated modules and write one stub file per module
/// into `out`.
pub fn execute(source: &Path, out: &Path) -> Result<()> {
    let mut extractor = AnnotationExtractor::new();
    extractor
        .scan_directory(source)
        .with_context(|| format!("failed to scan {}", source.display()))?;

    if extractor.modules().is_empty() {
        warn!("no annotated modules found under {}", source.display());
        return Ok(());
    }

    std::fs::create_dir_all(out)
        .with_context(|| format!("failed to create {}", out.display()))?;

    for (name, module) in extractor.modules() {
        let stub = format!("---@meta\n\n{}", extractor.generate_module_stub(name)?);
        let path = out.join(format!("{name}.lua"));
        std::fs::write(&path, stub)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(
            "wrote {} ({} functions)",
            path.display(),
            module.functions.len()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stubgen_writes_one_file_per_module() {
        let source = tempfile::tempdir().unwrap();
        std::fs::write(
            source.path().join("api.rs"),
            r#"
//! @luamodule greeter

/// Say hello.
///
/// @luafunc hello
/// @luaparam name string Who to greet.
/// @luareturn string Greeting text.
fn hello(name: String) -> String {
    format!("hello, {name}")
}
"#,
        )
        .unwrap();

        let out = tempfile::tempdir().unwrap();
        execute(source.path(), out.path()).unwrap();

        let stub = std::fs::read_to_string(out.path().join("greeter.lua")).unwrap();
        assert!(stub.starts_with("---@meta"));
        assert!(stub.contains("function greeter.hello(name) end"));
    }

    #[test]
    fn test_stubgen_with_no_modules_writes_nothing() {
        let source = tempfile::tempdir().unwrap();
        std::fs::write(source.path().join("plain.rs"), "fn nothing() {}\n").unwrap();

        let out = tempfile::tempdir().unwrap();
        execute(source.path(), out.path()).unwrap();

        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    }
}
