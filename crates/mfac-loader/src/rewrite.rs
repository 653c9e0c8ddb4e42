//! # Import Rewriting
//!
//! The compiler emits imports of sibling modules as absolute names
//! (`import address_idl`). Modules are loaded as one package whose members
//! resolve each other through the loader's resolution context, so every
//! such import is rewritten to the package-relative form
//! (`import .address_idl`) before loading.
//!
//! Only the import region is touched: the text after the single
//! [`IMPORTS_MARKER`] line. A module without exactly one marker line is
//! malformed. Rewriting is not idempotent and must run once per freshly
//! compiled module.

use std::path::Path;

use crate::error::FactoryError;

/// Marker line separating a generated module's header from its imports.
pub const IMPORTS_MARKER: &str = "# @@insertion_point(imports)";

const ABSOLUTE_IMPORT: &str = "import ";

/// Rewrite the import region of a generated module's source text.
///
/// Returns the rewritten text, or the reason the text is malformed.
pub fn rewrite_source(source: &str) -> Result<String, String> {
    let markers = source
        .lines()
        .filter(|line| line.trim_end() == IMPORTS_MARKER)
        .count();
    match markers {
        0 => return Err(format!("missing marker line '{IMPORTS_MARKER}'")),
        1 => {}
        n => return Err(format!("marker line '{IMPORTS_MARKER}' appears {n} times")),
    }

    let mut out = String::with_capacity(source.len() + 64);
    let mut in_imports = false;
    for line in source.split_inclusive('\n') {
        if !in_imports {
            in_imports = line.trim_end() == IMPORTS_MARKER;
            out.push_str(line);
            continue;
        }
        match line.strip_prefix(ABSOLUTE_IMPORT) {
            Some(target) => {
                out.push_str(ABSOLUTE_IMPORT);
                out.push('.');
                out.push_str(target);
            }
            None => out.push_str(line),
        }
    }
    Ok(out)
}

/// Rewrite a generated module in place.
///
/// # Errors
///
/// A missing or unreadable file is an I/O error (the compiler did not
/// produce usable output); a file without exactly one marker line is
/// [`FactoryError::MalformedGeneratedModule`].
pub fn rewrite_imports(path: &Path) -> Result<(), FactoryError> {
    let source = std::fs::read_to_string(path)?;
    let rewritten =
        rewrite_source(&source).map_err(|reason| FactoryError::MalformedGeneratedModule {
            path: path.display().to_string(),
            reason,
        })?;
    std::fs::write(path, rewritten)?;
    tracing::debug!(module = %path.display(), "rewrote imports");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERATED: &str = "\
# Generated by idlc. DO NOT EDIT!
# import statements below are rewritten
module \"person.idl\"
# @@insertion_point(imports)
import address_idl
import phone_idl

message Person {
  singular string name = 1
}
";

    #[test]
    fn test_rewrites_only_import_region() {
        let out = rewrite_source(GENERATED).unwrap();
        assert!(out.contains("\nimport .address_idl\n"));
        assert!(out.contains("\nimport .phone_idl\n"));
        // The header comment mentioning "import" is untouched.
        assert!(out.contains("# import statements below are rewritten\n"));
        assert!(out.contains("message Person {\n"));
        assert_eq!(out.lines().count(), GENERATED.lines().count());
    }

    #[test]
    fn test_header_import_is_not_rewritten() {
        let src = "import early_idl\n# @@insertion_point(imports)\nimport late_idl\n";
        let out = rewrite_source(src).unwrap();
        assert_eq!(out, "import early_idl\n# @@insertion_point(imports)\nimport .late_idl\n");
    }

    #[test]
    fn test_no_trailing_newline() {
        let out = rewrite_source("# @@insertion_point(imports)\nimport a_idl").unwrap();
        assert_eq!(out, "# @@insertion_point(imports)\nimport .a_idl");
    }

    #[test]
    fn test_crlf_marker() {
        let out = rewrite_source("# @@insertion_point(imports)\r\nimport a_idl\r\n").unwrap();
        assert_eq!(out, "# @@insertion_point(imports)\r\nimport .a_idl\r\n");
    }

    #[test]
    fn test_missing_marker_is_malformed() {
        let err = rewrite_source("module \"x.idl\"\nimport a_idl\n").unwrap_err();
        assert!(err.contains("missing marker"));
    }

    #[test]
    fn test_duplicate_marker_is_malformed() {
        let src = "# @@insertion_point(imports)\n# @@insertion_point(imports)\n";
        let err = rewrite_source(src).unwrap_err();
        assert!(err.contains("2 times"));
    }

    #[test]
    fn test_rewrite_imports_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("person_idl.gen");
        std::fs::write(&path, GENERATED).unwrap();
        rewrite_imports(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("import .address_idl"));
    }

    #[test]
    fn test_rewrite_imports_distinguishes_missing_from_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let missing = rewrite_imports(&dir.path().join("ghost_idl.gen")).unwrap_err();
        assert!(matches!(missing, FactoryError::Io(_)), "got: {missing}");

        let path = dir.path().join("bad_idl.gen");
        std::fs::write(&path, "module \"bad.idl\"\n").unwrap();
        let malformed = rewrite_imports(&path).unwrap_err();
        assert!(
            matches!(malformed, FactoryError::MalformedGeneratedModule { .. }),
            "got: {malformed}"
        );
        // A malformed module is left as the compiler wrote it.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "module \"bad.idl\"\n");
    }
}
