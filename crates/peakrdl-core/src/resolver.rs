//! Importer resolution
//!
//! Picks, among the registered importers, the single one responsible for
//! an input file: a cheap extension filter first, then a content-based
//! tie-break only when the extension is ambiguous.

use std::path::Path;

use crate::importer::RegisteredImporter;

/// Select the importer for a file with the given extension.
///
/// If exactly one candidate advertises the extension it is chosen
/// without opening the file. If several do, the first (in registration
/// order) whose [`is_compatible`](crate::Importer::is_compatible) check
/// passes wins. `None` means no importer is responsible; callers treat
/// that as fatal.
pub fn resolve_importer<'a>(
    ext: &str,
    candidates: &'a [RegisteredImporter],
    path: &Path,
) -> Option<&'a RegisteredImporter> {
    let matched: Vec<&RegisteredImporter> = candidates
        .iter()
        .filter(|imp| imp.file_extensions().contains(&ext))
        .collect();

    match matched.as_slice() {
        [] => None,
        [only] => {
            tracing::debug!(importer = %only.name(), ext, "unambiguous extension match");
            Some(only)
        }
        several => several.iter().copied().find(|imp| {
            let compatible = imp.is_compatible(path);
            tracing::debug!(importer = %imp.name(), compatible, "content compatibility check");
            compatible
        }),
    }
}
