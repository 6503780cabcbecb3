//! All-or-nothing export writes.

use std::{fs, io::Write as _, path::Path};

use crate::{document::ExportDocument, error::Result, validate::validate};

/// Validate and write the document atomically: serialize to a sibling
/// temp file, fsync, then rename over the target. A crash mid-write
/// leaves no partial export at `path`.
pub fn write_atomic(doc: &ExportDocument, path: &Path) -> Result<()> {
  validate(doc)?;

  let json = serde_json::to_vec_pretty(doc)?;
  let tmp = path.with_extension("json.tmp");

  let mut file = fs::File::create(&tmp)?;
  file.write_all(&json)?;
  file.sync_all()?;
  drop(file);

  fs::rename(&tmp, path)?;
  tracing::info!(
    path = %path.display(),
    candidates = doc.candidates.len(),
    "export written"
  );
  Ok(())
}
