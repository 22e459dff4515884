use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::cutoffs::CutoffResponse;

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading {}", path.display()))?;
    let parsed = serde_json::from_str(&data)
        .with_context(|| format!("failed parsing JSON: {}", path.display()))?;
    Ok(parsed)
}

/// Loads a branch cutoff payload exported from the cutoff endpoint.
pub fn load_cutoff_response(path: &Path) -> Result<CutoffResponse> {
    let response: CutoffResponse = read_json(path)?;
    debug!(
        "loaded {} categories from {}",
        response.categories.len(),
        path.display()
    );
    Ok(response)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::load_cutoff_response;

    #[test]
    fn loads_cutoff_file_and_reports_missing_file() {
        let dir = std::env::temp_dir().join(format!("admission-oracle-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("failed creating temp dir");
        let path = dir.join("cutoffs.json");
        fs::write(
            &path,
            r#"{"categories":{"GM":{"2025":{"r1":"1200"}}}}"#,
        )
        .expect("failed writing cutoff file");

        let response = load_cutoff_response(&path).expect("failed loading cutoff file");
        assert_eq!(response.categories.len(), 1);

        let missing = load_cutoff_response(&dir.join("missing.json"));
        assert!(missing.is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}
