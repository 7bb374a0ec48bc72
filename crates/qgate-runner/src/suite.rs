//! Prompt-suite discovery and snapshot I/O.

use anyhow::{anyhow, Context, Result};
use qgate_types::{BenchmarkSuiteResult, PromptCase, PromptSuite};
use std::fs;
use std::path::Path;

/// Load a prompt suite from a YAML file, or assemble one from every YAML
/// file in a directory (one [`PromptCase`] per file, sorted by filename).
pub fn load_suite(path: &Path) -> Result<PromptSuite> {
    if path.is_file() {
        let file = fs::File::open(path)
            .with_context(|| format!("failed to open suite file {}", path.display()))?;
        let suite: PromptSuite = serde_yaml::from_reader(file)
            .with_context(|| format!("failed to parse suite file {}", path.display()))?;
        return Ok(suite);
    }

    if path.is_dir() {
        let mut case_paths: Vec<_> = fs::read_dir(path)
            .with_context(|| format!("failed to read suite directory {}", path.display()))?
            .filter_map(|entry| {
                entry.ok().and_then(|e| {
                    let p = e.path();
                    let extension = p.extension()?.to_str()?;
                    (p.is_file() && (extension == "yml" || extension == "yaml")).then_some(p)
                })
            })
            .collect();
        case_paths.sort();

        let mut prompts = Vec::new();
        for case_path in &case_paths {
            let file = fs::File::open(case_path)
                .with_context(|| format!("failed to open prompt file {}", case_path.display()))?;
            let case: PromptCase = serde_yaml::from_reader(file)
                .with_context(|| format!("failed to parse prompt file {}", case_path.display()))?;
            prompts.push(case);
        }
        if prompts.is_empty() {
            return Err(anyhow!(
                "no prompt files found under {}",
                path.display()
            ));
        }
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("suite")
            .to_string();
        return Ok(PromptSuite { name, prompts });
    }

    Err(anyhow!(
        "suite path {} is not a valid file or directory",
        path.display()
    ))
}

/// Load a benchmark snapshot from JSON.
pub fn load_snapshot(path: &Path) -> Result<BenchmarkSuiteResult> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))
}

/// Write a benchmark snapshot as pretty JSON.
pub fn save_snapshot(path: &Path, result: &BenchmarkSuiteResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result).context("failed to serialize snapshot")?;
    fs::write(path, json)
        .with_context(|| format!("failed to write snapshot {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn single_file_suite_parses() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "name: smoke\nprompts:\n  - id: SMOKE-001\n    prompt: build a counter\n"
        )
        .unwrap();
        let suite = load_suite(file.path()).unwrap();
        assert_eq!(suite.name, "smoke");
        assert_eq!(suite.prompts.len(), 1);
        assert_eq!(suite.prompts[0].rubric.min_overall_score, 80.0);
    }

    #[test]
    fn directory_suite_collects_sorted_cases() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("b-case.yaml"),
            "id: CASE-B\nprompt: build a chart\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("a-case.yaml"),
            "id: CASE-A\nprompt: build a slider\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let suite = load_suite(dir.path()).unwrap();
        let ids: Vec<_> = suite.prompts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["CASE-A", "CASE-B"]);
    }

    #[test]
    fn missing_path_is_an_error() {
        assert!(load_suite(Path::new("/nonexistent/suite.yaml")).is_err());
    }
}
