//! `tally import` and `tally export` commands: move whole progress
//! documents in and out of the store.

use anyhow::{Context, Result};

use tally_core::ProgressEngine;
use tally_store::document::Document;
use tally_store::store::DocumentStore;

/// Run the import command: parse a JSON document and replace the current one.
pub async fn run_import<S: DocumentStore>(engine: &ProgressEngine<S>, file: &str) -> Result<()> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read import file {file}"))?;
    let doc: Document = serde_json::from_str(&contents)
        .with_context(|| format!("import file {file} is not a valid progress document"))?;

    let plan_count = doc.plans.len();
    engine.bulk_replace(doc).await?;

    println!("Imported {plan_count} plan(s) from {file}.");
    Ok(())
}

/// Run the export command: write the current document to a file or stdout.
pub async fn run_export<S: DocumentStore>(
    engine: &ProgressEngine<S>,
    output: Option<&str>,
) -> Result<()> {
    let doc = engine.snapshot().await?;
    let mut rendered = serde_json::to_string_pretty(&doc)?;
    rendered.push('\n');

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("failed to write export file {path}"))?;
            println!("Exported progress document to {path}.");
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_store::store::MemoryStore;
    use tally_test_utils::seed_document;

    #[tokio::test]
    async fn import_rejects_malformed_documents() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, "{\"plans\": \"nope\"}").unwrap();

        let engine = ProgressEngine::new(MemoryStore::new(seed_document()));
        let err = run_import(&engine, path.to_str().unwrap())
            .await
            .unwrap_err();
        assert!(
            err.to_string().contains("not a valid progress document"),
            "unexpected error: {err:#}"
        );
    }

    #[tokio::test]
    async fn export_then_import_round_trips() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("export.json");

        let engine = ProgressEngine::new(MemoryStore::new(seed_document()));
        run_export(&engine, Some(path.to_str().unwrap()))
            .await
            .expect("export should succeed");

        let fresh = ProgressEngine::new(MemoryStore::new(Document::default()));
        run_import(&fresh, path.to_str().unwrap())
            .await
            .expect("import should succeed");

        let doc = fresh.snapshot().await.expect("snapshot should succeed");
        assert!(doc.plans.contains_key("systemDesign"));
        assert!(doc.plans.contains_key("scripts"));
    }
}
