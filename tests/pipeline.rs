//! End-to-end runs against the fixture provider.

use labscholar::config::{DataSource, PipelineConfig};
use labscholar::fixture::FixtureProvider;
use labscholar::{pipeline, ResearchError};
use std::fs;
use tempfile::TempDir;

const LABS_CSV: &str = "\
Lab,LabID,URL
Imaging Lab,IMG1,https://example.edu/imaging
Broken Row,BR1
Ghost Lab,NOPE,https://example.edu/ghost
Quiet Lab,QUIET,https://example.edu/quiet
";

const FIXTURE_JSON: &str = r#"{
  "labs": {
    "IMG1": {
      "name": "Imaging Lab",
      "publications": [
        { "title": "Light Sheet Microscopy", "author": "J Doe, R Roe", "year": 2019,
          "publisher": "Nature Publishing Group", "cites_per_year": { "2019": 3, "2020": 5, "2021": 0 } },
        { "author": "No Title" , "year": 2020 },
        { "title": "Adaptive Optics", "year": "2021", "fill_error": "timed out" },
        { "title": "Deep Tissue Imaging", "year": "2018" },
        { "title": "Never Reached", "year": 2017 }
      ]
    },
    "QUIET": { "name": "Quiet Lab", "publications": [] }
  }
}"#;

fn config(dir: &TempDir) -> PipelineConfig {
    PipelineConfig {
        max_per_lab: 2,
        data_source: DataSource::Fixture,
        fixture_path: Some(dir.path().join("fixture.json")),
        author_max_chars: None,
    }
}

#[tokio::test]
async fn writes_flattened_report() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let input = dir.path().join("labs.csv");
    let output = dir.path().join("out").join("research.csv");
    fs::write(&input, LABS_CSV)?;
    fs::write(dir.path().join("fixture.json"), FIXTURE_JSON)?;

    let config = config(&dir);
    let provider = FixtureProvider::from_path(dir.path().join("fixture.json").as_path())?;
    let summary = pipeline::run(&input, &output, &provider, &config).await?;

    assert_eq!(summary.labs_read, 3);
    assert_eq!(summary.groups_written, 2);
    assert_eq!(summary.publications_written, 2);

    let report = fs::read_to_string(&output)?;
    assert_eq!(
        report,
        "Lab,Lab ID,Publications,Title,Author,Year,Cited By,Publisher\n\
         Imaging Lab,IMG1,...,,,,,\n\
         ,,,Light Sheet Microscopy,\"J Doe, R Roe\",2019,8,Nature Publishing Group\n\
         ,,,Deep Tissue Imaging,n/a,2018,0,n/a\n\
         Quiet Lab,QUIET,...,,,,,\n"
    );

    // Same input, same bytes
    let rerun_provider = FixtureProvider::from_path(dir.path().join("fixture.json").as_path())?;
    pipeline::run(&input, &output, &rerun_provider, &config).await?;
    assert_eq!(fs::read_to_string(&output)?, report);
    Ok(())
}

#[tokio::test]
async fn missing_input_produces_no_output() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let output = dir.path().join("research.csv");
    let provider = FixtureProvider::default();

    let result = pipeline::run(
        &dir.path().join("missing.csv"),
        &output,
        &provider,
        &config(&dir),
    )
    .await;

    assert!(matches!(result, Err(ResearchError::InputNotFound(_))));
    assert!(!output.exists());
    Ok(())
}
