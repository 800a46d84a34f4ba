mod common;

use anyhow::Result;
use serde_json::json;

use allure_steps::commands::prepare::prepare_dir;
use allure_steps::commands::summarize::summarize_dir;
use allure_steps::{Config, Outcome, ReportError};
use common::{checkout_result, plain_result, ResultsDir};

#[cfg(test)]
mod summarize_command_tests {
    use super::*;

    #[tokio::test]
    async fn test_summary_of_prepared_results() -> Result<()> {
        let results = ResultsDir::new()?;
        results.write_json("a-result.json", &checkout_result()).await?;
        results.write_json("b-result.json", &plain_result()).await?;
        let config = Config::default();

        prepare_dir(results.path(), &config, false).await?;
        let report = summarize_dir(results.path(), &config, None).await?;
        assert_eq!(report.test_cases, 2);
        assert_eq!(report.output, results.file("allure-results-summary.json"));

        let summary = results.read_json("allure-results-summary.json").await?;
        assert_eq!(
            summary[0],
            json!({
                "testCaseId": "tc-checkout",
                "uuid": "6b7c0e0a",
                "name": "Customer checks out",
                "description": "Login then pay",
                "status": "failed",
                "statusDetails": {"message": "wrong password", "trace": "at LoginPage"},
                "steps": [
                    {"name": "Login", "status": "failed", "substeps": [
                        {"name": "enter user", "status": "passed"},
                        {"name": "enter pass", "status": "failed"}
                    ]},
                    {"name": "Checkout", "status": "skipped", "substeps": [
                        {"name": "pay", "status": "skipped"}
                    ]}
                ]
            })
        );
        assert_eq!(summary[1]["testCaseId"], serde_json::Value::Null);
        assert_eq!(summary[1]["steps"][0]["substeps"], json!([]));
        Ok(())
    }

    #[tokio::test]
    async fn test_summary_is_pretty_printed() -> Result<()> {
        let results = ResultsDir::new()?;
        results.write_json("a-result.json", &plain_result()).await?;

        summarize_dir(results.path(), &Config::default(), None).await?;

        let raw = results.read_raw("allure-results-summary.json").await?;
        assert!(raw.starts_with("[\n  {\n    \"testCaseId\": null,\n"));
        Ok(())
    }

    #[tokio::test]
    async fn test_summary_is_not_summarized_again() -> Result<()> {
        let results = ResultsDir::new()?;
        results.write_json("a-result.json", &plain_result()).await?;
        let config = Config::default();

        summarize_dir(results.path(), &config, None).await?;
        let report = summarize_dir(results.path(), &config, None).await?;

        assert_eq!(report.test_cases, 1);
        assert_eq!(report.batch.files.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_summary_custom_output_and_skipped_files() -> Result<()> {
        let results = ResultsDir::new()?;
        results.write_json("a-result.json", &plain_result()).await?;
        results.write_raw("b-result.json", "{ broken").await?;

        let report = summarize_dir(results.path(), &Config::default(), Some("run-results.json")).await?;
        assert_eq!(report.test_cases, 1);
        assert!(matches!(
            report.batch.outcome("b-result.json"),
            Some(Outcome::Skipped { .. })
        ));
        assert_eq!(report.batch.outcome("a-result.json"), Some(&Outcome::Summarized));

        let summary = results.read_json("run-results.json").await?;
        assert_eq!(summary.as_array().map(Vec::len), Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_summary_of_empty_directory() -> Result<()> {
        let results = ResultsDir::new()?;

        let report = summarize_dir(results.path(), &Config::default(), None).await?;
        assert_eq!(report.test_cases, 0);
        assert_eq!(results.read_raw("allure-results-summary.json").await?, "[]");
        Ok(())
    }

    #[tokio::test]
    async fn test_summary_write_failure_is_fatal() -> Result<()> {
        let results = ResultsDir::new()?;
        results.write_json("a-result.json", &plain_result()).await?;
        tokio::fs::create_dir(results.file("summary-out")).await?;

        let err = summarize_dir(results.path(), &Config::default(), Some("summary-out"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::SummaryWrite { .. }));
        assert_eq!(err.exit_code(), 2);
        Ok(())
    }
}
