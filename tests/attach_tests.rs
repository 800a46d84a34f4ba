mod common;

use anyhow::Result;
use serde_json::json;

use allure_steps::commands::attach::attach_dir;
use allure_steps::commands::prepare::prepare_dir;
use allure_steps::{Config, Outcome};
use common::{checkout_result, plain_result, ResultsDir};

#[cfg(test)]
mod attach_command_tests {
    use super::*;

    const DIAGRAM: &str = "a-result-business-steps.html";

    #[tokio::test]
    async fn test_attach_writes_diagram_and_attachment() -> Result<()> {
        let results = ResultsDir::new()?;
        results.write_json("a-result.json", &checkout_result()).await?;

        let report = attach_dir(results.path(), &Config::default(), false).await?;
        assert_eq!(
            report.outcome("a-result.json"),
            Some(&Outcome::Attached {
                diagram: DIAGRAM.to_string(),
                written: true
            })
        );

        let html = results.read_raw(DIAGRAM).await?;
        assert!(html.contains("graph LR"));
        assert!(html.contains(r#"step0["Login - failed"]"#));
        assert!(html.contains(r#"step1["Checkout - skipped"]"#));
        assert!(html.contains("step0 --> step1"));
        assert!(html.contains("class step0 failed"));
        assert!(html.contains("class step1 skipped"));

        let doc = results.read_json("a-result.json").await?;
        assert_eq!(
            doc["attachments"],
            json!([
                {"name": "screenshot", "source": "shot.png", "type": "image/png"},
                {"name": "Business Steps Flow", "source": DIAGRAM, "type": "text/html"}
            ])
        );
        // the flat step list is not rewritten
        assert_eq!(doc["steps"], checkout_result()["steps"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_attach_replaces_previous_diagram_entry() -> Result<()> {
        let results = ResultsDir::new()?;
        results.write_json("a-result.json", &checkout_result()).await?;
        let config = Config::default();

        attach_dir(results.path(), &config, false).await?;
        attach_dir(results.path(), &config, false).await?;

        let doc = results.read_json("a-result.json").await?;
        let sources: Vec<&str> = doc["attachments"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|a| a["source"].as_str())
            .collect();
        assert_eq!(sources, vec!["shot.png", DIAGRAM]);
        Ok(())
    }

    #[tokio::test]
    async fn test_attach_after_prepare_uses_grouped_steps() -> Result<()> {
        let results = ResultsDir::new()?;
        results.write_json("a-result.json", &checkout_result()).await?;
        let config = Config::default();

        prepare_dir(results.path(), &config, false).await?;
        let report = attach_dir(results.path(), &config, false).await?;
        assert!(matches!(
            report.outcome("a-result.json"),
            Some(Outcome::Attached { .. })
        ));

        let html = results.read_raw(DIAGRAM).await?;
        assert!(html.contains(r#"step0["Login - failed"]"#));
        assert!(html.contains(r#"step1["Checkout - skipped"]"#));
        Ok(())
    }

    #[tokio::test]
    async fn test_attach_without_business_steps() -> Result<()> {
        let results = ResultsDir::new()?;
        let path = results.write_json("plain-result.json", &plain_result()).await?;
        let before = tokio::fs::read_to_string(&path).await?;

        let report = attach_dir(results.path(), &Config::default(), false).await?;
        assert_eq!(report.outcome("plain-result.json"), Some(&Outcome::NoGroups));
        assert!(!results.file("plain-result-business-steps.html").exists());
        assert_eq!(tokio::fs::read_to_string(&path).await?, before);
        Ok(())
    }

    #[tokio::test]
    async fn test_attach_escapes_labels() -> Result<()> {
        let results = ResultsDir::new()?;
        results
            .write_json(
                "a-result.json",
                &json!({"steps": [
                    {"name": "* business step 'Pay <card> & \"save\"'"},
                    {"name": "submit", "status": "passed"}
                ]}),
            )
            .await?;

        attach_dir(results.path(), &Config::default(), false).await?;

        let html = results.read_raw(DIAGRAM).await?;
        assert!(html.contains("Pay &lt;card&gt; &amp; &quot;save&quot; - passed"));
        Ok(())
    }

    #[tokio::test]
    async fn test_attach_dry_run() -> Result<()> {
        let results = ResultsDir::new()?;
        let path = results.write_json("a-result.json", &checkout_result()).await?;
        let before = tokio::fs::read_to_string(&path).await?;

        let report = attach_dir(results.path(), &Config::default(), true).await?;
        assert_eq!(
            report.outcome("a-result.json"),
            Some(&Outcome::Attached {
                diagram: DIAGRAM.to_string(),
                written: false
            })
        );
        assert!(!results.file(DIAGRAM).exists());
        assert_eq!(tokio::fs::read_to_string(&path).await?, before);
        Ok(())
    }

    #[tokio::test]
    async fn test_attach_reports_diagram_write_failure() -> Result<()> {
        let results = ResultsDir::new()?;
        results.write_json("a-result.json", &checkout_result()).await?;
        results.write_json("b-result.json", &checkout_result()).await?;
        // a directory where the diagram should go makes the write fail
        tokio::fs::create_dir(results.file(DIAGRAM)).await?;

        let report = attach_dir(results.path(), &Config::default(), false).await?;
        assert!(matches!(
            report.outcome("a-result.json"),
            Some(Outcome::Failed { .. })
        ));
        assert!(matches!(
            report.outcome("b-result.json"),
            Some(Outcome::Attached { .. })
        ));
        Ok(())
    }
}
