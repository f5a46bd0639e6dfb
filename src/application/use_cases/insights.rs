// ============================================================
// INSIGHTS ENGINE
// ============================================================
// Stateless facade over the analysis pipeline: load a stored file,
// summarize it, derive chart data, and produce insight text through
// the hosted model or the canned fallback.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::use_cases::{prompts, summarize, visualizations};
use crate::domain::error::Result;
use crate::domain::insight::InsightType;
use crate::domain::llm_config::LLMConfig;
use crate::domain::preview::PreviewSummary;
use crate::domain::table::{Table, TabularDocument};
use crate::domain::visualization::VisualizationSpec;
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::tabular;

pub struct InsightsEngine {
    llm: Arc<dyn LLMClient + Send + Sync>,
    config: LLMConfig,
}

impl InsightsEngine {
    /// Credential presence in `config` decides once, here, whether insight
    /// text comes from the hosted model or from canned responses.
    pub fn new(llm: Arc<dyn LLMClient + Send + Sync>, config: LLMConfig) -> Self {
        Self { llm, config }
    }

    pub fn uses_mock_responses(&self) -> bool {
        !self.config.has_credentials()
    }

    pub fn load_document(&self, path: &Path) -> Result<TabularDocument> {
        tabular::load_path(path)
    }

    /// Preview summary for a stored file.
    pub fn data_summary(&self, path: &Path) -> Result<PreviewSummary> {
        let document = self.load_document(path)?;
        Ok(summarize::summarize(&document))
    }

    /// Chart-ready aggregates for a stored file.
    pub fn visualization_data(&self, path: &Path) -> Result<Vec<VisualizationSpec>> {
        let document = self.load_document(path)?;
        Ok(visualizations::derive_visualizations(&document))
    }

    /// Insight text for a stored file. The remote response is returned
    /// verbatim; nothing here parses or validates it.
    pub async fn generate_insights(
        &self,
        path: &Path,
        question: Option<&str>,
        insight_type: InsightType,
    ) -> Result<String> {
        let document = self.load_document(path)?;

        if self.uses_mock_responses() {
            debug!("no API key configured, returning canned insight text");
            return Ok(mock_insights(&document, question, insight_type));
        }

        let data_summary = prompts::describe_document(&document);
        let prompt = match question.map(str::trim).filter(|q| !q.is_empty()) {
            Some(question) => prompts::build_question_prompt(&data_summary, question),
            None => prompts::build_insight_prompt(&data_summary, insight_type),
        };

        self.llm.generate(&self.config, "", &prompt).await
    }
}

/// Deterministic markdown stand-in used when no API key is configured.
fn mock_insights(
    document: &TabularDocument,
    question: Option<&str>,
    insight_type: InsightType,
) -> String {
    let table = match document {
        TabularDocument::Table(table) => table,
        TabularDocument::Opaque(_) => return mock_document_insights(),
    };

    let names = table.column_names();
    let first = names
        .first()
        .cloned()
        .unwrap_or_else(|| "the data".to_string());
    let second = names.get(1).cloned().unwrap_or_else(|| first.clone());

    if let Some(question) = question.map(str::trim).filter(|q| !q.is_empty()) {
        return format!(
            "# Analysis of Your Question: \"{question}\"\n\
             \n\
             Based on the data provided, I can offer the following insights:\n\
             \n\
             ## Key Finding 1\n\
             The data shows interesting patterns related to {first} and {second}.\n\
             Looking at the first few rows, we can see values like {first_value} and {second_value}.\n\
             \n\
             ## Key Finding 2\n\
             There appears to be a relationship between various factors in your dataset.\n\
             Further analysis would be needed to establish causation.\n\
             \n\
             ## Recommendation\n\
             Consider exploring the relationship between {first} and other variables in more depth.",
            question = question,
            first = first,
            second = second,
            first_value = leading_value(table, 0),
            second_value = leading_value(table, 1),
        );
    }

    match insight_type {
        InsightType::Trends => format!(
            "# Key Trends Analysis\n\
             \n\
             ## Trend 1: {first} Growth Pattern\n\
             The data suggests an interesting development in {first} values.\n\
             \n\
             ## Trend 2: Relationship Between {first} and {second}\n\
             There appears to be a correlation worth investigating further.\n\
             \n\
             ## Trend 3: Seasonal Variations\n\
             The data hints at periodic patterns that may be worth examining.",
            first = first,
            second = second,
        ),
        InsightType::Anomalies => format!(
            "# Anomaly Detection Results\n\
             \n\
             ## Outlier 1: Unusual {first} Values\n\
             Some entries show values that deviate significantly from the norm.\n\
             \n\
             ## Anomaly 2: Unexpected Correlations\n\
             There are surprising relationships between certain variables.\n\
             \n\
             ## Data Quality Issue\n\
             Some entries may require validation or cleaning for more accurate analysis.",
            first = first,
        ),
        InsightType::General => format!(
            "# General Business Insights\n\
             \n\
             ## Key Insight 1: Performance Metrics\n\
             The data indicates several important patterns in your business metrics.\n\
             \n\
             ## Key Insight 2: Opportunity Areas\n\
             Based on {first} and {second}, there are potential opportunities for improvement.\n\
             \n\
             ## Key Insight 3: Risk Factors\n\
             The analysis highlights some potential concerns that warrant attention.\n\
             \n\
             ## Key Insight 4: Competitive Positioning\n\
             Your data suggests certain strategic advantages in the market.",
            first = first,
            second = second,
        ),
    }
}

fn mock_document_insights() -> String {
    "# Data Analysis Results\n\
     \n\
     ## Overview\n\
     The JSON data structure contains valuable information that can inform business decisions.\n\
     \n\
     ## Key Patterns\n\
     Several recurring patterns emerge from the complex data structure.\n\
     \n\
     ## Recommendations\n\
     Consider restructuring certain elements of your data for more efficient analysis.\n\
     \n\
     ## Next Steps\n\
     A deeper dive into specific objects and arrays within the JSON would yield more specific insights."
        .to_string()
}

fn leading_value(table: &Table, column: usize) -> String {
    table
        .columns()
        .get(column)
        .and_then(|c| c.values.first())
        .map(|cell| cell.to_json().to_string().trim_matches('"').to_string())
        .unwrap_or_else(|| "n/a".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::AppError;
    use async_trait::async_trait;
    use std::fs;
    use std::path::PathBuf;

    struct CannedClient;

    #[async_trait]
    impl LLMClient for CannedClient {
        async fn generate(
            &self,
            _config: &LLMConfig,
            _system: &str,
            user: &str,
        ) -> Result<String> {
            if user.is_empty() {
                return Err(AppError::LLMError("empty prompt".to_string()));
            }
            Ok(format!("remote analysis ({} prompt chars)", user.len()))
        }
    }

    fn fixture_csv(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("insighta-test-{}-{}.csv", std::process::id(), name));
        fs::write(
            &path,
            "Product,Price,Quantity\nLaptop,1200,5\nPhone,800,10\nTablet,600,8\n",
        )
        .unwrap();
        path
    }

    fn engine(api_key: Option<&str>) -> InsightsEngine {
        let config = LLMConfig {
            api_key: api_key.map(str::to_string),
            ..LLMConfig::default()
        };
        InsightsEngine::new(Arc::new(CannedClient), config)
    }

    #[tokio::test]
    async fn test_missing_credentials_use_mock_text() {
        let path = fixture_csv("mock");
        let engine = engine(None);
        assert!(engine.uses_mock_responses());

        let text = engine
            .generate_insights(&path, None, InsightType::General)
            .await
            .unwrap();
        assert!(text.starts_with("# General Business Insights"));
        assert!(text.contains("Product"));
        fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_question_overrides_insight_type_in_mock() {
        let path = fixture_csv("question");
        let text = engine(None)
            .generate_insights(&path, Some("Why do laptops sell?"), InsightType::Trends)
            .await
            .unwrap();
        assert!(text.contains("Why do laptops sell?"));
        assert!(text.contains("Laptop"));
        fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_credentials_route_to_remote_client() {
        let path = fixture_csv("remote");
        let text = engine(Some("key-123"))
            .generate_insights(&path, None, InsightType::General)
            .await
            .unwrap();
        assert!(text.starts_with("remote analysis"));
        fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_blank_api_key_still_means_mock() {
        let path = fixture_csv("blank");
        let engine = engine(Some("   "));
        assert!(engine.uses_mock_responses());
        let text = engine
            .generate_insights(&path, None, InsightType::Anomalies)
            .await
            .unwrap();
        assert!(text.starts_with("# Anomaly Detection Results"));
        fs::remove_file(path).ok();
    }
}
