//! Wiring from [`Settings`] to a ready [`ConversationOrchestrator`], plus the offline render
//! path used by `promptsmith render`.

use std::sync::Arc;

use async_openai::config::OpenAIConfig;
use promptsmith::prompts::load_or_default;
use promptsmith::{
    evaluate_raw, rendered_text, ChatOpenAI, ConversationOrchestrator, EvalError,
    ImprovementFilter, InMemorySessionStore, LlmClient, OrchestratorOptions, RefinementPolicy,
    SessionStore, SqliteSessionStore,
};
use promptsmith_config::Settings;

/// OpenAI chat client from settings; key and base URL fall back to the client's env lookup.
pub fn build_llm(settings: &Settings) -> ChatOpenAI {
    let mut config = OpenAIConfig::new();
    if let Some(key) = &settings.openai_api_key {
        config = config.with_api_key(key);
    }
    if let Some(base) = &settings.openai_base_url {
        config = config.with_api_base(base);
    }
    ChatOpenAI::with_config(config, settings.model.clone())
        .with_temperature(settings.temperature)
        .with_max_tokens(settings.max_tokens)
}

/// SQLite store when a session DB is configured, in-memory otherwise.
pub fn build_store(settings: &Settings) -> anyhow::Result<Arc<dyn SessionStore>> {
    match &settings.session_db {
        Some(path) => {
            let store = SqliteSessionStore::new(path)?;
            tracing::debug!(path = %path.display(), "sqlite session store");
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(InMemorySessionStore::new())),
    }
}

/// `override_filter` (CLI flag) wins over the configured one.
pub fn improvement_filter(
    settings: &Settings,
    override_filter: Option<&str>,
) -> anyhow::Result<ImprovementFilter> {
    match override_filter.or(settings.improvement_filter.as_deref()) {
        Some(s) => s.parse().map_err(anyhow::Error::msg),
        None => Ok(ImprovementFilter::default()),
    }
}

pub fn build_orchestrator(
    llm: Arc<dyn LlmClient>,
    settings: &Settings,
    filter: ImprovementFilter,
) -> anyhow::Result<ConversationOrchestrator> {
    let templates = load_or_default(settings.prompts_dir.as_deref());
    let store = build_store(settings)?;
    Ok(
        ConversationOrchestrator::new(llm, store, templates).with_options(OrchestratorOptions {
            refinement: RefinementPolicy::default().with_filter(filter),
        }),
    )
}

/// Runs the evaluation pipeline on raw model output. With `json`, prints the normalized
/// report instead of the display text.
pub fn render_raw(raw: &str, json: bool) -> Result<String, EvalError> {
    let report = evaluate_raw(raw)?;
    if json {
        serde_json::to_string_pretty(&report).map_err(|e| EvalError::Schema(e.to_string()))
    } else {
        Ok(rendered_text(&report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_flag_overrides_settings() {
        let settings = Settings {
            improvement_filter: Some("skip_empty_or_none".into()),
            ..Settings::default()
        };
        assert_eq!(
            improvement_filter(&settings, Some("include_all")).unwrap(),
            ImprovementFilter::IncludeAll
        );
        assert_eq!(
            improvement_filter(&settings, None).unwrap(),
            ImprovementFilter::SkipEmptyOrNone
        );
        assert_eq!(
            improvement_filter(&Settings::default(), None).unwrap(),
            ImprovementFilter::default()
        );
    }

    #[test]
    fn unknown_filter_is_error() {
        assert!(improvement_filter(&Settings::default(), Some("maybe")).is_err());
    }

    #[test]
    fn llm_uses_configured_model() {
        let settings = Settings {
            model: "gpt-4o-mini".into(),
            openai_api_key: Some("sk-test".into()),
            ..Settings::default()
        };
        assert_eq!(build_llm(&settings).model(), "gpt-4o-mini");
    }

    #[test]
    fn sqlite_store_when_db_configured() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            session_db: Some(dir.path().join("sessions.db")),
            ..Settings::default()
        };
        build_store(&settings).unwrap();
        assert!(dir.path().join("sessions.db").exists());
    }

    #[test]
    fn render_raw_text_and_json() {
        let raw = "```json\n{\"Clarity\": {\"score\": 4}, \"total_score\": 4}\n```";
        let text = render_raw(raw, false).unwrap();
        assert!(text.contains("Clarity\nScore: 4/5"));
        let json: serde_json::Value = serde_json::from_str(&render_raw(raw, true).unwrap()).unwrap();
        assert_eq!(json["total_score"], serde_json::json!(4.0));
    }

    #[test]
    fn render_raw_reports_parse_failure() {
        assert!(matches!(
            render_raw("{\"Clarity\": {\"Sco", false),
            Err(EvalError::ParseFailure { .. })
        ));
    }
}
