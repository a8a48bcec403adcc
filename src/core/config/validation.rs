use crate::core::errors::ConfigError;

use super::settings::Settings;

pub fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    validate_non_empty("pinecone.index_name", &settings.pinecone.index_name)?;
    validate_non_empty("pinecone.metric", &settings.pinecone.metric)?;
    validate_min("pinecone.dimension", settings.pinecone.dimension as u64, 1)?;

    validate_non_empty("cohere.model", &settings.cohere.model)?;
    validate_url("cohere.base_url", &settings.cohere.base_url)?;
    validate_url("pinecone.control_plane_url", &settings.pinecone.control_plane_url)?;

    validate_url("llm.endpoint", &settings.llm.endpoint)?;
    validate_non_empty("llm.model", &settings.llm.model)?;
    validate_range("llm.temperature", settings.llm.temperature, 0.0, 2.0, true)?;
    validate_range("llm.top_p", settings.llm.top_p, 0.0, 1.0, false)?;

    let retrieval = &settings.retrieval;
    validate_min("retrieval.top_k", retrieval.top_k as u64, 1)?;
    validate_min("retrieval.answer_top_k", retrieval.answer_top_k as u64, 1)?;
    validate_min(
        "retrieval.max_context_matches",
        retrieval.max_context_matches as u64,
        1,
    )?;
    if !retrieval.score_threshold.is_finite() {
        return Err(ConfigError::Invalid {
            field: "retrieval.score_threshold",
            reason: "must be a finite number".to_string(),
        });
    }

    validate_min("network.timeout_secs", settings.network.timeout_secs, 1)?;
    validate_non_empty("server.host", &settings.server.host)?;
    validate_non_empty("logging.level", &settings.logging.level)?;
    validate_file_name("logging.file_name", &settings.logging.file_name)?;

    Ok(())
}

fn validate_file_name(field: &'static str, value: &str) -> Result<(), ConfigError> {
    validate_non_empty(field, value)?;
    if value.contains(['/', '\\']) {
        return Err(ConfigError::Invalid {
            field,
            reason: "must be a bare file name".to_string(),
        });
    }
    Ok(())
}

fn validate_non_empty(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

fn validate_min(field: &'static str, value: u64, min: u64) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("must be >= {}, got {}", min, value),
        });
    }
    Ok(())
}

fn validate_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
    min_inclusive: bool,
) -> Result<(), ConfigError> {
    let above_min = if min_inclusive { value >= min } else { value > min };
    if !value.is_finite() || !above_min || value > max {
        let lower = if min_inclusive { "[" } else { "(" };
        return Err(ConfigError::Invalid {
            field,
            reason: format!("must be within {}{}, {}], got {}", lower, min, max, value),
        });
    }
    Ok(())
}

fn validate_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("expected an http(s) URL, got `{}`", value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn rejects_zero_dimension() {
        let mut settings = Settings::default();
        settings.pinecone.dimension = 0;
        let err = validate_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("pinecone.dimension"));
    }

    #[test]
    fn rejects_zero_top_p_but_accepts_zero_temperature() {
        let mut settings = Settings::default();
        settings.llm.temperature = 0.0;
        assert!(validate_settings(&settings).is_ok());

        settings.llm.top_p = 0.0;
        let err = validate_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("llm.top_p"));
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let mut settings = Settings::default();
        settings.llm.endpoint = "models.inference.ai.azure.com".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn log_file_name_must_not_be_a_path() {
        let mut settings = Settings::default();
        settings.logging.file_name = "../server.log".to_string();
        let err = validate_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("logging.file_name"));
    }

    #[test]
    fn rejects_nan_threshold() {
        let mut settings = Settings::default();
        settings.retrieval.score_threshold = f64::NAN;
        assert!(validate_settings(&settings).is_err());
    }
}
