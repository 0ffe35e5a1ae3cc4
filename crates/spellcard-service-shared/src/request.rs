//! Request types and validation for HTTP endpoints.

use serde::{Deserialize, Serialize};

use spellcard_lib::{parse_callback_url, SpellData, SpellRecord, Url, DEFAULT_GENERATOR};

use crate::{from_lib_error, ProblemDetails};

/// Validation trait for request types.
///
/// Returns a boxed `ProblemDetails` to keep the `Err` variant small. The
/// `request_id` populates the problem's `instance`.
pub trait Validate {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// Body of `POST /v1/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub spell_data: SpellData,

    /// Where to POST the job outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,

    /// Registered generator name; `plain` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
}

/// A request that passed validation.
#[derive(Debug, Clone)]
pub struct PreparedGeneration {
    pub spell: SpellRecord,
    pub generator: String,
    pub callback_url: Option<Url>,
}

impl GenerateRequest {
    /// Generator to use, after applying the default.
    pub fn generator_name(&self) -> &str {
        self.generator
            .as_deref()
            .map(str::trim)
            .unwrap_or(DEFAULT_GENERATOR)
    }

    /// Validate and convert into library types.
    ///
    /// Checks the request shape, then the spell record. Whether the generator
    /// is registered is left to the dispatcher.
    pub fn prepare(self, request_id: &str) -> Result<PreparedGeneration, Box<ProblemDetails>> {
        self.validate(request_id)?;
        let generator = self.generator_name().to_string();
        let callback_url = self
            .callback_url
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(parse_callback_url)
            .transpose()
            .map_err(|e| Box::new(from_lib_error(&e, request_id)))?;
        let spell = SpellRecord::new(self.spell_data)
            .map_err(|e| Box::new(from_lib_error(&e, request_id)))?;

        Ok(PreparedGeneration {
            spell,
            generator,
            callback_url,
        })
    }
}

impl Validate for GenerateRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if self.generator_name().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'generator' field cannot be empty",
                request_id,
            )));
        }

        if let Some(url) = self.callback_url.as_deref().map(str::trim) {
            if !url.is_empty() {
                parse_callback_url(url).map_err(|e| Box::new(from_lib_error(&e, request_id)))?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(extra: serde_json::Value) -> GenerateRequest {
        let mut body = json!({
            "spell_data": {
                "title": "Acid Splash",
                "casting_time": "1 action",
                "range": "60 feet",
                "components": "V, S",
                "duration": "Instantaneous",
                "description": "You hurl a bubble of acid.",
                "school": "Conjuration",
                "level": 0
            }
        });
        if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
            for (key, value) in extra {
                body.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_generator_defaults_to_plain() {
        let prepared = request(json!({})).prepare("req-1").unwrap();
        assert_eq!(prepared.generator, "plain");
        assert!(prepared.callback_url.is_none());
        assert_eq!(prepared.spell.title(), "Acid Splash");
    }

    #[test]
    fn test_callback_url_is_parsed() {
        let prepared = request(json!({
            "callback_url": "http://localhost:9000/cb",
            "generator": "tornioduva"
        }))
        .prepare("req-2")
        .unwrap();
        assert_eq!(prepared.generator, "tornioduva");
        assert_eq!(
            prepared.callback_url.unwrap().as_str(),
            "http://localhost:9000/cb"
        );
    }

    #[test]
    fn test_blank_callback_url_is_ignored() {
        let prepared = request(json!({"callback_url": "  "})).prepare("req-3").unwrap();
        assert!(prepared.callback_url.is_none());
    }

    #[test]
    fn test_non_http_callback_url_is_rejected() {
        let problem = request(json!({"callback_url": "ftp://example.com/cb"}))
            .prepare("req-4")
            .unwrap_err();
        assert_eq!(problem.status, 400);
        assert_eq!(problem.instance.as_deref(), Some("req-4"));
    }

    #[test]
    fn test_empty_generator_is_rejected() {
        let problem = request(json!({"generator": " "})).validate("req-5").unwrap_err();
        assert_eq!(problem.status, 400);
        assert!(problem.detail.as_deref().unwrap().contains("generator"));
    }

    #[test]
    fn test_invalid_spell_is_400() {
        let mut req = request(json!({}));
        req.spell_data.level = Some(12);
        let problem = req.prepare("req-6").unwrap_err();
        assert_eq!(problem.status, 400);
        assert!(problem.detail.as_deref().unwrap().contains("level"));
    }

    #[test]
    fn test_spell_range_alias_is_accepted() {
        let req: GenerateRequest = serde_json::from_value(json!({
            "spell_data": {
                "title": "Light",
                "casting_time": "1 action",
                "spell_range": "Touch",
                "components": "V, M",
                "duration": "1 hour",
                "description": "You touch one object.",
                "school": "evocation",
                "level": 0
            }
        }))
        .unwrap();
        let prepared = req.prepare("req-7").unwrap();
        assert_eq!(prepared.spell.range(), "Touch");
    }
}
