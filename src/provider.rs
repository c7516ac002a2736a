//! Provider chain orchestrator.
//!
//! External translation providers are free-tier mirrors with different
//! request shapes. Each is described by a [`ProviderDescriptor`] and tried
//! through one uniform [`attempt`] operation, so providers can be added,
//! removed, or reordered without touching orchestration logic.
//!
//! Failure handling is fail-fast: any of {timeout, connection error, non-2xx
//! status, missing or malformed field} counts as an attempt failure and
//! advances the chain. There is no per-provider retry; the chain relies on
//! breadth of mirrors rather than depth. The per-attempt timeout bounds
//! worst-case latency of a full chain walk to roughly `providers × timeout`.

use crate::error::{ChainError, ProviderError};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Characters escaped when embedding text as a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%');

/// How a provider expects its request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestStyle {
    /// GET with the text URL-encoded into an endpoint template containing
    /// `{source}`, `{target}` and `{text}` placeholders (Lingva-style).
    TemplatedGet,
    /// POST with a JSON body `{q, source, target, format}` (LibreTranslate-style).
    JsonPost,
}

/// Configuration for one external provider. Not mutated at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub name: String,
    pub style: RequestStyle,
    pub endpoint: String,
    /// Dotted path to the translated string in the response body,
    /// e.g. "translation" or "data.translatedText".
    pub response_field: String,
}

impl ProviderDescriptor {
    pub fn templated_get(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        response_field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            style: RequestStyle::TemplatedGet,
            endpoint: endpoint.into(),
            response_field: response_field.into(),
        }
    }

    pub fn json_post(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        response_field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            style: RequestStyle::JsonPost,
            endpoint: endpoint.into(),
            response_field: response_field.into(),
        }
    }

    /// The default mirror chain, cheapest-to-reach first: Lingva, then the
    /// public LibreTranslate mirrors.
    pub fn default_chain() -> Vec<ProviderDescriptor> {
        vec![
            Self::templated_get(
                "lingva",
                "https://lingva.ml/api/v1/{source}/{target}/{text}",
                "translation",
            ),
            Self::json_post(
                "libretranslate-de",
                "https://libretranslate.de/translate",
                "translatedText",
            ),
            Self::json_post(
                "argosopentech",
                "https://translate.argosopentech.com/translate",
                "translatedText",
            ),
            Self::json_post("vern", "https://lt.vern.cc/translate", "translatedText"),
            Self::json_post(
                "terraprint",
                "https://translate.terraprint.co/translate",
                "translatedText",
            ),
        ]
    }

    /// Fill the endpoint template for a templated-GET request.
    fn build_get_url(&self, text: &str, source: &str, target: &str) -> String {
        let encoded = utf8_percent_encode(text, PATH_SEGMENT).to_string();
        self.endpoint
            .replace("{source}", source)
            .replace("{target}", target)
            .replace("{text}", &encoded)
    }
}

/// LibreTranslate-shaped request body.
#[derive(Debug, Serialize)]
struct JsonPostBody<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
}

/// Successful chain resolution.
#[derive(Debug, Clone)]
pub struct ChainSuccess {
    pub text: String,
    pub provider: String,
    /// Attempts made including the successful one.
    pub attempts: usize,
}

/// Issue one bounded request to a single provider and validate the response.
///
/// Never panics on malformed input: every structural problem maps to
/// `ProviderError::BadResponse`.
pub async fn attempt(
    client: &reqwest::Client,
    descriptor: &ProviderDescriptor,
    text: &str,
    source: &str,
    target: &str,
    timeout: Duration,
) -> Result<String, ProviderError> {
    let request = match descriptor.style {
        RequestStyle::TemplatedGet => client
            .get(descriptor.build_get_url(text, source, target))
            .timeout(timeout),
        RequestStyle::JsonPost => client
            .post(&descriptor.endpoint)
            .timeout(timeout)
            .json(&JsonPostBody {
                q: text,
                source,
                target,
                format: "text",
            }),
    };

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            ProviderError::Network(format!("request timed out after {:?}", timeout))
        } else {
            ProviderError::Network(e.to_string())
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::BadResponse(format!(
            "unexpected status {}",
            status
        )));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| ProviderError::BadResponse(format!("invalid JSON body: {}", e)))?;

    match extract_field(&body, &descriptor.response_field) {
        Some(translated) if !translated.is_empty() => Ok(translated.to_string()),
        _ => Err(ProviderError::BadResponse(format!(
            "missing or empty field '{}'",
            descriptor.response_field
        ))),
    }
}

/// Walk a dotted field path into a JSON body.
fn extract_field<'a>(body: &'a Value, path: &str) -> Option<&'a str> {
    let mut current = body;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    current.as_str()
}

/// Try each provider in order, short-circuiting at the first structurally
/// valid success. Exhausting the list is the chain's only error.
pub async fn resolve_via_chain(
    client: &reqwest::Client,
    providers: &[ProviderDescriptor],
    text: &str,
    source: &str,
    target: &str,
    timeout: Duration,
) -> Result<ChainSuccess, ChainError> {
    for (index, descriptor) in providers.iter().enumerate() {
        match attempt(client, descriptor, text, source, target, timeout).await {
            Ok(translated) => {
                debug!(
                    "Provider '{}' translated to '{}' on attempt {}/{}",
                    descriptor.name,
                    target,
                    index + 1,
                    providers.len()
                );
                return Ok(ChainSuccess {
                    text: translated,
                    provider: descriptor.name.clone(),
                    attempts: index + 1,
                });
            }
            Err(e) => {
                warn!("Provider '{}' failed: {}", descriptor.name, e);
            }
        }
    }

    Err(ChainError::AllProvidersExhausted {
        attempts: providers.len(),
    })
}
