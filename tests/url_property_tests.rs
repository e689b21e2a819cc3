//! Property-based tests for URL construction and model-name normalization.

use proptest::prelude::*;
use url::Url;

use gemini_live::{Backend, build_gemini_url, build_vertex_url, normalize_model};

/// Generator for GCP-style location strings.
fn arb_location() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9\\-]{0,20}[a-z0-9]"
}

/// Generator for plausible API key material.
fn arb_api_key() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_\\-]{8,40}"
}

/// Generator for bare model names.
fn arb_model_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9.\\-]{1,40}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any regional Vertex base produces a parseable wss URL ending in the
    /// bidi service path.
    #[test]
    fn prop_vertex_url_shape(location in arb_location()) {
        let base = Url::parse(&format!("https://{location}-aiplatform.googleapis.com")).unwrap();
        let url = build_vertex_url(&base, "v1beta1").unwrap();
        prop_assert!(url.starts_with("wss://"));
        let expected_host = format!("{}-aiplatform.googleapis.com", location);
        prop_assert!(url.contains(&expected_host));
        prop_assert!(
            url.ends_with("/ws/google.cloud.aiplatform.v1beta1.LlmBidiService/BidiGenerateContent")
        );
        prop_assert!(Url::parse(&url).is_ok());
    }

    /// A plain API key always selects the unconstrained method and the
    /// `key` query parameter.
    #[test]
    fn prop_gemini_url_plain_key(key in arb_api_key()) {
        let base = Url::parse("https://generativelanguage.googleapis.com").unwrap();
        let url = build_gemini_url(&base, "v1beta", Some(key.as_str())).unwrap();
        prop_assert!(url.contains("GenerativeService.BidiGenerateContent?"));
        prop_assert!(!url.contains("Constrained"));
        let expected_suffix = format!("?key={}", key);
        prop_assert!(url.ends_with(&expected_suffix));
    }

    /// An `auth_tokens/` key always selects the constrained method and the
    /// `access_token` query parameter.
    #[test]
    fn prop_gemini_url_ephemeral_token(suffix in arb_api_key()) {
        let key = format!("auth_tokens/{suffix}");
        let base = Url::parse("https://generativelanguage.googleapis.com").unwrap();
        let url = build_gemini_url(&base, "v1beta", Some(key.as_str())).unwrap();
        prop_assert!(url.contains("GenerativeService.BidiGenerateContentConstrained?"));
        let expected_suffix = format!("?access_token={}", key);
        prop_assert!(url.ends_with(&expected_suffix));
    }

    /// Normalization is idempotent for both backends.
    #[test]
    fn prop_normalize_model_idempotent(name in arb_model_name()) {
        for backend in [Backend::GeminiApi, Backend::VertexAi] {
            let once = normalize_model(backend, &name);
            let twice = normalize_model(backend, &once);
            prop_assert_eq!(&once, &twice);
        }
    }

    /// Bare names resolve under `models/` for the Gemini API and under
    /// `publishers/google/models/` for Vertex AI.
    #[test]
    fn prop_normalize_model_bare_names(name in arb_model_name()) {
        prop_assume!(!name.contains('/'));
        prop_assert_eq!(
            normalize_model(Backend::GeminiApi, &name),
            format!("models/{name}")
        );
        prop_assert_eq!(
            normalize_model(Backend::VertexAi, &name),
            format!("publishers/google/models/{name}")
        );
    }
}
