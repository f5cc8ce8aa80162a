#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{routing::post, Json, Router};
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use reqwest::StatusCode;
    use serde_json::json;
    use serial_test::serial;
    use tokio::task::JoinSet;

    use crate::config::service::{AuthConfig, SecretValue};
    use crate::error::{ConfigurationError, ProviderError, TokenFetchError};
    use crate::sources::oauth2::OAuth2TokenProvider;
    use crate::sources::TokenProvider;
    use crate::tests::common::{auth_config, build_reqwest_client, spawn_axum};

    #[tokio::test]
    async fn get_fetches_once_and_serves_from_cache() {
        let server = MockServer::start_async().await;
        let token_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/services/oauth2/token")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .form_urlencoded_tuple("grant_type", "client_credentials")
                    .form_urlencoded_tuple("client_id", "test-client-id")
                    .form_urlencoded_tuple("client_secret", "test-client-secret");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(json!({"access_token": "abc-123", "token_type": "Bearer"}));
            })
            .await;

        let provider = OAuth2TokenProvider::new(
            auth_config(server.url("/services/oauth2/token")),
            build_reqwest_client(),
        );

        let first = provider.get().await.expect("first get");
        let second = provider.get().await.expect("second get");

        assert_eq!(first.value(), "abc-123");
        assert_eq!(second.value(), "abc-123");
        assert_eq!(token_mock.calls_async().await, 1);
    }

    #[tokio::test]
    async fn scope_is_sent_when_configured() {
        let server = MockServer::start_async().await;
        let token_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/token")
                    .form_urlencoded_tuple("scope", "api");
                then.status(200).json_body(json!({"access_token": "scoped"}));
            })
            .await;

        let mut cfg = auth_config(server.url("/token"));
        cfg.scope = Some("api".to_string());
        let provider = OAuth2TokenProvider::new(cfg, build_reqwest_client());

        assert_eq!(provider.fetch().await.unwrap().value(), "scoped");
        assert_eq!(token_mock.calls_async().await, 1);
    }

    #[tokio::test]
    async fn non_success_status_carries_status_and_body() {
        let server = MockServer::start_async().await;
        let token_mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/token");
                then.status(400)
                    .json_body(json!({"error": "invalid_client", "error_description": "bad secret"}));
            })
            .await;

        let provider = OAuth2TokenProvider::new(auth_config(server.url("/token")), build_reqwest_client());

        match provider.get().await {
            Err(ProviderError::Fetch(TokenFetchError::Status { status, body })) => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert!(body.contains("invalid_client"));
            }
            other => panic!("expected status error, got {:?}", other),
        }

        // nothing was cached, the next get tries again
        assert!(provider.get().await.is_err());
        assert_eq!(token_mock.calls_async().await, 2);
    }

    #[tokio::test]
    async fn success_without_access_token_is_malformed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/missing");
                then.status(200).json_body(json!({"token_type": "Bearer"}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/html");
                then.status(200).body("<html>login</html>");
            })
            .await;

        for path in ["/missing", "/html"] {
            let provider = OAuth2TokenProvider::new(auth_config(server.url(path)), build_reqwest_client());
            let result = provider.get().await;
            assert!(
                matches!(result, Err(ProviderError::Fetch(TokenFetchError::Malformed(_)))),
                "{}: {:?}",
                path,
                result
            );
        }
    }

    #[tokio::test]
    #[serial]
    async fn missing_credentials_fail_before_any_request() {
        let server = MockServer::start_async().await;
        let token_mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/token");
                then.status(200).json_body(json!({"access_token": "never"}));
            })
            .await;

        std::env::remove_var("SERIAL_BRIDGE_TEST_UNSET_CLIENT_ID");
        let from_env = AuthConfig::new(
            server.url("/token"),
            SecretValue::from_env("SERIAL_BRIDGE_TEST_UNSET_CLIENT_ID"),
            SecretValue::literal("secret"),
        );
        let provider = OAuth2TokenProvider::new(from_env, build_reqwest_client());
        assert!(matches!(
            provider.get().await,
            Err(ProviderError::Configuration(ConfigurationError::MissingEnv { setting: "client_id", .. }))
        ));

        let blank_secret = AuthConfig::new(
            server.url("/token"),
            SecretValue::literal("id"),
            SecretValue::literal("   "),
        );
        let provider = OAuth2TokenProvider::new(blank_secret, build_reqwest_client());
        assert!(matches!(
            provider.fetch().await,
            Err(ProviderError::Configuration(ConfigurationError::Missing("client_secret")))
        ));

        assert_eq!(token_mock.calls_async().await, 0);
    }

    #[tokio::test]
    async fn invalidate_is_idempotent_and_forces_a_fresh_fetch() {
        let server = MockServer::start_async().await;
        let token_mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/token");
                then.status(200).json_body(json!({"access_token": "abc"}));
            })
            .await;

        let provider = OAuth2TokenProvider::new(auth_config(server.url("/token")), build_reqwest_client());

        // nothing cached yet
        provider.invalidate().await;
        provider.invalidate().await;

        provider.get().await.unwrap();
        provider.invalidate().await;
        provider.invalidate().await;
        provider.get().await.unwrap();

        assert_eq!(token_mock.calls_async().await, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_cold_gets_share_one_fetch() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();
        let router = Router::new().route("/token", post(move || {
            let c = counter_clone.clone();
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::time::sleep(Duration::from_millis(100)).await;
                Json(json!({"access_token": format!("token-{}", n)}))
            }
        }));
        let (handle, addr) = spawn_axum(router).await;

        let provider = OAuth2TokenProvider::new(
            auth_config(format!("http://{}/token", addr)),
            build_reqwest_client(),
        );

        let mut join_set = JoinSet::new();
        for _ in 0..8 {
            let provider = provider.clone();
            join_set.spawn(async move { provider.get().await.map(|c| c.value().to_owned()) });
        }
        let values: Vec<String> = join_set
            .join_all()
            .await
            .into_iter()
            .map(|r| r.expect("get"))
            .collect();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(values.iter().all(|v| v == "token-1"));

        handle.abort();
    }
}
