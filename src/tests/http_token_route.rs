#[cfg(test)]
mod tests {
    use anyhow::Result;
    use http::StatusCode;
    use serde_json::Value;

    use crate::cache::credential::RenewalPolicy;
    use crate::cache::credential_cache::CredentialCache;
    use crate::server::server::router;
    use crate::tests::common::{auth_error, build_reqwest_client, spawn_axum, test_settings, FakeProvider, Step};

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn serves_current_token_health_and_metrics() -> Result<()> {
        let settings = test_settings();
        let provider = FakeProvider::new("http-ok", vec![Step::ok("A", 60)]);
        let cache = CredentialCache::start(provider, RenewalPolicy::from_settings(&settings));
        let (server, addr) = spawn_axum(router(&settings, cache.source()).await).await;
        let client = build_reqwest_client();

        let response = client.get(format!("http://{}/token", addr)).send().await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await?;
        assert_eq!(body["access_token"], "A");
        assert_eq!(body["token_type"], "Bearer");

        let health = client.get(format!("http://{}/health", addr)).send().await?;
        assert_eq!(health.status(), StatusCode::OK);

        let metrics = client.get(format!("http://{}/metrics", addr)).send().await?;
        assert_eq!(metrics.status(), StatusCode::OK);
        let text = metrics.text().await?;
        assert!(text.contains("credentialcache_fetch_requests_total"));
        assert!(text.contains("provider=\"http-ok\""));

        server.abort();
        cache.shutdown().await;
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn fetch_error_is_service_unavailable() -> Result<()> {
        let settings = test_settings();
        let provider = FakeProvider::new("http-err", vec![Step::err(auth_error(401))]);
        let cache = CredentialCache::start(provider, RenewalPolicy::from_settings(&settings));
        let (server, addr) = spawn_axum(router(&settings, cache.source()).await).await;
        let client = build_reqwest_client();

        let response = client.get(format!("http://{}/token", addr)).send().await?;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = response.json().await?;
        assert_eq!(body["kind"], "auth");
        assert!(body["error"].as_str().unwrap_or_default().contains("invalid_client"));

        let health = client.get(format!("http://{}/health", addr)).send().await?;
        assert_eq!(health.status(), StatusCode::SERVICE_UNAVAILABLE);

        server.abort();
        cache.shutdown().await;
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn stopped_cache_is_service_unavailable() -> Result<()> {
        let settings = test_settings();
        let provider = FakeProvider::new("http-stopped", vec![Step::ok("A", 60)]);
        let cache = CredentialCache::start(provider, RenewalPolicy::from_settings(&settings));
        let (server, addr) = spawn_axum(router(&settings, cache.source()).await).await;
        cache.shutdown().await;

        let response = build_reqwest_client()
            .get(format!("http://{}/token", addr))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = response.json().await?;
        assert_eq!(body["kind"], "stopped");

        server.abort();
        Ok(())
    }
}
