//! Integration tests for the ingest sink HTTP server

#[cfg(feature = "sink")]
mod sink_tests {
    use crowd_density_emitter::sink::{run, SinkConfig};
    use std::time::Duration;

    fn reading(location: &str, gate: &str, density: f64) -> serde_json::Value {
        serde_json::json!({
            "locationId": location,
            "gateId": gate,
            "density": density,
        })
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (addr, shutdown_tx) = run(SinkConfig::new(0)).await.expect("Failed to start sink");
        tokio::time::sleep(Duration::from_millis(100)).await;

        let client = reqwest::Client::new();
        let response = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["status"], "ok");
        assert!(body["version"].as_str().is_some());

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_ingest_created() {
        let (addr, shutdown_tx) = run(SinkConfig::new(0)).await.expect("Failed to start sink");
        tokio::time::sleep(Duration::from_millis(100)).await;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("http://{}/api/crowd-data", addr))
            .json(&reading("stadium1", "G1", 5.25))
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["message"], "Crowd data recorded");

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_ingest_requires_fields() {
        let (addr, shutdown_tx) = run(SinkConfig::new(0)).await.expect("Failed to start sink");
        tokio::time::sleep(Duration::from_millis(100)).await;

        let client = reqwest::Client::new();
        let bad_bodies = [
            serde_json::json!({ "gateId": "G1", "density": 5.0 }),
            serde_json::json!({ "locationId": "stadium1", "density": 5.0 }),
            serde_json::json!({ "locationId": "stadium1", "gateId": "G1", "density": "5.0" }),
        ];

        for body in &bad_bodies {
            let response = client
                .post(format!("http://{}/api/crowd-data", addr))
                .json(body)
                .send()
                .await
                .expect("Failed to send request");

            assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
            let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
            assert!(body["error"].as_str().unwrap_or("").contains("required"));
        }

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_ingest_requires_json_content_type() {
        let (addr, shutdown_tx) = run(SinkConfig::new(0)).await.expect("Failed to start sink");
        tokio::time::sleep(Duration::from_millis(100)).await;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("http://{}/api/crowd-data", addr))
            .header("Content-Type", "text/plain")
            .body(reading("stadium1", "G1", 5.0).to_string())
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_heatmap_and_risk_stats() {
        let (addr, shutdown_tx) = run(SinkConfig::new(0)).await.expect("Failed to start sink");
        tokio::time::sleep(Duration::from_millis(100)).await;

        let client = reqwest::Client::new();
        let ingest = format!("http://{}/api/crowd-data", addr);
        // stadium1/G1 jumps from 7.5 to 9.5: stampede. metro1/G1 is safe.
        for body in [
            reading("stadium1", "G1", 7.5),
            reading("stadium1", "G1", 9.5),
            reading("metro1", "G1", 3.0),
        ] {
            let response = client.post(&ingest).json(&body).send().await.unwrap();
            assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        }

        let heatmap: serde_json::Value = client
            .get(format!("http://{}/api/heatmap", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let entries = heatmap.as_array().expect("heatmap is an array");
        assert_eq!(entries.len(), 2);
        let stadium = entries
            .iter()
            .find(|e| e["locationId"] == "stadium1")
            .expect("stadium entry");
        assert_eq!(stadium["density"], 9.5);

        let stats: serde_json::Value = client
            .get(format!("http://{}/api/risk-stats", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(stats["summary"]["total"], 2);
        assert_eq!(stats["summary"]["stampede"], 1);
        assert_eq!(stats["summary"]["safe"], 1);
        assert_eq!(stats["riskDistribution"]["stampede"], "50.0%");
        assert_eq!(stats["riskDistribution"]["high"], "0.0%");

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_zones_lists_catalog() {
        let (addr, shutdown_tx) = run(SinkConfig::new(0)).await.expect("Failed to start sink");
        tokio::time::sleep(Duration::from_millis(100)).await;

        let zones: serde_json::Value = reqwest::get(format!("http://{}/api/zones", addr))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let zones = zones.as_array().expect("zones is an array");
        assert_eq!(zones.len(), 3);
        assert_eq!(zones[1]["locationName"], "MG Road Metro Station");
        assert_eq!(zones[1]["gates"].as_array().map(Vec::len), Some(4));

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_forced_status() {
        let config = SinkConfig::new(0).respond_with(500);
        let (addr, shutdown_tx) = run(config).await.expect("Failed to start sink");
        tokio::time::sleep(Duration::from_millis(100)).await;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("http://{}/api/crowd-data", addr))
            .json(&reading("mall1", "G2", 4.0))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);

        // Nothing was stored.
        let heatmap: serde_json::Value = client
            .get(format!("http://{}/api/heatmap", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(heatmap.as_array().map(Vec::len), Some(0));

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let (addr, shutdown_tx) = run(SinkConfig::new(0)).await.expect("Failed to start sink");
        tokio::time::sleep(Duration::from_millis(100)).await;

        let client = reqwest::Client::new();
        let response = client
            .request(reqwest::Method::OPTIONS, format!("http://{}/api/crowd-data", addr))
            .header("Origin", "http://localhost:3000")
            .header("Access-Control-Request-Method", "POST")
            .send()
            .await
            .expect("Failed to send request");

        assert!(
            response.status().is_success() || response.status() == reqwest::StatusCode::NO_CONTENT,
            "CORS preflight failed: {}",
            response.status()
        );

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_invalid_forced_status() {
        let config = SinkConfig::new(0).respond_with(42);
        assert!(run(config).await.is_err());
    }
}
