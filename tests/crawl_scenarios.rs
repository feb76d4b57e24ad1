//! End-to-end scenarios from the design spec's §8: announcement of a small
//! HTML file, directory expansion, dedup skip, and a binary file being
//! skipped — driven against a mocked gateway with `wiremock`.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crawld::config::GatewayConfig;
use crawld::dedup::BloomSeenSet;
use crawld::gateway::GatewayClient;
use crawld::sink::LoggingSink;
use crawld::types::QueueItem;

fn gateway_config(server: &MockServer) -> GatewayConfig {
    let url = server.uri();
    let rest = url.strip_prefix("http://").expect("mock server is http");
    let (host, port) = rest.split_once(':').expect("mock server has a port");
    GatewayConfig {
        host: host.to_string(),
        port: port.parse().expect("numeric port"),
    }
}

async fn client(server: &MockServer) -> GatewayClient {
    GatewayClient::new(&gateway_config(server), Duration::from_secs(5)).unwrap()
}

const HTML: &[u8] = b"<!doctype html><html><title>Hi</title><body>Hello  world</body></html>";

#[tokio::test]
async fn scenario_a_small_html_file_is_indexed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/cat"))
        .and(query_param("arg", "Qm1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(HTML))
        .mount(&server)
        .await;

    let gateway = client(&server).await;
    let head = gateway.cat("Qm1", 0, Some(128)).await.unwrap();
    let mime = crawld::classify::classify(&head);
    assert_eq!(mime, "text/html");

    let body = gateway.cat("Qm1", 0, None).await.unwrap();
    let extracted = crawld::extract::extract(&body);
    assert_eq!(extracted.title, "Hi");
    assert_eq!(extracted.text, "Hello\nworld");

    let sink = LoggingSink::new();
    let record = crawld::types::ExtractedRecord {
        cid: "Qm1".to_string(),
        filename: String::new(),
        mime: mime.clone(),
        title: Some(extracted.title),
        text: Some(extracted.text),
    };
    crawld::sink::Sink::upsert(&sink, &record).await.unwrap();
}

#[tokio::test]
async fn scenario_b_directory_expansion_lists_children() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/cat"))
        .and(query_param("arg", "Qm2"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"Message": "this dag node is a directory"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v0/ls"))
        .and(query_param("arg", "Qm2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Objects": [{
                "Links": [
                    {"Hash": "Qm3", "Name": "a.html"},
                    {"Hash": "Qm4", "Name": "b.bin"}
                ]
            }]
        })))
        .mount(&server)
        .await;

    let gateway = client(&server).await;
    let err = gateway.cat("Qm2", 0, Some(128)).await.unwrap_err();
    assert!(matches!(err, crawld::error::GatewayError::IsDirectory(_)));

    let links = gateway.ls("Qm2").await.unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].hash, "Qm3");
    assert_eq!(links[0].name, "a.html");
    assert_eq!(links[1].hash, "Qm4");

    let queue = Arc::new(crawld::queue::CrawlQueue::new(1));
    // The queue is already "at capacity" conceptually (cap=1, currently
    // empty here, but offer must never block regardless) — exercise the
    // non-blocking expansion path directly.
    for link in &links {
        queue
            .offer(QueueItem::child(link.hash.clone(), link.name.clone()))
            .await;
    }
    let first = queue.get().await;
    assert_eq!(first.cid, "Qm3");
    let second = queue.get().await;
    assert_eq!(second.cid, "Qm4");
}

#[tokio::test]
async fn scenario_c_dedup_skips_repeated_announcement() {
    let dedup = BloomSeenSet::new(1_000);
    assert!(!dedup.check_and_insert("Qm1"));
    // Second announcement of the same CID must be recognized as already seen.
    assert!(dedup.check_and_insert("Qm1"));
}

#[tokio::test]
async fn scenario_d_binary_file_is_classified_but_not_indexed() {
    let server = MockServer::start().await;
    let mut png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    png.extend(std::iter::repeat(0u8).take(120));

    Mock::given(method("GET"))
        .and(path("/api/v0/cat"))
        .and(query_param("arg", "Qm5"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png.clone()))
        .mount(&server)
        .await;

    let gateway = client(&server).await;
    let head = gateway.cat("Qm5", 0, Some(128)).await.unwrap();
    let mime = crawld::classify::classify(&head);
    assert_eq!(mime, "image/png");
    assert_ne!(mime, "text/html");
}
