#![allow(clippy::unwrap_used)]
// Integration tests for `EeroClient` using wiremock.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use eero_api::{ApiClient, ApiConfig, MemoryCredentialStore, RetryPolicy, SecretString};
use eero_core::{
    ClientStatus, ContentFilter, DomainList, EeroClient, Error, GuestNetworkUpdate, NetworkResource,
    NetworkStatus, ResourceId,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, EeroClient) {
    let server = MockServer::start().await;
    let config = ApiConfig {
        retry: RetryPolicy::new(2, Duration::from_millis(1)),
        ..ApiConfig::default()
    }
    .with_base_url(format!("{}/2.2/", server.uri()));
    let api = ApiClient::new(config, Arc::new(MemoryCredentialStore::with_token("tok"))).unwrap();
    (server, EeroClient::new(api))
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "meta": { "code": 200 }, "data": data }))
}

async fn mount_networks(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/2.2/networks"))
        .respond_with(ok(json!({
            "count": 2,
            "data": [
                { "url": "/2.2/networks/111", "name": "Home", "status": "connected" },
                { "url": "/2.2/networks/222", "name": "Cabin", "status": "offline" }
            ]
        })))
        .mount(server)
        .await;
}

// ── Networks ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_networks_are_typed() {
    let (server, client) = setup().await;
    mount_networks(&server).await;

    let networks = client.networks().await.unwrap().to_vec().unwrap();
    assert_eq!(networks.len(), 2);
    assert_eq!(networks[0].id.as_str(), "111");
    assert_eq!(networks[0].status, NetworkStatus::Online);
    assert_eq!(networks[1].status, NetworkStatus::Offline);
}

#[tokio::test]
async fn test_resolve_network_order() {
    let (server, client) = setup().await;
    mount_networks(&server).await;

    assert_eq!(
        client.resolve_network(Some("999")).await.unwrap().as_str(),
        "999"
    );
    assert_eq!(client.resolve_network(None).await.unwrap().as_str(), "111");

    let client = client.with_default_network(Some(ResourceId::new("222")));
    assert_eq!(client.resolve_network(None).await.unwrap().as_str(), "222");
}

#[tokio::test]
async fn test_resolve_network_with_empty_account() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/2.2/networks"))
        .respond_with(ok(json!({ "count": 0, "data": [] })))
        .mount(&server)
        .await;

    let err = client.resolve_network(None).await.unwrap_err();
    assert!(err.is_not_found(), "got: {err:?}");
}

#[tokio::test]
async fn test_malformed_list_is_not_a_transport_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/2.2/networks/111/eeros"))
        .respond_with(ok(json!({ "unexpected": true })))
        .mount(&server)
        .await;

    let err = client
        .eeros(&ResourceId::new("111"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, Error::MalformedResponse { entity: "eero", .. }),
        "got: {err:?}"
    );
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_block_device_refreshes_device_list() {
    let (server, client) = setup().await;
    let network = ResourceId::new("111");

    Mock::given(method("GET"))
        .and(path("/2.2/networks/111/devices"))
        .respond_with(ok(json!([
            { "url": "/2.2/networks/111/devices/d1", "mac": "aa:bb:cc:00:00:01", "connected": true }
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2.2/networks/111/devices"))
        .respond_with(ok(json!([
            { "url": "/2.2/networks/111/devices/d1", "mac": "aa:bb:cc:00:00:01", "connected": true, "blocked": true }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/2.2/networks/111/devices/d1"))
        .and(body_json(json!({ "blocked": true })))
        .respond_with(ok(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let before = client.devices(&network).await.unwrap().to_vec().unwrap();
    assert_eq!(before[0].status, ClientStatus::Connected);

    client
        .block_device(&network, &ResourceId::new("d1"), true)
        .await
        .unwrap();

    let after = client.devices(&network).await.unwrap().to_vec().unwrap();
    assert_eq!(after[0].status, ClientStatus::Blocked);
}

#[tokio::test]
async fn test_guest_network_update_body() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/2.2/networks/111/guest_network"))
        .and(body_json(json!({ "enabled": true, "name": "Visitors", "password": "s3cret-pass" })))
        .respond_with(ok(json!({ "enabled": true })))
        .expect(1)
        .mount(&server)
        .await;

    let update = GuestNetworkUpdate {
        enabled: true,
        name: Some("Visitors".into()),
        password: Some(SecretString::from("s3cret-pass")),
    };
    client
        .set_guest_network(&ResourceId::new("111"), &update)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_pause_profile_and_get() {
    let (server, client) = setup().await;
    let network = ResourceId::new("111");
    let profile = ResourceId::new("p1");

    Mock::given(method("PUT"))
        .and(path("/2.2/networks/111/profiles/p1"))
        .and(body_json(json!({ "paused": true })))
        .respond_with(ok(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2.2/networks/111/profiles/p1"))
        .respond_with(ok(json!({
            "url": "/2.2/networks/111/profiles/p1",
            "name": "Kids",
            "paused": true
        })))
        .mount(&server)
        .await;

    client.pause_profile(&network, &profile, true).await.unwrap();
    let fetched = client.profile(&network, &profile).await.unwrap();
    assert!(fetched.paused);
    assert_eq!(fetched.name, "Kids");
}

#[tokio::test]
async fn test_content_filter_and_domain_list_bodies() {
    let (server, client) = setup().await;
    let network = ResourceId::new("111");
    let profile = ResourceId::new("p1");

    Mock::given(method("PUT"))
        .and(path("/2.2/networks/111/profiles/p1"))
        .and(body_json(json!({ "content_filter": { "block_adult": true, "adblock": false } })))
        .respond_with(ok(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/2.2/networks/111/profiles/p1"))
        .and(body_json(json!({ "custom_block_list": ["games.example"] })))
        .respond_with(ok(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .set_content_filter(
            &network,
            &profile,
            &[(ContentFilter::BlockAdult, true), (ContentFilter::Adblock, false)],
        )
        .await
        .unwrap();
    client
        .set_domain_list(&network, &profile, DomainList::Block, &["games.example".to_owned()])
        .await
        .unwrap();
}

// ── Network resources ───────────────────────────────────────────────

#[tokio::test]
async fn test_network_reboot_evicts_resource_reads() {
    let (server, client) = setup().await;
    let network = ResourceId::new("111");

    Mock::given(method("GET"))
        .and(path("/2.2/networks/111/settings"))
        .respond_with(ok(json!({ "band_steering": true })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2.2/networks/111/reboot"))
        .respond_with(ok(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let first = client
        .network_resource(&network, NetworkResource::Settings, None)
        .await
        .unwrap();
    assert_eq!(first["band_steering"], json!(true));
    // Served from cache.
    client
        .network_resource(&network, NetworkResource::Settings, None)
        .await
        .unwrap();

    client.reboot_network(&network).await.unwrap();
    client
        .network_resource(&network, NetworkResource::Settings, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_network_resource_item_path() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/2.2/networks/111/insights/i9"))
        .respond_with(ok(json!({ "id": "i9", "title": "New device" })))
        .expect(1)
        .mount(&server)
        .await;

    let insight = client
        .network_resource(&ResourceId::new("111"), NetworkResource::Insights, Some("i9"))
        .await
        .unwrap();
    assert_eq!(insight["title"], json!("New device"));
}

#[tokio::test]
async fn test_speed_test_returns_measurement() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/2.2/networks/111/speedtest"))
        .respond_with(ok(json!({ "down": { "value": 512.0 }, "up": { "value": 40.5 } })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client
        .run_speed_test(&ResourceId::new("111"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.down_mbps, Some(512.0));
    assert_eq!(result.up_mbps, Some(40.5));
}

#[tokio::test]
async fn test_account_is_cached() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/2.2/account"))
        .respond_with(ok(json!({ "name": "Ada", "email": { "value": "ada@example.com" } })))
        .expect(1)
        .mount(&server)
        .await;

    let account = client.account().await.unwrap();
    assert_eq!(account["name"], json!("Ada"));
    client.account().await.unwrap();
}
