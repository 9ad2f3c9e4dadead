use std::time::Duration;

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{Map, Value, json};
use waldur_client::models::{
    CreateInstance, CreateVolume, FloatingIp, NetworkSpec, ScopeCreation, WaitOptions,
};
use waldur_client::{ClientConfig, WaldurClient, WaldurError};

const OFFERING: &str = "d42a18b6b8ba4c2bb0591b3ff8fb181d";
const TENANT: &str = "1c4b9c5e3e9f4a7f8f3e7b2a6d5c4b3a";
const PROJECT: &str = "4475ac77fa3a491aacb3fb3a6dfadadf";
const ORDER: &str = "9ae5e13294884628aaf984a82214f7c4";
const INSTANCE: &str = "6b6e60870ad64085aadcdcbc1fd84a7e";
const RESOURCE: &str = "b1f2a3c4d5e64f7a8b9c0d1e2f3a4b5c";

fn client(server: &ServerGuard) -> WaldurClient {
    let config = ClientConfig::new(format!("{}/api", server.url()), "token")
        .with_conflict_retry_delay(Duration::ZERO);
    WaldurClient::new(config).unwrap()
}

fn fast_wait() -> WaitOptions {
    WaitOptions::default().with_interval(Duration::ZERO)
}

fn collection(relative: &str) -> Matcher {
    Matcher::Regex(format!(r"^/api/{}(\?.*)?$", relative))
}

async fn lookup(server: &mut ServerGuard, relative: &str, body: Value) -> Mock {
    server
        .mock("GET", collection(relative))
        .with_status(200)
        .with_body(body.to_string())
        .create_async()
        .await
}

/// Offering, flavor, image, subnet, security group, SSH key and project lookups.
async fn mock_lookups(server: &mut ServerGuard) -> Vec<Mock> {
    let offering = server
        .mock("GET", format!("/api/marketplace-public-offerings/{OFFERING}/").as_str())
        .with_status(200)
        .with_body(json!({"uuid": OFFERING, "scope_uuid": TENANT}).to_string())
        .create_async()
        .await;
    vec![
        offering,
        lookup(server, "openstack-flavors/", json!([{"url": "url_flavor"}])).await,
        lookup(server, "openstack-images/", json!([{"url": "url_image"}])).await,
        lookup(server, "openstack-subnets/", json!([{"url": "url_subnet"}])).await,
        lookup(
            server,
            "openstack-security-groups/",
            json!([{"url": "url_security_group"}]),
        )
        .await,
        lookup(server, "keys/", json!([{"url": "url_ssh_key"}])).await,
        lookup(server, "projects/", json!([{"uuid": PROJECT}])).await,
    ]
}

async fn mock_order_for_instance(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", format!("/api/marketplace-orders/{ORDER}/").as_str())
        .with_status(200)
        .with_body(json!({"uuid": ORDER, "state": "executing", "resource_uuid": INSTANCE}).to_string())
        .create_async()
        .await
}

fn instance_request() -> CreateInstance {
    CreateInstance {
        name: "instance".to_string(),
        offering: OFFERING.to_string(),
        project: "project".to_string(),
        networks: vec![NetworkSpec::subnet("subnet").with_floating_ip(FloatingIp::Auto)],
        image: "image".to_string(),
        system_volume_size: 10,
        data_volume_size: Some(5),
        flavor: Some("flavor".to_string()),
        ssh_key: Some("ssh_key".to_string()),
        security_groups: vec!["web".to_string()],
        user_data: Some("user_data".to_string()),
        ..Default::default()
    }
}

#[test_log::test(tokio::test)]
async fn test_instance_order_body_and_external_ip_wait() {
    let mut server = Server::new_async().await;
    let base = format!("{}/api", server.url());
    let _lookups = mock_lookups(&mut server).await;
    let order = server
        .mock("POST", "/api/marketplace-orders/")
        .match_body(Matcher::Json(json!({
            "project": format!("{base}/projects/{PROJECT}/"),
            "offering": format!("{base}/marketplace-public-offerings/{OFFERING}/"),
            "attributes": {
                "name": "instance",
                "flavor": "url_flavor",
                "image": "url_image",
                "system_volume_size": 10240,
                "data_volume_size": 5120,
                "ports": [{"subnet": "url_subnet"}],
                "floating_ips": [{"subnet": "url_subnet"}],
                "security_groups": [{"url": "url_security_group"}],
                "ssh_public_key": "url_ssh_key",
                "user_data": "user_data"
            },
            "limits": {},
            "accepting_terms_of_service": true
        })))
        .with_status(201)
        .with_body(json!({"uuid": ORDER}).to_string())
        .create_async()
        .await;
    let _order_state = mock_order_for_instance(&mut server).await;
    let instance = server
        .mock("GET", format!("/api/openstack-instances/{INSTANCE}/").as_str())
        .with_status(200)
        .with_body(json!({"uuid": INSTANCE, "state": "OK", "external_ips": ["142.124.1.50"]}).to_string())
        .expect(2)
        .create_async()
        .await;

    let created = client(&server)
        .create_instance_via_marketplace(&instance_request(), &fast_wait())
        .await
        .unwrap();

    order.assert_async().await;
    instance.assert_async().await;
    assert_eq!(created, ScopeCreation::Created(INSTANCE.to_string()));
}

#[tokio::test]
async fn test_instance_without_floating_ip_skips_external_ip_wait() {
    let mut server = Server::new_async().await;
    let _lookups = mock_lookups(&mut server).await;
    let _order = server
        .mock("POST", "/api/marketplace-orders/")
        .match_body(Matcher::PartialJson(json!({"attributes": {"floating_ips": []}})))
        .with_status(201)
        .with_body(json!({"uuid": ORDER}).to_string())
        .create_async()
        .await;
    let _order_state = mock_order_for_instance(&mut server).await;
    let instance = server
        .mock("GET", format!("/api/openstack-instances/{INSTANCE}/").as_str())
        .with_status(200)
        .with_body(json!({"uuid": INSTANCE, "state": "OK", "external_ips": []}).to_string())
        .expect(1)
        .create_async()
        .await;

    let request = CreateInstance {
        networks: vec![NetworkSpec::subnet("subnet")],
        ..instance_request()
    };
    client(&server)
        .create_instance_via_marketplace(&request, &fast_wait())
        .await
        .unwrap();

    instance.assert_async().await;
}

#[tokio::test]
async fn test_flavor_is_picked_by_cpu_and_ram() {
    let mut server = Server::new_async().await;
    let offering = server
        .mock("GET", format!("/api/marketplace-public-offerings/{OFFERING}/").as_str())
        .with_status(200)
        .with_body(json!({"uuid": OFFERING, "scope_uuid": TENANT}).to_string())
        .create_async()
        .await;
    let flavors = server
        .mock("GET", collection("openstack-flavors/"))
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("tenant_uuid".into(), TENANT.into()),
            Matcher::UrlEncoded("o".into(), "cores,ram,disk".into()),
            Matcher::UrlEncoded("cores__gte".into(), "2".into()),
            Matcher::UrlEncoded("ram__gte".into(), "2000".into()),
        ]))
        .with_status(200)
        .with_body(json!([{"url": "url_small"}, {"url": "url_large"}]).to_string())
        .create_async()
        .await;
    let _image = lookup(&mut server, "openstack-images/", json!([{"url": "url_image"}])).await;
    let _subnet = lookup(&mut server, "openstack-subnets/", json!([{"url": "url_subnet"}])).await;
    let _project = lookup(&mut server, "projects/", json!([{"uuid": PROJECT}])).await;
    let order = server
        .mock("POST", "/api/marketplace-orders/")
        .match_body(Matcher::PartialJson(json!({"attributes": {"flavor": "url_small"}})))
        .with_status(201)
        .with_body(json!({"uuid": ORDER}).to_string())
        .create_async()
        .await;
    let _order_state = mock_order_for_instance(&mut server).await;

    let request = CreateInstance {
        name: "instance".to_string(),
        offering: OFFERING.to_string(),
        project: "project".to_string(),
        networks: vec![NetworkSpec::subnet("subnet")],
        image: "image".to_string(),
        system_volume_size: 10,
        flavor_min_cpu: Some(2),
        flavor_min_ram: Some(2000),
        ..Default::default()
    };
    client(&server)
        .create_instance_via_marketplace(&request, &WaitOptions::no_wait())
        .await
        .unwrap();

    offering.assert_async().await;
    flavors.assert_async().await;
    order.assert_async().await;
}

#[tokio::test]
async fn test_network_without_subnet_is_rejected() {
    let mut server = Server::new_async().await;
    let _lookups = mock_lookups(&mut server).await;
    let order = server
        .mock("POST", "/api/marketplace-orders/")
        .expect(0)
        .create_async()
        .await;

    let request = CreateInstance {
        networks: vec![NetworkSpec {
            subnet: None,
            floating_ip: Some(FloatingIp::Auto),
        }],
        ..instance_request()
    };
    let err = client(&server)
        .create_instance_via_marketplace(&request, &fast_wait())
        .await
        .unwrap_err();

    order.assert_async().await;
    assert_eq!(err.to_string(), "Wrong networks format. subnet key is required.");
}

#[tokio::test]
async fn test_erred_order_fails_instance_creation() {
    let mut server = Server::new_async().await;
    let _lookups = mock_lookups(&mut server).await;
    let _order = server
        .mock("POST", "/api/marketplace-orders/")
        .with_status(201)
        .with_body(json!({"uuid": ORDER}).to_string())
        .create_async()
        .await;
    let _order_state = server
        .mock("GET", format!("/api/marketplace-orders/{ORDER}/").as_str())
        .with_status(200)
        .with_body(json!({"uuid": ORDER, "state": "erred", "error_message": "Quota exceeded"}).to_string())
        .create_async()
        .await;

    let err = client(&server)
        .create_instance_via_marketplace(&instance_request(), &fast_wait())
        .await
        .unwrap_err();

    assert!(matches!(err, WaldurError::InvalidState(ref message) if message == "Quota exceeded"));
}

#[tokio::test]
async fn test_check_mode_plans_without_ordering() {
    let mut server = Server::new_async().await;
    let _lookups = mock_lookups(&mut server).await;
    let order = server
        .mock("POST", "/api/marketplace-orders/")
        .expect(0)
        .create_async()
        .await;

    let request = CreateInstance {
        check_mode: true,
        ..instance_request()
    };
    let planned = client(&server)
        .create_instance_via_marketplace(&request, &fast_wait())
        .await
        .unwrap();

    order.assert_async().await;
    match planned {
        ScopeCreation::Planned {
            attributes,
            project,
            offering_uuid,
        } => {
            assert_eq!(attributes["flavor"], "url_flavor");
            assert_eq!(project, "project");
            assert_eq!(offering_uuid, OFFERING);
        }
        other => panic!("Expected a planned creation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_instance_terminates_marketplace_resource() {
    let mut server = Server::new_async().await;
    let scope = format!("{}/api/openstack-instances/{INSTANCE}/", server.url());
    let _resources = server
        .mock("GET", collection("marketplace-resources/"))
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("offering_type".into(), "OpenStack.Instance".into()),
            Matcher::UrlEncoded("scope".into(), scope.clone()),
        ]))
        .with_status(200)
        .with_body(json!([{"uuid": RESOURCE, "scope": scope}]).to_string())
        .create_async()
        .await;
    let _instance = server
        .mock("GET", format!("/api/openstack-instances/{INSTANCE}/").as_str())
        .with_status(200)
        .with_body(json!({"uuid": INSTANCE}).to_string())
        .create_async()
        .await;
    let terminate = server
        .mock("POST", format!("/api/marketplace-resources/{RESOURCE}/terminate/").as_str())
        .match_body(Matcher::Json(json!({"attributes": {"release_floating_ips": false}})))
        .with_status(200)
        .with_body(json!({"order_uuid": ORDER}).to_string())
        .create_async()
        .await;

    let mut options = Map::new();
    options.insert("release_floating_ips".into(), json!(false));
    let order_uuid = client(&server)
        .delete_instance_via_marketplace(INSTANCE, options)
        .await
        .unwrap();

    terminate.assert_async().await;
    assert_eq!(order_uuid, ORDER);
}

#[tokio::test]
async fn test_volume_order_converts_size_and_type() {
    let mut server = Server::new_async().await;
    let _offering = server
        .mock("GET", format!("/api/marketplace-public-offerings/{OFFERING}/").as_str())
        .with_status(200)
        .with_body(json!({"uuid": OFFERING, "scope_uuid": TENANT}).to_string())
        .create_async()
        .await;
    let _volume_type = server
        .mock("GET", collection("openstack-volume-types/"))
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("name_exact".into(), "ssd".into()),
            Matcher::UrlEncoded("tenant_uuid".into(), TENANT.into()),
        ]))
        .with_status(200)
        .with_body(json!([{"url": "url_ssd"}]).to_string())
        .create_async()
        .await;
    let order = server
        .mock("POST", "/api/marketplace-orders/")
        .match_body(Matcher::PartialJson(json!({
            "attributes": {"name": "data", "size": 20480, "type": "url_ssd"}
        })))
        .with_status(201)
        .with_body(json!({"uuid": ORDER}).to_string())
        .create_async()
        .await;
    let _order_state = server
        .mock("GET", format!("/api/marketplace-orders/{ORDER}/").as_str())
        .with_status(200)
        .with_body(json!({"uuid": ORDER, "resource_uuid": "volume_uuid"}).to_string())
        .create_async()
        .await;

    let volume = CreateVolume {
        name: "data".to_string(),
        project: PROJECT.to_string(),
        offering: OFFERING.to_string(),
        size: 20,
        volume_type: Some("ssd".to_string()),
        ..Default::default()
    };
    let created = client(&server)
        .create_volume_via_marketplace(&volume, &WaitOptions::no_wait())
        .await
        .unwrap();

    order.assert_async().await;
    assert_eq!(created.resource_uuid(), Some("volume_uuid"));
}
