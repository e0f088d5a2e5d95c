use httpmock::prelude::*;
use odata_fetch::config::Config;
use odata_fetch::pipeline::{Pipeline, Stage};
use odata_fetch::Error;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

const L1C: &str = "S2B_MSIL1C_20230512T103629_N0509_R008_T32UME_20230512T124324.SAFE";
const L2A_1: &str = "S2B_MSIL2A_20230512T103629_N0509_R008_T32UME_20230512T133422.SAFE";
const L2A_2: &str = "S2A_MSIL2A_20230517T103031_N0509_R108_T32UME_20230517T170051.SAFE";

fn product(id: &str, name: &str) -> Value {
    json!({
        "@odata.mediaContentType": "application/octet-stream",
        "Id": id,
        "Name": name,
        "ContentType": "application/octet-stream",
        "ContentLength": 1_093_219_827u64,
        "ContentDate": {"Start": "2023-05-12T10:36:29.024Z", "End": "2023-05-12T10:36:29.024Z"},
        "GeoFootprint": {
            "type": "Polygon",
            "coordinates": [[[7.5, 53.1], [9.1, 53.1], [9.1, 54.1], [7.5, 54.1], [7.5, 53.1]]]
        },
        "Attributes": [
            {"@odata.type": "#OData.CSC.StringAttribute", "Name": "productType", "Value": "S2MSI2A"}
        ]
    })
}

fn write_config(server: &MockServer, dir: &Path) -> Config {
    let path = dir.join("download.json");
    let content = json!({
        "data_collection": "SENTINEL-2",
        "area": [[8.0, 53.4], [8.4, 53.4], [8.4, 53.7], [8.0, 53.7], [8.0, 53.4]],
        "period": {"start": "2023-05-01", "end": "2023-06-01"},
        "attributes": {"productType": "S2MSI2A"},
        "user": {"name": "operator@example.org", "password": "s3cr3t"},
        "save_dir": dir.join("raster"),
        "endpoints": {
            "catalogue": server.url("/odata/v1/Products"),
            "identity": server.url("/auth/realms/CDSE/protocol/openid-connect/token")
        }
    });
    fs::write(&path, content.to_string()).unwrap();
    Config::read(&path).unwrap()
}

#[tokio::test]
async fn test_full_run_downloads_every_selected_product() {
    let server = MockServer::start_async().await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&server, dir.path());

    let search = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/odata/v1/Products")
                .query_param("$top", "1000")
                .query_param("$count", "True")
                .query_param("$expand", "Attributes")
                .query_param_exists("$filter");
            then.status(200).json_body(json!({
                "@odata.count": 3,
                "value": [product("p-l1c", L1C), product("p-1", L2A_1), product("p-2", L2A_2)]
            }));
        })
        .await;
    let token = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/auth/realms/CDSE/protocol/openid-connect/token")
                .x_www_form_urlencoded_tuple("grant_type", "password");
            then.status(200).json_body(json!({"access_token": "run-token", "expires_in": 600}));
        })
        .await;
    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/odata/v1/Products(p-1)/$value")
                .header("authorization", "Bearer run-token");
            then.status(302).header("Location", "/download/p-1");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/download/p-1")
                .header("authorization", "Bearer run-token");
            then.status(200).body("first product");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/odata/v1/Products(p-2)/$value")
                .header("authorization", "Bearer run-token");
            then.status(200).body("second product");
        })
        .await;
    let excluded = server
        .mock_async(|when, then| {
            when.method(GET).path("/odata/v1/Products(p-l1c)/$value");
            then.status(200).body("never requested");
        })
        .await;

    let save_dir = config.save_dir.clone();
    let mut pipeline = Pipeline::from_config(config).unwrap();
    let report = pipeline.run().await.unwrap();

    search.assert_hits_async(1).await;
    token.assert_hits_async(1).await;
    first.assert_hits_async(1).await;
    excluded.assert_hits_async(0).await;

    assert_eq!(pipeline.stage(), Stage::Done);
    assert_eq!(report.attempted(), 2);
    assert!(report.failed.is_empty());
    assert_eq!(
        fs::read_to_string(save_dir.join("S2B_MSIL2A_20230512T103629_N0509_R008_T32UME_20230512T133422.zip")).unwrap(),
        "first product"
    );
    assert_eq!(
        fs::read_to_string(save_dir.join("S2A_MSIL2A_20230517T103031_N0509_R108_T32UME_20230517T170051.zip")).unwrap(),
        "second product"
    );
}

#[tokio::test]
async fn test_empty_catalogue_never_authenticates() {
    let server = MockServer::start_async().await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&server, dir.path());

    server
        .mock_async(|when, then| {
            when.method(GET).path("/odata/v1/Products");
            then.status(200).json_body(json!({"@odata.count": 0, "value": []}));
        })
        .await;
    let token = server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/realms/CDSE/protocol/openid-connect/token");
            then.status(200).json_body(json!({"access_token": "unused"}));
        })
        .await;

    let mut pipeline = Pipeline::from_config(config).unwrap();
    let result = pipeline.run().await;

    assert!(matches!(result, Err(Error::NoData)));
    assert_eq!(pipeline.stage(), Stage::NoData);
    token.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_rejected_credentials_abort_the_run() {
    let server = MockServer::start_async().await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&server, dir.path());

    server
        .mock_async(|when, then| {
            when.method(GET).path("/odata/v1/Products");
            then.status(200).json_body(json!({"value": [product("p-1", L2A_1)]}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/realms/CDSE/protocol/openid-connect/token");
            then.status(401).json_body(json!({"error": "invalid_grant"}));
        })
        .await;
    let download = server
        .mock_async(|when, then| {
            when.method(GET).path("/odata/v1/Products(p-1)/$value");
            then.status(200).body("never requested");
        })
        .await;

    let mut pipeline = Pipeline::from_config(config).unwrap();
    let result = pipeline.run().await;

    assert!(matches!(result, Err(Error::Authentication(_))));
    assert_eq!(pipeline.stage(), Stage::Filtered);
    download.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_select_lists_without_authenticating() {
    let server = MockServer::start_async().await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&server, dir.path());

    server
        .mock_async(|when, then| {
            when.method(GET).path("/odata/v1/Products");
            then.status(200).json_body(json!({"value": [product("p-l1c", L1C), product("p-2", L2A_2)]}));
        })
        .await;

    let mut pipeline = Pipeline::from_config(config).unwrap();
    let selected = pipeline.select().await.unwrap();

    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].id(), "p-2");
    assert_eq!(pipeline.stage(), Stage::Filtered);
}
