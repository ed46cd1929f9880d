//! Shared fixtures for pipeline integration tests
//!
//! A [`Fixture`] pairs a local wiremock server (standing in for the
//! manifest host, library host and object store) with a temporary base
//! directory.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::SimpleFileOptions;

use client_fetcher::app::{
    Arch, ClientConfig, Coordinator, CoordinatorConfig, GraphicsQuality, HostPlatform, Platform,
    Sha1Hash,
};

pub const INDEX_ID: &str = "idx";

pub fn sha1_hex(bytes: &[u8]) -> String {
    Sha1Hash::compute(bytes).to_hex()
}

pub fn linux_host() -> HostPlatform {
    HostPlatform::new(Platform::Linux, Arch::X86_64)
}

/// Build an in-memory zip archive
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(body).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Object store path of a content digest
pub fn object_path(body: &[u8]) -> String {
    let hex = sha1_hex(body);
    format!("/objects/{}/{}", &hex[..2], hex)
}

/// Asset index JSON for `(logical name, content)` pairs
pub fn asset_index(objects: &[(&str, &[u8])]) -> Vec<u8> {
    let mut map = serde_json::Map::new();
    for (name, body) in objects {
        map.insert(
            name.to_string(),
            json!({ "hash": sha1_hex(body), "size": body.len() }),
        );
    }
    serde_json::to_vec(&json!({ "objects": map })).unwrap()
}

pub struct Fixture {
    pub server: MockServer,
    pub dir: TempDir,
}

impl Fixture {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.server.uri(), path)
    }

    /// Serve `body` at `route`, expecting exactly `calls` requests
    pub async fn serve(&self, route: &str, body: Vec<u8>, calls: u64) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .expect(calls)
            .mount(&self.server)
            .await;
    }

    /// Serve `body` after `delay`
    pub async fn serve_delayed(&self, route: &str, body: Vec<u8>, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body).set_delay(delay))
            .mount(&self.server)
            .await;
    }

    /// Serve every asset object once
    pub async fn serve_objects(&self, objects: &[(&str, &[u8])]) {
        let mut seen = std::collections::HashSet::new();
        for (_, body) in objects {
            if seen.insert(sha1_hex(body)) {
                self.serve(&object_path(body), body.to_vec(), 1).await;
            }
        }
    }

    /// Manifest JSON pointing at this server
    pub fn manifest(&self, client: &[u8], libraries: Vec<Value>, index: &[u8]) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": "test",
            "downloads": {
                "client": {
                    "url": self.url("/client.jar"),
                    "sha1": sha1_hex(client),
                    "size": client.len()
                }
            },
            "libraries": libraries,
            "assetIndex": {
                "id": INDEX_ID,
                "url": self.url("/indexes/idx.json"),
                "sha1": sha1_hex(index)
            }
        }))
        .unwrap()
    }

    /// Library entry with an artifact served from `/libraries/{file}`
    pub fn library(&self, name: &str, rel_path: &str, body: &[u8]) -> Value {
        let file = rel_path.rsplit('/').next().unwrap_or(rel_path);
        json!({
            "name": name,
            "downloads": {
                "artifact": {
                    "url": self.url(&format!("/libraries/{}", file)),
                    "path": rel_path,
                    "sha1": sha1_hex(body)
                }
            }
        })
    }

    /// Serve a manifest and its asset index once each
    pub async fn serve_descriptors(&self, version: &str, manifest: Vec<u8>, index: Vec<u8>) {
        self.serve(&format!("/versions/{}.json", version), manifest, 1)
            .await;
        self.serve("/indexes/idx.json", index, 1).await;
    }

    pub fn config(&self, version: &str) -> CoordinatorConfig {
        CoordinatorConfig::default()
            .with_base_dir(self.dir.path())
            .with_manifest(self.url(&format!("/versions/{}.json", version)), version)
            .with_resources_base_url(self.url("/objects"))
            .with_client_config(
                ClientConfig::default()
                    .with_max_retries(0)
                    .with_request_timeout(Duration::from_secs(10)),
            )
            .with_progress(false)
    }

    pub fn coordinator(&self, version: &str, workers: usize) -> Coordinator {
        let config = self
            .config(version)
            .with_worker_count(workers)
            .with_graphics_quality(GraphicsQuality::High);
        Coordinator::with_host(config, linux_host()).unwrap()
    }
}
