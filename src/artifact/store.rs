//! Remote object stores the importer can be fetched from

use crate::artifact::RemoteLocation;
use crate::aws::{self, AwsCli};
use crate::error::{StagerError, StagerResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Version-aware remote object store
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Current version identifier of the object
    async fn head(&self, location: &RemoteLocation) -> StagerResult<String>;

    /// Write the bytes of `version` of the object to `dest`
    ///
    /// `dest` already exists and is writable. A remote that moved past
    /// `version` fails instead of serving newer bytes.
    async fn get(
        &self,
        location: &RemoteLocation,
        version: &str,
        dest: &Path,
    ) -> StagerResult<()>;
}

/// How a version token pins a read of the object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VersionPin<'a> {
    /// S3 `VersionId`, selected directly
    VersionId(&'a str),
    /// Quoted `ETag` of an unversioned bucket, checked with If-Match
    ETag(&'a str),
}

impl<'a> VersionPin<'a> {
    fn of(version: &'a str) -> Self {
        if version.starts_with('"') || version.starts_with("W/\"") {
            VersionPin::ETag(version)
        } else {
            VersionPin::VersionId(version)
        }
    }
}

/// S3 access through `aws s3api`
pub struct S3CliObjectStore {
    aws: AwsCli,
}

impl S3CliObjectStore {
    pub fn new(aws: AwsCli) -> Self {
        Self { aws }
    }

    fn remote_error(location: &RemoteLocation, reason: String) -> StagerError {
        if aws::is_not_found(&reason) {
            location.not_found()
        } else {
            StagerError::ObjectStore {
                location: location.to_string(),
                reason,
            }
        }
    }
}

fn get_object_args<'a>(
    location: &'a RemoteLocation,
    pin: VersionPin<'a>,
    dest: &'a str,
) -> Vec<&'a str> {
    let mut args = vec![
        "s3api",
        "get-object",
        "--bucket",
        location.bucket.as_str(),
        "--key",
        location.key.as_str(),
    ];
    match pin {
        VersionPin::VersionId(id) => args.extend(["--version-id", id]),
        VersionPin::ETag(etag) => args.extend(["--if-match", etag]),
    }
    args.push(dest);
    args
}

#[derive(Debug, Deserialize)]
struct HeadObject {
    #[serde(rename = "VersionId")]
    version_id: Option<String>,
    #[serde(rename = "ETag")]
    etag: Option<String>,
}

impl HeadObject {
    /// Object version, falling back to the ETag on unversioned buckets
    fn version(self) -> Option<String> {
        self.version_id
            .filter(|v| !v.is_empty() && v != "null")
            .or(self.etag)
            .filter(|v| !v.is_empty())
    }
}

#[async_trait]
impl ObjectStore for S3CliObjectStore {
    async fn head(&self, location: &RemoteLocation) -> StagerResult<String> {
        let head: HeadObject = self
            .aws
            .exec_json(
                &[
                    "s3api",
                    "head-object",
                    "--bucket",
                    location.bucket.as_str(),
                    "--key",
                    location.key.as_str(),
                ],
                |reason| Self::remote_error(location, reason),
            )
            .await?;

        head.version().ok_or_else(|| StagerError::ObjectStore {
            location: location.to_string(),
            reason: "head-object returned neither VersionId nor ETag".to_string(),
        })
    }

    async fn get(
        &self,
        location: &RemoteLocation,
        version: &str,
        dest: &Path,
    ) -> StagerResult<()> {
        let dest_arg = dest.display().to_string();
        let args = get_object_args(location, VersionPin::of(version), &dest_arg);
        let output = self.aws.exec(&args).await?;

        if output.status.success() {
            debug!("Downloaded {} ({}) to {}", location, version, dest.display());
            return Ok(());
        }

        Err(aws::failure(&output, |reason| {
            Self::remote_error(location, reason)
        }))
    }
}

/// Anonymous HTTPS access to a public bucket
pub struct HttpObjectStore {
    base_url: Option<String>,
}

impl HttpObjectStore {
    /// `base_url` switches to path-style `<base>/<bucket>/<key>` addressing
    pub fn new(base_url: Option<String>) -> Self {
        Self { base_url }
    }

    fn object_url(&self, location: &RemoteLocation) -> String {
        match &self.base_url {
            Some(base) => format!(
                "{}/{}/{}",
                base.trim_end_matches('/'),
                location.bucket,
                location.key
            ),
            None => format!("https://{}.s3.amazonaws.com/{}", location.bucket, location.key),
        }
    }
}

fn http_error(location: &RemoteLocation, err: ureq::Error) -> StagerError {
    match err {
        ureq::Error::StatusCode(404) => location.not_found(),
        other => StagerError::ObjectStore {
            location: location.to_string(),
            reason: other.to_string(),
        },
    }
}

/// Version from response headers: `x-amz-version-id`, else `ETag`
fn version_from_headers(headers: &ureq::http::HeaderMap) -> Option<String> {
    ["x-amz-version-id", "etag"]
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .find(|value| !value.is_empty() && *value != "null")
        .map(str::to_string)
}

fn head_blocking(url: &str, location: &RemoteLocation) -> StagerResult<String> {
    let response = ureq::head(url)
        .call()
        .map_err(|e| http_error(location, e))?;

    version_from_headers(response.headers()).ok_or_else(|| StagerError::ObjectStore {
        location: location.to_string(),
        reason: "response carries neither x-amz-version-id nor ETag".to_string(),
    })
}

fn get_blocking(
    url: &str,
    location: &RemoteLocation,
    version: &str,
    dest: &Path,
) -> StagerResult<()> {
    let request = match VersionPin::of(version) {
        VersionPin::VersionId(id) => ureq::get(url).query("versionId", id),
        VersionPin::ETag(etag) => ureq::get(url).header("If-Match", etag),
    };
    let mut response = request.call().map_err(|e| http_error(location, e))?;

    let context = || format!("downloading {} to {}", location, dest.display());
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(dest)
        .map_err(|e| StagerError::io(context(), e))?;
    let mut reader = response.body_mut().as_reader();
    let bytes =
        std::io::copy(&mut reader, &mut file).map_err(|e| StagerError::io(context(), e))?;
    file.sync_all().map_err(|e| StagerError::io(context(), e))?;

    debug!("Downloaded {} bytes from {}", bytes, url);
    Ok(())
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn head(&self, location: &RemoteLocation) -> StagerResult<String> {
        let url = self.object_url(location);
        let location = location.clone();
        debug!("HEAD {}", url);

        tokio::task::spawn_blocking(move || head_blocking(&url, &location))
            .await
            .map_err(|e| StagerError::Internal(format!("head task failed: {e}")))?
    }

    async fn get(
        &self,
        location: &RemoteLocation,
        version: &str,
        dest: &Path,
    ) -> StagerResult<()> {
        let url = self.object_url(location);
        let location = location.clone();
        let version = version.to_string();
        let dest = dest.to_path_buf();
        debug!("GET {} at {}", url, version);

        tokio::task::spawn_blocking(move || get_blocking(&url, &location, &version, &dest))
            .await
            .map_err(|e| StagerError::Internal(format!("download task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ureq::http::{HeaderMap, HeaderValue};

    #[test]
    fn head_object_prefers_version_id() {
        let json = r#"{
            "AcceptRanges": "bytes",
            "ContentLength": 5242880,
            "ETag": "\"6805f2cfc46c0f04559748bb039d69ae\"",
            "VersionId": "3HL4kqtJlcpXroDTDmJ+rmSpXd3dIbrHY"
        }"#;
        let head: HeadObject = serde_json::from_str(json).unwrap();
        assert_eq!(
            head.version().as_deref(),
            Some("3HL4kqtJlcpXroDTDmJ+rmSpXd3dIbrHY")
        );
    }

    #[test]
    fn head_object_falls_back_to_etag() {
        let json = r#"{"ETag": "\"6805f2cf\"", "VersionId": "null"}"#;
        let head: HeadObject = serde_json::from_str(json).unwrap();
        assert_eq!(head.version().as_deref(), Some("\"6805f2cf\""));

        let head: HeadObject = serde_json::from_str("{}").unwrap();
        assert!(head.version().is_none());
    }

    #[test]
    fn remote_error_classifies_missing_objects() {
        let location = RemoteLocation::new("tools", "importer.jar");
        let err = S3CliObjectStore::remote_error(
            &location,
            "An error occurred (404) when calling the HeadObject operation: Not Found".to_string(),
        );
        assert!(matches!(err, StagerError::ObjectNotFound { .. }));

        let err = S3CliObjectStore::remote_error(
            &location,
            "An error occurred (403) when calling the HeadObject operation: Forbidden".to_string(),
        );
        assert!(matches!(err, StagerError::ObjectStore { .. }));
    }

    #[test]
    fn http_urls() {
        let location = RemoteLocation::new("tools", "importer/importer.jar");

        let store = HttpObjectStore::new(None);
        assert_eq!(
            store.object_url(&location),
            "https://tools.s3.amazonaws.com/importer/importer.jar"
        );

        let store = HttpObjectStore::new(Some("http://localhost:9000/".to_string()));
        assert_eq!(
            store.object_url(&location),
            "http://localhost:9000/tools/importer/importer.jar"
        );
    }

    #[test]
    fn http_version_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("etag", HeaderValue::from_static("\"abc123\""));
        assert_eq!(version_from_headers(&headers).as_deref(), Some("\"abc123\""));

        headers.insert("x-amz-version-id", HeaderValue::from_static("v42"));
        assert_eq!(version_from_headers(&headers).as_deref(), Some("v42"));

        assert!(version_from_headers(&HeaderMap::new()).is_none());
    }

    #[test]
    fn http_not_found_maps_to_object_not_found() {
        let location = RemoteLocation::new("tools", "importer.jar");
        assert!(matches!(
            http_error(&location, ureq::Error::StatusCode(404)),
            StagerError::ObjectNotFound { .. }
        ));
        assert!(matches!(
            http_error(&location, ureq::Error::StatusCode(500)),
            StagerError::ObjectStore { .. }
        ));
    }

    #[test]
    fn get_object_pins_version_id() {
        let location = RemoteLocation::new("tools", "importer.jar");
        let version = "3HL4kqtJlcpXroDTDmJ+rmSpXd3dIbrHY";
        let args = get_object_args(&location, VersionPin::of(version), "/tmp/x.part");
        assert_eq!(
            args,
            vec![
                "s3api",
                "get-object",
                "--bucket",
                "tools",
                "--key",
                "importer.jar",
                "--version-id",
                "3HL4kqtJlcpXroDTDmJ+rmSpXd3dIbrHY",
                "/tmp/x.part"
            ]
        );
    }

    #[test]
    fn get_object_pins_etag_on_unversioned_bucket() {
        let location = RemoteLocation::new("tools", "importer.jar");
        let args = get_object_args(&location, VersionPin::of("\"6805f2cf\""), "/tmp/x.part");
        assert_eq!(&args[6..], &["--if-match", "\"6805f2cf\"", "/tmp/x.part"]);
        assert_eq!(VersionPin::of("W/\"abc\""), VersionPin::ETag("W/\"abc\""));
    }
}
