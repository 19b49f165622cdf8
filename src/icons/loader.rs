use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use super::resolver::{IconKind, IconRef};

/// Errors that make a resolved icon unusable. The card falls back to its
/// monogram.
#[derive(Debug, Error)]
pub enum IconLoadError {
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Icon file not found: {}", .0.display())]
    Missing(PathBuf),
}

/// Check that an icon reference can actually be displayed.
///
/// Data URIs always load. Remote references are fetched with GET and must
/// answer 2xx within `timeout`. Local references resolve against
/// `assets_dir` and must name an existing file.
pub async fn load_icon(
    client: &reqwest::Client,
    icon: &IconRef,
    assets_dir: &Path,
    timeout: Duration,
) -> Result<(), IconLoadError> {
    match icon.kind() {
        IconKind::DataUri => Ok(()),
        IconKind::Remote => {
            let response = client.get(icon.as_str()).timeout(timeout).send().await?;
            let status = response.status();
            if status.is_success() {
                Ok(())
            } else {
                Err(IconLoadError::HttpStatus(status.as_u16()))
            }
        }
        IconKind::Local => {
            let path = assets_dir.join(icon.as_str());
            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => Ok(()),
                _ => Err(IconLoadError::Missing(path)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn test_data_uri_always_loads() {
        let client = reqwest::Client::new();
        let result = load_icon(&client, &IconRef::placeholder(), Path::new("/nonexistent"), TIMEOUT).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_remote_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/favicon.ico"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 16]))
            .expect(1)
            .mount(&server)
            .await;

        let icon = IconRef::new(format!("{}/favicon.ico", server.uri()));
        let result = load_icon(&reqwest::Client::new(), &icon, Path::new("/"), TIMEOUT).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_remote_404_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let icon = IconRef::new(format!("{}/missing.png", server.uri()));
        match load_icon(&reqwest::Client::new(), &icon, Path::new("/"), TIMEOUT).await {
            Err(IconLoadError::HttpStatus(404)) => {}
            other => panic!("Expected HttpStatus(404), got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_remote_unreachable_fails() {
        let icon = IconRef::new("http://127.0.0.1:1/favicon.ico");
        let result = load_icon(&reqwest::Client::new(), &icon, Path::new("/"), TIMEOUT).await;
        assert!(matches!(result, Err(IconLoadError::Network(_))));
    }

    #[tokio::test]
    async fn test_local_file_checked_against_assets_dir() {
        let dir = std::env::temp_dir().join("sitenav_icon_loader_test");
        std::fs::create_dir_all(dir.join("assets/icons")).unwrap();
        std::fs::write(dir.join("assets/icons/qq.png"), b"png").unwrap();
        let client = reqwest::Client::new();

        let present = IconRef::new("assets/icons/qq.png");
        assert!(load_icon(&client, &present, &dir, TIMEOUT).await.is_ok());

        let missing = IconRef::new("assets/icons/douyin.png");
        let err = load_icon(&client, &missing, &dir, TIMEOUT).await.unwrap_err();
        assert!(err.to_string().contains("douyin.png"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
