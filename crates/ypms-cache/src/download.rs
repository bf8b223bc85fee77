//! Binary file downloads: bypass the metadata cache, stream to disk in
//! 64 KiB chunks, create the destination's parent directory (`spec.md` §4.2).

use std::path::Path;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use ypms_core::{Error, Result};

use crate::observer::{NoopObserver, Observer};

/// Bytes per write chunk, per `spec.md` §4.2.
const CHUNK_SIZE_HINT: usize = 64 * 1024;

/// Download `url` to `dest`, creating `dest`'s parent directory if needed.
pub async fn download_file(client: &reqwest::Client, url: &str, dest: &Path) -> Result<()> {
    download_file_with_observer(client, url, dest, &NoopObserver).await
}

/// Same as [`download_file`], reporting progress to `observer` as chunks
/// arrive.
pub async fn download_file_with_observer(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    observer: &dyn Observer,
) -> Result<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::network(format!("failed to GET {url}: {e}")))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(Error::network(format!("HTTP {status} for {url}")));
    }

    let total = resp.content_length();
    let mut file = tokio::fs::File::create(dest).await?;
    let mut downloaded: u64 = 0;
    let mut stream = resp.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| Error::network(format!("stream error downloading {url}: {e}")))?;
        for piece in chunk.chunks(CHUNK_SIZE_HINT) {
            file.write_all(piece).await?;
            downloaded += piece.len() as u64;
            observer.on_progress(downloaded, total);
        }
    }
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn downloads_to_destination() {
        let server = MockServer::start().await;
        let payload = vec![7u8; 200 * 1024];
        Mock::given(method("GET"))
            .and(path("/hw.bin"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested").join("hw.bin");
        let client = reqwest::Client::new();
        let url = format!("{}/hw.bin", server.uri());

        download_file(&client, &url, &dest).await.unwrap();

        let written = std::fs::read(&dest).unwrap();
        assert_eq!(written, payload);
    }

    #[tokio::test]
    async fn non_200_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.bin"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let client = reqwest::Client::new();
        let url = format!("{}/missing.bin", server.uri());

        let err = download_file(&client, &url, &dest).await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
        assert!(!dest.exists());
    }
}
