pub mod range;

use std::io;
use std::path::Path;

use bytes::Bytes;
use futures_util::{Stream, TryStreamExt};
use reqwest::{Response, StatusCode};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::io::StreamReader;
use url::Url;

use crate::download::info::SessionContext;
use crate::download::progress::DownloadProgress;
use crate::download::DownloadClient;
use crate::error::{Error, Result};
use crate::options::Options;

use range::ResumePoint;

fn body_reader(response: Response) -> StreamReader<impl Stream<Item = io::Result<Bytes>>, Bytes> {
    StreamReader::new(response.bytes_stream().map_err(io::Error::other))
}

async fn copy_chunks<R, W>(reader: &mut R, writer: &mut W, chunk_size: usize, progress: &DownloadProgress) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = vec![0; chunk_size.max(1)];
    let mut written = 0;

    loop {
        let read = reader.read(&mut buffer).await?;
        if read == 0 {
            break;
        }

        writer.write_all(&buffer[..read]).await?;
        written += read as u64;
        progress.step(read as u64);
    }

    writer.flush().await?;

    Ok(written)
}

/// Logs a warning when the server announced a length that did not arrive.
fn length_matches(expected: Option<u64>, written: u64) -> bool {
    match expected {
        Some(expected) if expected != written => {
            tracing::warn!("expected {} bytes but received {}", expected, written);
            false
        }
        _ => true,
    }
}

/// Streams `url` into `output`, continuing after whatever bytes are already there.
///
/// Returns the size of the file once the stream has ended.
pub async fn download_video(
    client: &DownloadClient,
    url: &Url,
    cookies: &SessionContext,
    output: &Path,
    options: &Options,
) -> Result<u64> {
    let resume = ResumePoint::probe(output).await?;

    tracing::info!("Starting download from {}", url);
    if resume.is_resuming() {
        tracing::info!("Resuming download from byte {}", resume.offset());
    }

    let response = client.get(url, cookies, resume.headers()?).await?;

    let status = response.status();
    if status != StatusCode::OK && status != StatusCode::PARTIAL_CONTENT {
        return Err(Error::UnexpectedStatus(status));
    }

    if resume.is_resuming() && status == StatusCode::OK {
        tracing::warn!("server ignored the range request, appending the full body");
    }

    let remaining = response.content_length();
    let total = remaining.map(|len| len + resume.offset());

    let mut file = resume.open(output).await?;
    let progress = DownloadProgress::new(&output.to_string_lossy(), total, resume.offset());
    let reader = body_reader(response);
    tokio::pin!(reader);

    let written = match copy_chunks(&mut reader, &mut file, options.chunk_size, &progress).await {
        Ok(written) => written,
        Err(err) => {
            progress.abandon();
            return Err(err);
        }
    };

    progress.finish();

    length_matches(remaining, written);

    Ok(progress.position())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    /// Serves `data` and remembers the largest buffer it was asked to fill.
    struct RecordingReader {
        data: Vec<u8>,
        pos: usize,
        largest_request: usize,
    }

    impl AsyncRead for RecordingReader {
        fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
            let this = &mut *self;
            this.largest_request = this.largest_request.max(buf.remaining());

            let end = (this.pos + buf.remaining()).min(this.data.len());
            buf.put_slice(&this.data[this.pos..end]);
            this.pos = end;

            Poll::Ready(Ok(()))
        }
    }

    fn options(chunk_size: usize) -> Options {
        Options {
            chunk_size,
            ..Options::default()
        }
    }

    fn media_url(server: &mockito::ServerGuard) -> Url {
        Url::parse(&format!("{}/videoplayback", server.url())).unwrap()
    }

    #[tokio::test]
    async fn test_fresh_download_writes_whole_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/videoplayback")
            .match_header("range", Matcher::Missing)
            .with_status(200)
            .with_body("hello world")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        let client = DownloadClient::new().unwrap();

        let size = download_video(&client, &media_url(&server), &SessionContext::default(), &path, &options(4))
            .await
            .unwrap();

        assert_eq!(size, 11);
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"hello world");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_resume_appends_remaining_bytes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/videoplayback")
            .match_header("range", "bytes=6-")
            .match_header("cookie", "DRIVE_STREAM=xyz")
            .with_status(206)
            .with_body("world")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        tokio::fs::write(&path, b"hello ").await.unwrap();

        let cookies = SessionContext::from_pairs([("DRIVE_STREAM", "xyz")]);
        let client = DownloadClient::new().unwrap();

        let size = download_video(&client, &media_url(&server), &cookies, &path, &options(2))
            .await
            .unwrap();

        assert_eq!(size, 11);
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"hello world");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_bad_status_leaves_file_untouched() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/videoplayback")
            .with_status(403)
            .with_body("forbidden")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        tokio::fs::write(&path, b"partial").await.unwrap();
        let client = DownloadClient::new().unwrap();

        let result = download_video(&client, &media_url(&server), &SessionContext::default(), &path, &options(1024)).await;

        match result {
            Err(Error::UnexpectedStatus(status)) => assert_eq!(status, StatusCode::FORBIDDEN),
            other => panic!("expected a status error, got {:?}", other),
        }
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"partial");
    }

    #[tokio::test]
    async fn test_bad_status_creates_no_file() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/videoplayback")
            .with_status(500)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        let client = DownloadClient::new().unwrap();

        let result = download_video(&client, &media_url(&server), &SessionContext::default(), &path, &options(1024)).await;

        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_copy_chunks_counts_bytes() {
        let mut reader: &[u8] = b"abcdefghij";
        let mut writer = Vec::new();
        let progress = DownloadProgress::new("buffer", Some(10), 0);

        let written = copy_chunks(&mut reader, &mut writer, 3, &progress).await.unwrap();

        assert_eq!(written, 10);
        assert_eq!(writer, b"abcdefghij");
        assert_eq!(progress.position(), 10);
    }

    #[tokio::test]
    async fn test_reads_never_exceed_chunk_size() {
        let mut reader = RecordingReader {
            data: b"0123456789abcdef".to_vec(),
            pos: 0,
            largest_request: 0,
        };
        let mut writer = Vec::new();
        let progress = DownloadProgress::new("buffer", Some(16), 0);

        let written = copy_chunks(&mut reader, &mut writer, 5, &progress).await.unwrap();

        assert_eq!(written, 16);
        assert_eq!(writer, b"0123456789abcdef");
        assert_eq!(reader.largest_request, 5);
    }

    #[tokio::test]
    async fn test_full_reply_to_range_request_is_appended() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/videoplayback")
            .match_header("range", "bytes=6-")
            .with_status(200)
            .with_body("full body")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        tokio::fs::write(&path, b"hello ").await.unwrap();
        let client = DownloadClient::new().unwrap();

        let size = download_video(&client, &media_url(&server), &SessionContext::default(), &path, &options(4))
            .await
            .unwrap();

        assert_eq!(size, 15);
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"hello full body");
        mock.assert_async().await;
    }

    #[test]
    fn test_length_mismatch_is_only_reported() {
        assert!(length_matches(Some(10), 10));
        assert!(length_matches(None, 3));
        assert!(!length_matches(Some(10), 4));
    }
}
