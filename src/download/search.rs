use std::path::{Path, PathBuf};

use url::Url;

use crate::download::info::{fetch_video_info, SessionContext};
use crate::download::playback::parse_playback_info;
use crate::download::{video, DownloadClient};
use crate::error::{Error, Result};
use crate::file;
use crate::identifier;
use crate::options::Options;

async fn media_extension(client: &DownloadClient, url: &Url, cookies: &SessionContext) -> String {
    if let Some(extension) = file::extension_from_url(url) {
        return extension;
    }

    match client.content_type(url, cookies).await {
        Ok(Some(content_type)) => {
            tracing::debug!("media content type: {}", content_type);
            if let Some(extension) = file::extension_from_content_type(&content_type) {
                return extension;
            }
        }
        Ok(None) => {}
        Err(err) => tracing::warn!("could not look up the media content type: {}", err),
    }

    file::DEFAULT_EXTENSION.to_string()
}

/// Resolves `input` to a video and downloads it into `dir`.
pub async fn download_into(input: &str, dir: &Path, options: &Options) -> Result<PathBuf> {
    let id = identifier::extract(input);
    tracing::info!("Video ID: {}", id);

    let client = match DownloadClient::new() {
        Ok(client) => client,
        Err(err) => {
            eprintln!("Error creating HTTP client: {}", err);
            return Err(err);
        }
    };

    let info = match fetch_video_info(&client, &options.info_endpoint, &id).await {
        Ok(info) => info,
        Err(err) => {
            eprintln!("Error fetching video info: {}", err);
            return Err(err);
        }
    };

    tracing::info!("Parsing video playback URL and title");
    let playback = parse_playback_info(&info.body);

    let media_url = match playback.media_url.as_deref().map(Url::parse) {
        Some(Ok(media_url)) => media_url,
        Some(Err(err)) => {
            eprintln!("Error parsing video URL: {}", err);
            return Err(err.into());
        }
        None => {
            eprintln!("{}", Error::VideoUrlNotFound);
            return Err(Error::VideoUrlNotFound);
        }
    };

    let candidate = match options.output.clone().or(playback.title) {
        Some(candidate) => candidate,
        None => {
            eprintln!("{}", Error::TitleNotFound);
            return Err(Error::TitleNotFound);
        }
    };

    let filename = match file::resolve_filename(&candidate) {
        Ok(filename) => filename,
        Err(err) => {
            eprintln!("{}", err);
            return Err(err);
        }
    };

    let filename = if file::has_extension(&filename) {
        filename
    } else {
        let extension = media_extension(&client, &media_url, &info.cookies).await;
        file::with_extension(filename, &extension)
    };

    let output = dir.join(&filename);

    match video::download_video(&client, &media_url, &info.cookies, &output, options).await {
        Ok(size) => {
            tracing::info!("{} is {} bytes", output.display(), size);
            println!("\n{} downloaded successfully.", filename);
        }
        Err(Error::UnexpectedStatus(status)) => {
            eprintln!("Error downloading {}, status code: {}", filename, status.as_u16());
            return Err(Error::UnexpectedStatus(status));
        }
        Err(err) => {
            eprintln!("Error downloading {}: {}", filename, err);
            return Err(err);
        }
    }

    Ok(output)
}

/// Downloads into the current working directory.
pub async fn download(input: &str, options: &Options) -> Result<PathBuf> {
    download_into(input, Path::new(""), options).await
}
