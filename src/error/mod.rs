use reqwest::header::InvalidHeaderValue;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),

    #[error("Unable to retrieve the video URL. Ensure the video ID is correct and accessible.")]
    VideoUrlNotFound,

    #[error("Unable to retrieve the video title. Pass a file name with --output.")]
    TitleNotFound,

    #[error("unexpected status code: {0}")]
    UnexpectedStatus(StatusCode),
}

pub type Result<T> = std::result::Result<T, Error>;
