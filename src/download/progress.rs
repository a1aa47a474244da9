use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;

const PB_STYLE: &str = "{msg} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

const SPINNER_STYLE: &str = "{spinner:.blue} {msg} [{elapsed_precise}] {bytes} ({bytes_per_sec})";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    ProgressStyle::with_template(PB_STYLE)
        .ok()
        .map(|style| style.progress_chars(PB_CHARS))
});

static SPINNER_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| ProgressStyle::with_template(SPINNER_STYLE).ok());

/// Byte progress of a single download, starting at whatever is already on disk.
pub struct DownloadProgress {
    pb: ProgressBar,
}

impl DownloadProgress {
    /// `total` is the full size of the file including the resumed part, if known.
    pub fn new(name: &str, total: Option<u64>, initial: u64) -> Self {
        let (pb, style) = match total {
            Some(total) => (ProgressBar::new(total), PB_TEMPLATE.as_ref()),
            None => (ProgressBar::no_length(), SPINNER_TEMPLATE.as_ref()),
        };

        let pb = match style {
            Some(style) => pb.with_style(style.clone()),
            None => pb,
        };

        pb.set_position(initial);
        pb.set_message(name.to_string());

        Self { pb }
    }

    pub fn step(&self, len: u64) {
        self.pb.inc(len);
    }

    pub fn position(&self) -> u64 {
        self.pb.position()
    }

    pub fn finish(&self) {
        self.pb.finish();
    }

    pub fn abandon(&self) {
        self.pb.abandon();
    }
}
