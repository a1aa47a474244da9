use percent_encoding::percent_decode_str;

const TITLE_PREFIX: &str = "title=";
const PLAYBACK_MARKER: &str = "videoplayback";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackInfo {
    pub media_url: Option<String>,
    pub title: Option<String>,
}

fn decode(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

/// Scans an `&` separated video info body for the stream url and the title.
///
/// The first matching segment wins for each field. A `title=` segment is never
/// considered as a stream url while the title is still missing.
pub fn parse_playback_info(body: &str) -> PlaybackInfo {
    let mut info = PlaybackInfo::default();

    for segment in body.split('&') {
        if info.title.is_none() && segment.starts_with(TITLE_PREFIX) {
            info.title = Some(decode(&segment[TITLE_PREFIX.len()..]));
        } else if info.media_url.is_none() && segment.contains(PLAYBACK_MARKER) {
            let decoded = decode(segment);
            let url = match decoded.rsplit_once('|') {
                Some((_, url)) => url.to_string(),
                None => decoded,
            };
            info.media_url = Some(url);
        }

        if info.media_url.is_some() && info.title.is_some() {
            break;
        }
    }

    tracing::info!("Video URL: {:?}", info.media_url);
    tracing::info!("Video Title: {:?}", info.title);

    info
}
