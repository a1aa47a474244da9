use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static ID_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{20,}$").ok());

/// What a user-supplied video reference turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    /// The input already was a bare file id.
    Id(String),
    /// The id was pulled out of a share link.
    Link(String),
    /// Nothing matched, the raw input is passed through as is.
    Unrecognized(String),
}

impl Identifier {
    pub fn as_str(&self) -> &str {
        match self {
            Identifier::Id(id) | Identifier::Link(id) | Identifier::Unrecognized(id) => id,
        }
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn id_from_link(url: &Url) -> Option<String> {
    let segments = url.path_segments()?.collect::<Vec<&str>>();

    let from_path = segments
        .windows(2)
        .find(|pair| pair[0] == "d" && !pair[1].is_empty())
        .map(|pair| pair[1].to_string());

    from_path.or_else(|| {
        url.query_pairs()
            .find(|(key, value)| key == "id" && !value.is_empty())
            .map(|(_, value)| value.into_owned())
    })
}

fn parse_link(input: &str) -> Option<Url> {
    Url::parse(input)
        .or_else(|_| Url::parse(&format!("https://{}", input)))
        .ok()
}

pub fn extract(input: &str) -> Identifier {
    if ID_PATTERN.as_ref().is_some_and(|re| re.is_match(input)) {
        return Identifier::Id(input.to_string());
    }

    match parse_link(input).as_ref().and_then(id_from_link) {
        Some(id) => Identifier::Link(id),
        None => {
            tracing::warn!("could not find a file id in {:?}, using it as is", input);
            Identifier::Unrecognized(input.to_string())
        }
    }
}
