pub const DEFAULT_INFO_ENDPOINT: &str = "https://drive.google.com/u/0/get_video_info";
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

#[derive(Debug, Clone)]
pub struct Options {
    pub info_endpoint: String,
    pub output: Option<String>,
    pub chunk_size: usize,
    pub verbose: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            info_endpoint: DEFAULT_INFO_ENDPOINT.to_string(),
            output: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            verbose: false,
        }
    }
}
