use rdf_convert::format::FormatRegistry;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use std::fmt;
use std::fs;
use std::io::{self, stdin, Read};
use std::path::{self, Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// Errors raised while reading the input document.
#[derive(Debug, thiserror::Error)]
pub enum SourceUnreadable {
    #[error("Could not read from stdin")]
    Stdin(#[source] io::Error),
    #[error("Could not fetch '{url}'")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Fetching '{url}' failed with status {status}")]
    Status { url: String, status: StatusCode },
    #[error("Could not read the file '{}'", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where the input has been read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Stdin,
    Url(String),
    File(PathBuf),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("stdin"),
            Self::Url(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A fully read input document.
#[derive(Debug)]
pub struct Source {
    pub origin: Origin,
    pub data: Vec<u8>,
    /// The parseable format announced by the server, if any.
    pub media_type: Option<String>,
}

impl Source {
    /// The name the input format may be guessed from.
    pub fn name(&self) -> Option<&str> {
        match &self.origin {
            Origin::Stdin => None,
            Origin::Url(url) => Some(url),
            Origin::File(path) => path.to_str(),
        }
    }

    /// The IRI relative IRIs of the document are resolved against by default.
    pub fn base_iri(&self) -> Option<String> {
        match &self.origin {
            Origin::Stdin => None,
            Origin::Url(url) => Some(url.clone()),
            Origin::File(path) => path::absolute(path)
                .ok()
                .and_then(|path| Url::from_file_path(path).ok())
                .map(String::from),
        }
    }
}

/// Reads stdin if `input` is missing, fetches http(s) URLs and reads files otherwise.
pub fn read_source(
    input: Option<&str>,
    registry: &FormatRegistry,
) -> Result<Source, SourceUnreadable> {
    let Some(input) = input else {
        info!("Reading from STDIN...");
        let mut data = Vec::new();
        stdin()
            .lock()
            .read_to_end(&mut data)
            .map_err(SourceUnreadable::Stdin)?;
        return Ok(Source {
            origin: Origin::Stdin,
            data,
            media_type: None,
        });
    };

    if is_http_url(input) {
        info!("Reading from URL...");
        return fetch(input, registry);
    }

    info!("Reading from file: \"{input}\" ...");
    let path = Path::new(input);
    let data = fs::read(path).map_err(|source| SourceUnreadable::File {
        path: path.to_owned(),
        source,
    })?;
    info!("{} kB.", (data.len() + 512) / 1024);
    Ok(Source {
        origin: Origin::File(path.to_owned()),
        data,
        media_type: None,
    })
}

fn is_http_url(input: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        input
            .get(..scheme.len())
            .is_some_and(|start| start.eq_ignore_ascii_case(scheme))
    })
}

fn fetch(url: &str, registry: &FormatRegistry) -> Result<Source, SourceUnreadable> {
    let accept = registry
        .list_parseable()
        .flat_map(|format| format.media_types())
        .collect::<Vec<_>>()
        .join(", ");
    let response = reqwest::blocking::Client::new()
        .get(url)
        .header("Accept", accept)
        .send()
        .map_err(|source| SourceUnreadable::Fetch {
            url: url.to_owned(),
            source,
        })?;
    if !response.status().is_success() {
        return Err(SourceUnreadable::Status {
            url: url.to_owned(),
            status: response.status(),
        });
    }

    let media_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| announced_format(value, registry));
    debug!("Server announced the format {media_type:?}");
    let data = response
        .bytes()
        .map_err(|source| SourceUnreadable::Fetch {
            url: url.to_owned(),
            source,
        })?
        .to_vec();
    Ok(Source {
        origin: Origin::Url(url.to_owned()),
        data,
        media_type,
    })
}

/// The `Content-Type` of a response, if it names a parseable format.
///
/// `text/plain` is served for anything, it is never trusted.
fn announced_format(content_type: &str, registry: &FormatRegistry) -> Option<String> {
    let media_type = content_type.split(';').next().unwrap_or(content_type).trim();
    if media_type.eq_ignore_ascii_case("text/plain") {
        return None;
    }
    registry
        .lookup_media_type(media_type)
        .filter(|format| format.has_parser())
        .map(|_| media_type.to_owned())
}
