use url::Url;

use crate::{ApiError, FailureKind};

/// Builds every URL the client talks to.
///
/// Filenames and image references are always inserted as one
/// percent-encoded path segment, so server-supplied names cannot alter the
/// request path. Names a URL would collapse (empty, `.`, `..`) are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    server: Url,
    api_prefix: Vec<String>,
}

impl Endpoints {
    pub fn new(server_url: &str, api_prefix: &str) -> Result<Self, ApiError> {
        let server = Url::parse(server_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidInput, err.to_string()))?;
        if server.cannot_be_a_base() || !matches!(server.scheme(), "http" | "https") {
            return Err(ApiError::new(
                FailureKind::InvalidInput,
                format!("not an http(s) base url: {server_url}"),
            ));
        }
        let api_prefix = api_prefix
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        Ok(Self { server, api_prefix })
    }

    pub fn upload(&self) -> Url {
        self.api(&["upload"])
    }

    pub fn status(&self, filename: &str) -> Result<Url, ApiError> {
        Ok(self.api(&["status", segment(filename)?]))
    }

    pub fn history(&self) -> Url {
        self.api(&["history"])
    }

    pub fn history_item(&self, name: &str) -> Result<Url, ApiError> {
        Ok(self.api(&["history", segment(name)?]))
    }

    pub fn download(&self, filename: &str) -> Result<Url, ApiError> {
        Ok(self.api(&["download", segment(filename)?]))
    }

    /// Annotated result video, served outside the API prefix.
    pub fn result_asset(&self, filename: &str) -> Result<Url, ApiError> {
        Ok(self.join(&[], &["results", segment(filename)?]))
    }

    /// Cropped violator image, served outside the API prefix.
    pub fn crop_asset(&self, image_ref: &str) -> Result<Url, ApiError> {
        Ok(self.join(&[], &["crops", segment(image_ref)?]))
    }

    fn api(&self, segments: &[&str]) -> Url {
        self.join(&self.api_prefix, segments)
    }

    fn join(&self, prefix: &[String], segments: &[&str]) -> Url {
        let mut url = self.server.clone();
        url.set_query(None);
        url.set_fragment(None);
        // Checked in `new`: the server url can always be a base.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(prefix);
            path.extend(segments);
        }
        url
    }
}

/// URL parsing drops dot segments and an empty one changes the resource,
/// so such names have no single-segment form.
fn segment(name: &str) -> Result<&str, ApiError> {
    match name {
        "" | "." | ".." => Err(ApiError::new(
            FailureKind::InvalidInput,
            format!("{name:?} cannot be used as a path segment"),
        )),
        _ => Ok(name),
    }
}
