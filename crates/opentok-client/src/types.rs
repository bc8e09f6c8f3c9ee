//! Archive request types.
//!
//! Responses are returned to the caller as raw bodies; only request-side
//! values are modelled here.

use serde::Serialize;
use url::Url;

// ─────────────────────────────────────────────────────────────────────────────
// Archive properties
// ─────────────────────────────────────────────────────────────────────────────

/// How streams of an archive are recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// All streams composed into a single file.
    #[default]
    Composed,
    /// One file per stream.
    Individual,
}

/// Layout of a composed archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutType {
    BestFit,
    Custom,
    HorizontalPresentation,
    Pip,
    VerticalPresentation,
}

/// Layout settings for a composed archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveLayout {
    /// Layout type.
    #[serde(rename = "type")]
    pub layout_type: LayoutType,
    /// Custom stylesheet, used with [`LayoutType::Custom`].
    pub stylesheet: Option<String>,
}

impl ArchiveLayout {
    /// Create a layout of the given type without a stylesheet.
    pub fn new(layout_type: LayoutType) -> Self {
        Self {
            layout_type,
            stylesheet: None,
        }
    }

    /// Create a custom layout with a stylesheet.
    pub fn custom(stylesheet: impl Into<String>) -> Self {
        Self {
            layout_type: LayoutType::Custom,
            stylesheet: Some(stylesheet.into()),
        }
    }
}

/// Properties of an archive to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveProperties {
    /// Record video.
    pub has_video: bool,
    /// Record audio.
    pub has_audio: bool,
    /// Output mode.
    pub output_mode: OutputMode,
    /// Layout for composed archives.
    pub layout: Option<ArchiveLayout>,
    /// Archive name.
    pub name: Option<String>,
}

impl Default for ArchiveProperties {
    fn default() -> Self {
        Self {
            has_video: true,
            has_audio: true,
            output_mode: OutputMode::default(),
            layout: None,
            name: None,
        }
    }
}

impl ArchiveProperties {
    /// Set whether video is recorded.
    pub fn has_video(mut self, has_video: bool) -> Self {
        self.has_video = has_video;
        self
    }

    /// Set whether audio is recorded.
    pub fn has_audio(mut self, has_audio: bool) -> Self {
        self.has_audio = has_audio;
        self
    }

    /// Set the output mode.
    pub fn output_mode(mut self, output_mode: OutputMode) -> Self {
        self.output_mode = output_mode;
        self
    }

    /// Set the layout.
    pub fn layout(mut self, layout: ArchiveLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Set the archive name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// JSON body of a start-archive request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StartArchiveRequest<'a> {
    pub session_id: &'a str,
    pub has_video: bool,
    pub has_audio: bool,
    pub output_mode: OutputMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<&'a ArchiveLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
}

impl<'a> StartArchiveRequest<'a> {
    pub(crate) fn new(session_id: &'a str, properties: &'a ArchiveProperties) -> Self {
        Self {
            session_id,
            has_video: properties.has_video,
            has_audio: properties.has_audio,
            output_mode: properties.output_mode,
            layout: properties.layout.as_ref(),
            name: properties.name.as_deref(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Archive listing
// ─────────────────────────────────────────────────────────────────────────────

/// Default page offset for archive listings.
pub const DEFAULT_LIST_OFFSET: u32 = 0;

/// Default page size for archive listings.
pub const DEFAULT_LIST_COUNT: u32 = 1000;

/// Which archives to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveListQuery {
    /// A page of all archives in the project.
    Paged {
        /// Number of archives to skip.
        offset: u32,
        /// Maximum number of archives to return.
        count: u32,
    },
    /// Archives of a single session.
    BySession(String),
}

impl Default for ArchiveListQuery {
    fn default() -> Self {
        ArchiveListQuery::Paged {
            offset: DEFAULT_LIST_OFFSET,
            count: DEFAULT_LIST_COUNT,
        }
    }
}

impl ArchiveListQuery {
    /// Set the listing query on a request URL.
    ///
    /// Paging parameters are only sent when they differ from the defaults,
    /// in the `offset=N&count=M` shape the service expects. Session ids are
    /// form-encoded.
    pub(crate) fn apply(&self, url: &mut Url) {
        match self {
            ArchiveListQuery::Paged { offset, count } => {
                if *offset == DEFAULT_LIST_OFFSET && *count == DEFAULT_LIST_COUNT {
                    return;
                }
                let mut query = String::new();
                if *offset != DEFAULT_LIST_OFFSET {
                    query.push_str(&format!("offset={}&", offset));
                }
                if *count != DEFAULT_LIST_COUNT {
                    query.push_str(&format!("count={}", count));
                }
                url.set_query(Some(&query));
            }
            ArchiveListQuery::BySession(session_id) => {
                url.query_pairs_mut().append_pair("sessionId", session_id);
            }
        }
    }

    /// Session the listing is scoped to, if any.
    pub(crate) fn session_id(&self) -> Option<&str> {
        match self {
            ArchiveListQuery::BySession(id) => Some(id.as_str()),
            ArchiveListQuery::Paged { .. } => None,
        }
    }
}
