//! REST operations: URL shapes, bodies and status classification.
//!
//! Each call builds an [`Operation`] describing what to send. After the
//! response arrives, [`classify`] maps a failed status onto the error
//! taxonomy using the per-operation [`OperationKind::status_table`].

use std::fmt;

use reqwest::{Method, StatusCode};
use url::Url;

use crate::error::{Error, Result};
use crate::params::{FormEncoding, SessionParams, build_body, to_param_sequence};
use crate::types::{ArchiveListQuery, ArchiveProperties, StartArchiveRequest};

/// The REST actions this client performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    CreateSession,
    GetArchive,
    ListArchives,
    StartArchive,
    StopArchive,
    DeleteArchive,
}

impl OperationKind {
    /// HTTP method used by this operation.
    pub fn method(self) -> Method {
        match self {
            OperationKind::CreateSession
            | OperationKind::StartArchive
            | OperationKind::StopArchive => Method::POST,
            OperationKind::GetArchive | OperationKind::ListArchives => Method::GET,
            OperationKind::DeleteArchive => Method::DELETE,
        }
    }

    /// Whether the request asks for a JSON response.
    pub(crate) fn accepts_json(self) -> bool {
        matches!(
            self,
            OperationKind::CreateSession | OperationKind::StartArchive
        )
    }

    /// Known failure statuses for this operation.
    ///
    /// An empty table means failed statuses are not classified at all:
    /// session creation forwards whatever payload the server returns.
    pub fn status_table(self) -> &'static [(u16, Condition)] {
        use Condition::*;
        match self {
            OperationKind::CreateSession => &[],
            OperationKind::GetArchive => &[
                (400, InvalidArchiveId),
                (403, Unauthorized),
                (500, ServerError),
            ],
            OperationKind::ListArchives => &[(403, Unauthorized), (500, ServerError)],
            OperationKind::StartArchive => &[
                (403, Unauthorized),
                (404, UnknownSession),
                (409, SessionNotArchivable),
                (500, ServerError),
            ],
            OperationKind::StopArchive => &[
                (400, MalformedRequest),
                (403, Unauthorized),
                (404, UnknownArchive),
                (409, ArchiveNotRecording),
                (500, ServerError),
            ],
            OperationKind::DeleteArchive => &[
                (403, Unauthorized),
                (409, ArchiveNotDeletable),
                (500, ServerError),
            ],
        }
    }

    /// Look up the condition for a status code.
    pub fn condition_for(self, status: u16) -> Option<Condition> {
        self.status_table()
            .iter()
            .find(|(code, _)| *code == status)
            .map(|(_, condition)| *condition)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            OperationKind::CreateSession => "create an OpenTok Session",
            OperationKind::GetArchive => "get an OpenTok Archive",
            OperationKind::ListArchives => "get OpenTok Archives",
            OperationKind::StartArchive => "start an OpenTok Archive",
            OperationKind::StopArchive => "stop an OpenTok Archive",
            OperationKind::DeleteArchive => "delete an OpenTok Archive",
        };
        f.write_str(action)
    }
}

/// A failure condition reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// The archive id is malformed.
    InvalidArchiveId,
    /// The credentials were rejected.
    Unauthorized,
    /// The server failed internally.
    ServerError,
    /// The session does not exist.
    UnknownSession,
    /// The session is peer-to-peer or already recording.
    SessionNotArchivable,
    /// The request was malformed.
    MalformedRequest,
    /// The archive does not exist.
    UnknownArchive,
    /// The archive is not being recorded.
    ArchiveNotRecording,
    /// The archive is not in a deletable state.
    ArchiveNotDeletable,
}

impl Condition {
    /// Human-readable description, without identifiers.
    pub fn description(self) -> &'static str {
        match self {
            Condition::InvalidArchiveId => "The archiveId was invalid.",
            Condition::Unauthorized => "The request was not authorized.",
            Condition::ServerError => "A server error occurred.",
            Condition::UnknownSession => "The sessionId does not exist.",
            Condition::SessionNotArchivable => {
                "The session is either peer-to-peer or already recording."
            }
            Condition::MalformedRequest => "The request was malformed.",
            Condition::UnknownArchive => "The archiveId does not exist.",
            Condition::ArchiveNotRecording => "The archive is not being recorded.",
            Condition::ArchiveNotDeletable => {
                "The status was not \"uploaded\", \"available\", or \"deleted\"."
            }
        }
    }

    fn names_archive(self) -> bool {
        matches!(
            self,
            Condition::InvalidArchiveId
                | Condition::UnknownArchive
                | Condition::ArchiveNotRecording
                | Condition::ArchiveNotDeletable
        )
    }

    fn names_session(self) -> bool {
        matches!(
            self,
            Condition::UnknownSession | Condition::SessionNotArchivable
        )
    }
}

/// Identifiers an operation refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Target {
    pub archive_id: Option<String>,
    pub session_id: Option<String>,
}

/// Body of an outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RequestBody {
    Empty,
    Form {
        body: String,
        content_type: Option<&'static str>,
    },
    Json(String),
}

/// A single request to dispatch.
#[derive(Debug, Clone)]
pub(crate) struct Operation {
    pub kind: OperationKind,
    /// Path segments appended to the API URL.
    pub segments: Vec<String>,
    /// Listing query, for archive listings.
    pub query: Option<ArchiveListQuery>,
    pub body: RequestBody,
    pub target: Target,
}

impl Operation {
    pub(crate) fn create_session(params: Option<&SessionParams>, encoding: FormEncoding) -> Self {
        let body = match build_body(&to_param_sequence(params), encoding) {
            Some(body) => RequestBody::Form {
                body,
                content_type: encoding.content_type(),
            },
            None => RequestBody::Empty,
        };

        Self {
            kind: OperationKind::CreateSession,
            segments: vec!["session".to_string(), "create".to_string()],
            query: None,
            body,
            target: Target::default(),
        }
    }

    pub(crate) fn get_archive(api_key: u32, archive_id: &str) -> Self {
        Self::for_archive(OperationKind::GetArchive, api_key, archive_id, None)
    }

    pub(crate) fn list_archives(api_key: u32, query: &ArchiveListQuery) -> Self {
        Self {
            kind: OperationKind::ListArchives,
            segments: archive_collection(api_key),
            query: Some(query.clone()),
            body: RequestBody::Empty,
            target: Target {
                archive_id: None,
                session_id: query.session_id().map(str::to_string),
            },
        }
    }

    pub(crate) fn start_archive(
        api_key: u32,
        session_id: &str,
        properties: &ArchiveProperties,
    ) -> Result<Self> {
        let operation = OperationKind::StartArchive;
        let body = serde_json::to_string(&StartArchiveRequest::new(session_id, properties))
            .map_err(|source| Error::Encoding { operation, source })?;

        Ok(Self {
            kind: operation,
            segments: archive_collection(api_key),
            query: None,
            body: RequestBody::Json(body),
            target: Target {
                archive_id: None,
                session_id: Some(session_id.to_string()),
            },
        })
    }

    pub(crate) fn stop_archive(api_key: u32, archive_id: &str) -> Self {
        Self::for_archive(OperationKind::StopArchive, api_key, archive_id, Some("stop"))
    }

    pub(crate) fn delete_archive(api_key: u32, archive_id: &str) -> Self {
        Self::for_archive(OperationKind::DeleteArchive, api_key, archive_id, None)
    }

    fn for_archive(
        kind: OperationKind,
        api_key: u32,
        archive_id: &str,
        action: Option<&str>,
    ) -> Self {
        let mut segments = archive_collection(api_key);
        segments.push(archive_id.to_string());
        segments.extend(action.map(str::to_string));

        Self {
            kind,
            segments,
            query: None,
            body: RequestBody::Empty,
            target: Target {
                archive_id: Some(archive_id.to_string()),
                session_id: None,
            },
        }
    }

    /// Resolve the request URL against the API base URL.
    ///
    /// Each segment is percent-encoded as a whole, so identifiers cannot
    /// add path segments, a query or a fragment. Empty and dot-only
    /// identifiers are rejected.
    pub(crate) fn url(&self, base: &Url) -> Result<Url> {
        if let Some(id) = self
            .segments
            .iter()
            .find(|s| matches!(s.as_str(), "" | "." | ".."))
        {
            return Err(Error::InvalidIdentifier {
                operation: self.kind,
                id: id.clone(),
            });
        }

        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("API URL cannot be a base: {}", base)))?
            .pop_if_empty()
            .extend(&self.segments);

        if let Some(query) = &self.query {
            query.apply(&mut url);
        }
        Ok(url)
    }
}

fn archive_collection(api_key: u32) -> Vec<String> {
    vec![
        "v2".to_string(),
        "project".to_string(),
        api_key.to_string(),
        "archive".to_string(),
    ]
}

/// Map a failed response onto the error taxonomy.
///
/// `source` is set when the response body could not be read.
pub(crate) fn classify(
    operation: OperationKind,
    status: StatusCode,
    target: &Target,
    source: Option<reqwest::Error>,
) -> Error {
    let status = status.as_u16();
    let Some(condition) = operation.condition_for(status) else {
        return Error::UnexpectedStatus {
            operation,
            status,
            source,
        };
    };

    let archive_id = target.archive_id.clone().filter(|_| condition.names_archive());
    let session_id = target.session_id.clone().filter(|_| condition.names_session());

    let mut message = format!("Could not {}. {}", operation, condition.description());
    if let Some(id) = &archive_id {
        message.push_str(&format!(" archiveId = {}", id));
    }
    if let Some(id) = &session_id {
        message.push_str(&format!(" sessionId = {}", id));
    }

    Error::Protocol {
        operation,
        status,
        condition,
        archive_id,
        session_id,
        message,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: u32 = 123456;

    fn archive_target(id: &str) -> Target {
        Target {
            archive_id: Some(id.to_string()),
            session_id: None,
        }
    }

    fn base() -> Url {
        Url::parse("https://api.opentok.com").unwrap()
    }

    fn url_of(op: &Operation) -> String {
        op.url(&base()).unwrap().to_string()
    }

    #[test]
    fn test_archive_paths_and_methods() {
        let get = Operation::get_archive(KEY, "A1");
        assert_eq!(url_of(&get), "https://api.opentok.com/v2/project/123456/archive/A1");
        assert_eq!(get.kind.method(), Method::GET);
        assert_eq!(get.body, RequestBody::Empty);

        let stop = Operation::stop_archive(KEY, "A1");
        assert_eq!(url_of(&stop), "https://api.opentok.com/v2/project/123456/archive/A1/stop");
        assert_eq!(stop.kind.method(), Method::POST);

        let delete = Operation::delete_archive(KEY, "A1");
        assert_eq!(url_of(&delete), "https://api.opentok.com/v2/project/123456/archive/A1");
        assert_eq!(delete.kind.method(), Method::DELETE);
    }

    #[test]
    fn test_list_paths() {
        let all = Operation::list_archives(KEY, &ArchiveListQuery::default());
        assert_eq!(url_of(&all), "https://api.opentok.com/v2/project/123456/archive");

        let page = Operation::list_archives(KEY, &ArchiveListQuery::Paged { offset: 5, count: 1000 });
        assert_eq!(
            url_of(&page),
            "https://api.opentok.com/v2/project/123456/archive?offset=5&"
        );

        let by_session =
            Operation::list_archives(KEY, &ArchiveListQuery::BySession("S1".to_string()));
        assert_eq!(
            url_of(&by_session),
            "https://api.opentok.com/v2/project/123456/archive?sessionId=S1"
        );
        assert_eq!(by_session.target.session_id.as_deref(), Some("S1"));
    }

    #[test]
    fn test_base_url_path_is_kept() {
        let base = Url::parse("http://localhost:8080/proxy").unwrap();
        let op = Operation::create_session(None, FormEncoding::UrlEncoded);
        assert_eq!(
            op.url(&base).unwrap().as_str(),
            "http://localhost:8080/proxy/session/create"
        );
    }

    #[test]
    fn test_identifiers_stay_inside_their_segment() {
        let op = Operation::delete_archive(KEY, "../../../session/create");
        let url = op.url(&base()).unwrap();
        assert_eq!(
            url.path(),
            "/v2/project/123456/archive/..%2F..%2F..%2Fsession%2Fcreate"
        );

        let op = Operation::get_archive(KEY, "A1?sessionId=X#frag");
        let url = op.url(&base()).unwrap();
        assert_eq!(url.path(), "/v2/project/123456/archive/A1%3FsessionId=X%23frag");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);

        let op = Operation::stop_archive(KEY, "50%");
        assert_eq!(
            op.url(&base()).unwrap().path(),
            "/v2/project/123456/archive/50%25/stop"
        );
    }

    #[test]
    fn test_session_id_is_query_encoded() {
        let op = Operation::list_archives(KEY, &ArchiveListQuery::BySession("S1&offset=9".to_string()));
        let url = op.url(&base()).unwrap();
        assert_eq!(url.query(), Some("sessionId=S1%26offset%3D9"));
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("sessionId".to_string(), "S1&offset=9".to_string())]);
    }

    #[test]
    fn test_dot_and_empty_identifiers_are_rejected() {
        for id in ["", ".", ".."] {
            let err = Operation::delete_archive(KEY, id).url(&base()).unwrap_err();
            match err {
                Error::InvalidIdentifier { operation, id: rejected } => {
                    assert_eq!(operation, OperationKind::DeleteArchive);
                    assert_eq!(rejected, id);
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_start_archive_has_json_body() {
        let op = Operation::start_archive(KEY, "S1", &ArchiveProperties::default()).unwrap();
        assert_eq!(url_of(&op), "https://api.opentok.com/v2/project/123456/archive");
        match op.body {
            RequestBody::Json(body) => assert!(body.contains("\"sessionId\":\"S1\"")),
            other => panic!("expected JSON body, got {:?}", other),
        }
    }

    #[test]
    fn test_create_session_body() {
        let empty = Operation::create_session(None, FormEncoding::UrlEncoded);
        assert_eq!(url_of(&empty), "https://api.opentok.com/session/create");
        assert_eq!(empty.body, RequestBody::Empty);

        let mut params = SessionParams::new();
        params.insert("archiveMode".to_string(), vec!["always".to_string()]);
        let op = Operation::create_session(Some(&params), FormEncoding::UrlEncoded);
        assert_eq!(
            op.body,
            RequestBody::Form {
                body: "archiveMode=always".to_string(),
                content_type: Some("application/x-www-form-urlencoded"),
            }
        );
    }

    #[test]
    fn test_every_table_entry_classifies_as_protocol() {
        let kinds = [
            OperationKind::GetArchive,
            OperationKind::ListArchives,
            OperationKind::StartArchive,
            OperationKind::StopArchive,
            OperationKind::DeleteArchive,
        ];
        let target = Target {
            archive_id: Some("A1".to_string()),
            session_id: Some("S1".to_string()),
        };

        for kind in kinds {
            for (code, condition) in kind.status_table() {
                let status = StatusCode::from_u16(*code).unwrap();
                match classify(kind, status, &target, None) {
                    Error::Protocol {
                        operation,
                        status,
                        condition: c,
                        archive_id,
                        session_id,
                        ..
                    } => {
                        assert_eq!(operation, kind);
                        assert_eq!(status, *code);
                        assert_eq!(c, *condition);
                        assert_eq!(archive_id.is_some(), condition.names_archive());
                        assert_eq!(session_id.is_some(), condition.names_session());
                    }
                    other => panic!("{} {}: unexpected {:?}", kind, code, other),
                }
            }
        }
    }

    #[test]
    fn test_unknown_status_is_unexpected() {
        let err = classify(
            OperationKind::GetArchive,
            StatusCode::IM_A_TEAPOT,
            &archive_target("A1"),
            None,
        );
        assert!(matches!(
            err,
            Error::UnexpectedStatus {
                operation: OperationKind::GetArchive,
                status: 418,
                ..
            }
        ));
        assert!(err.to_string().contains("418"));

        // 404 is only known to start/stop
        let err = classify(
            OperationKind::DeleteArchive,
            StatusCode::NOT_FOUND,
            &archive_target("A1"),
            None,
        );
        assert!(matches!(err, Error::UnexpectedStatus { status: 404, .. }));
    }

    #[test]
    fn test_messages_name_identifiers() {
        let err = classify(
            OperationKind::StopArchive,
            StatusCode::CONFLICT,
            &archive_target("A9"),
            None,
        );
        assert_eq!(
            err.to_string(),
            "Could not stop an OpenTok Archive. The archive is not being recorded. archiveId = A9"
        );

        let err = classify(
            OperationKind::StartArchive,
            StatusCode::NOT_FOUND,
            &Target {
                archive_id: None,
                session_id: Some("S1".to_string()),
            },
            None,
        );
        assert_eq!(
            err.to_string(),
            "Could not start an OpenTok Archive. The sessionId does not exist. sessionId = S1"
        );
    }

    #[test]
    fn test_create_session_is_not_classified() {
        assert!(OperationKind::CreateSession.status_table().is_empty());
        assert_eq!(OperationKind::CreateSession.condition_for(500), None);
    }
}
