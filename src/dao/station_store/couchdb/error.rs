//! Failures of the CouchDB station store.

use reqwest::StatusCode;
use thiserror::Error;

pub type CouchResult<T> = Result<T, CouchDaoError>;

#[derive(Debug, Error)]
pub enum CouchDaoError {
    #[error("missing CouchDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// The configured base URL cannot address documents.
    #[error("invalid CouchDB base URL `{url}`")]
    InvalidBaseUrl { url: String },
    #[error("failed to build CouchDB client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The request never got an HTTP answer.
    #[error("CouchDB unreachable while calling `{target}`")]
    Unreachable {
        target: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("CouchDB answered {status} for `{target}`")]
    UnexpectedStatus { target: String, status: StatusCode },
    /// The body of a successful answer was not JSON.
    #[error("unreadable CouchDB response for `{target}`")]
    Decode {
        target: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("station document `{doc_id}` does not match the expected shape")]
    MalformedDocument {
        doc_id: String,
        #[source]
        source: serde_json::Error,
    },
    /// Another writer updated the document between our read and our write, twice.
    #[error("station document `{doc_id}` kept changing during save")]
    Conflict { doc_id: String },
}
