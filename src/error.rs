// Error surface shared by the API client and the bulk refresher.
// Two kinds matter to callers: the request never made it (transport),
// or it did but the server answered without a usable result.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection or request failure before a status line was read.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status. The response body is
    /// kept verbatim; Kodi puts its explanation there.
    #[error("server returned {status}: {body}")]
    Http { status: StatusCode, body: String },

    /// A 2xx response whose payload carried no `result` field. Soft
    /// failure: callers surface it as "Failed" or an empty listing.
    #[error("response carried no result")]
    EmptyResult,
}
