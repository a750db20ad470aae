// API client module: a small blocking HTTP client that talks to Kodi's
// JSON-RPC interface. It is intentionally synchronous; the menu only ever
// has one request in flight.

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::config::ServerSettings;
use crate::error::ClientError;

const JSONRPC_VERSION: &str = "2.0";
// The id is required by JSON-RPC 2.0 but never used for correlation,
// since requests are strictly sequential.
const REQUEST_ID: u32 = 1;

/// JSON-RPC 2.0 request envelope.
#[derive(Serialize, Debug)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
    id: u32,
}

/// JSON-RPC 2.0 response envelope. Error responses carry no `result`
/// and fall out as `ClientError::EmptyResult`.
#[derive(Deserialize, Debug)]
struct RpcEnvelope<T> {
    result: Option<T>,
}

/// A movie as returned by `VideoLibrary.GetMovies`.
///
/// `title` is the canonical display field for every category; it is
/// requested explicitly on each listing call rather than relying on the
/// server-default `label`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Movie {
    #[serde(rename = "movieid")]
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TvShow {
    #[serde(rename = "tvshowid")]
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Episode {
    #[serde(rename = "episodeid")]
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MusicVideo {
    #[serde(rename = "musicvideoid")]
    pub id: i64,
    pub title: String,
}

// Listing results wrap the items in a keyed object next to a `limits`
// block; the key is absent entirely when the library section is empty.
#[derive(Deserialize, Default)]
struct MovieList {
    #[serde(default)]
    movies: Vec<Movie>,
}

#[derive(Deserialize, Default)]
struct TvShowList {
    #[serde(default)]
    tvshows: Vec<TvShow>,
}

#[derive(Deserialize, Default)]
struct EpisodeList {
    #[serde(default)]
    episodes: Vec<Episode>,
}

#[derive(Deserialize, Default)]
struct MusicVideoList {
    #[serde(default)]
    musicvideos: Vec<MusicVideo>,
}

/// The library-management operations the rest of the program is written
/// against. `KodiClient` is the real implementation; tests substitute a
/// recording mock.
///
/// Listing operations filter client-side (the server does not): the
/// filter is a case-insensitive substring match against the title, and an
/// empty filter matches everything. Action operations return the server's
/// result as a display string, or the literal "Failed" when the response
/// carried no result.
pub trait LibraryBackend {
    fn scan(&self) -> Result<String, ClientError>;
    fn clean(&self) -> Result<String, ClientError>;

    fn movies(&self, filter: &str) -> Result<Vec<Movie>, ClientError>;
    fn tv_shows(&self, filter: &str) -> Result<Vec<TvShow>, ClientError>;
    fn music_videos(&self, filter: &str) -> Result<Vec<MusicVideo>, ClientError>;
    fn episodes(&self, show_id: i64) -> Result<Vec<Episode>, ClientError>;

    fn refresh_movie(&self, id: i64) -> Result<String, ClientError>;
    fn refresh_tv_show(&self, id: i64) -> Result<String, ClientError>;
    fn refresh_episode(&self, id: i64) -> Result<String, ClientError>;
    fn refresh_music_video(&self, id: i64) -> Result<String, ClientError>;

    fn delete_movie(&self, id: i64) -> Result<String, ClientError>;
    fn delete_tv_show(&self, id: i64) -> Result<String, ClientError>;
}

/// Blocking JSON-RPC client for a single Kodi instance. Holds a reqwest
/// client, the endpoint URL and optional Basic-auth credentials, all
/// fixed at construction.
pub struct KodiClient {
    http: Client,
    endpoint: String,
    credentials: Option<(String, String)>,
}

impl KodiClient {
    pub fn new(server: &ServerSettings) -> Result<Self, ClientError> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            endpoint: server.endpoint(),
            credentials: server.credentials(),
        })
    }

    /// Send one JSON-RPC request and deserialize its `result` field.
    /// Every call is an independent round trip; nothing is batched or
    /// cached.
    fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<T, ClientError> {
        let payload = RpcRequest {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
            id: REQUEST_ID,
        };
        debug!(method, "sending JSON-RPC request");
        let mut request = self.http.post(&self.endpoint).json(&payload);
        if let Some((user, pass)) = &self.credentials {
            request = request.basic_auth(user, Some(pass));
        }
        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClientError::Http { status, body });
        }
        let envelope: RpcEnvelope<T> = response.json()?;
        envelope.result.ok_or(ClientError::EmptyResult)
    }

    /// Action calls (scan, refresh, delete) report whatever the server
    /// said, usually "OK". A missing result is a soft failure.
    fn action(&self, method: &str, params: Option<Value>) -> Result<String, ClientError> {
        match self.call::<Value>(method, params) {
            Ok(result) => Ok(describe(&result)),
            Err(ClientError::EmptyResult) => Ok("Failed".to_string()),
            Err(e) => Err(e),
        }
    }

    /// Listing calls treat a missing result as an empty library section.
    fn listing<L: DeserializeOwned + Default>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<L, ClientError> {
        match self.call(method, Some(params)) {
            Ok(list) => Ok(list),
            Err(ClientError::EmptyResult) => Ok(L::default()),
            Err(e) => Err(e),
        }
    }
}

impl LibraryBackend for KodiClient {
    fn scan(&self) -> Result<String, ClientError> {
        self.action("VideoLibrary.Scan", None)
    }

    fn clean(&self) -> Result<String, ClientError> {
        self.action("VideoLibrary.Clean", None)
    }

    fn movies(&self, filter: &str) -> Result<Vec<Movie>, ClientError> {
        let list: MovieList =
            self.listing("VideoLibrary.GetMovies", json!({ "properties": ["title"] }))?;
        Ok(retain_matching(list.movies, filter, |m| &m.title))
    }

    fn tv_shows(&self, filter: &str) -> Result<Vec<TvShow>, ClientError> {
        let list: TvShowList =
            self.listing("VideoLibrary.GetTVShows", json!({ "properties": ["title"] }))?;
        Ok(retain_matching(list.tvshows, filter, |s| &s.title))
    }

    fn music_videos(&self, filter: &str) -> Result<Vec<MusicVideo>, ClientError> {
        let list: MusicVideoList = self.listing(
            "VideoLibrary.GetMusicVideos",
            json!({ "properties": ["title"] }),
        )?;
        Ok(retain_matching(list.musicvideos, filter, |v| &v.title))
    }

    fn episodes(&self, show_id: i64) -> Result<Vec<Episode>, ClientError> {
        let list: EpisodeList = self.listing(
            "VideoLibrary.GetEpisodes",
            json!({ "tvshowid": show_id, "properties": ["title"] }),
        )?;
        Ok(list.episodes)
    }

    fn refresh_movie(&self, id: i64) -> Result<String, ClientError> {
        self.action("VideoLibrary.RefreshMovie", Some(json!({ "movieid": id })))
    }

    fn refresh_tv_show(&self, id: i64) -> Result<String, ClientError> {
        self.action("VideoLibrary.RefreshTVShow", Some(json!({ "tvshowid": id })))
    }

    fn refresh_episode(&self, id: i64) -> Result<String, ClientError> {
        self.action(
            "VideoLibrary.RefreshEpisode",
            Some(json!({ "episodeid": id })),
        )
    }

    fn refresh_music_video(&self, id: i64) -> Result<String, ClientError> {
        self.action(
            "VideoLibrary.RefreshMusicVideo",
            Some(json!({ "musicvideoid": id })),
        )
    }

    fn delete_movie(&self, id: i64) -> Result<String, ClientError> {
        self.action("VideoLibrary.RemoveMovie", Some(json!({ "movieid": id })))
    }

    fn delete_tv_show(&self, id: i64) -> Result<String, ClientError> {
        self.action("VideoLibrary.RemoveTVShow", Some(json!({ "tvshowid": id })))
    }
}

/// Render a JSON-RPC result for display: strings pass through unquoted,
/// anything else as compact JSON.
fn describe(result: &Value) -> String {
    match result {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Keep the items whose title contains `filter`, case-insensitively.
/// An empty filter keeps everything.
fn retain_matching<T>(items: Vec<T>, filter: &str, title: impl Fn(&T) -> &str) -> Vec<T> {
    if filter.is_empty() {
        return items;
    }
    let needle = filter.to_lowercase();
    items
        .into_iter()
        .filter(|item| title(item).to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_movies() -> Vec<Movie> {
        vec![
            Movie {
                id: 1,
                title: "The Matrix".into(),
            },
            Movie {
                id: 2,
                title: "Matrix Reloaded".into(),
            },
            Movie {
                id: 3,
                title: "Blade Runner".into(),
            },
        ]
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let matched = retain_matching(sample_movies(), "matrix", |m| &m.title);
        let titles: Vec<&str> = matched.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["The Matrix", "Matrix Reloaded"]);
    }

    #[test]
    fn filter_matches_anywhere_in_title() {
        let matched = retain_matching(sample_movies(), "RELOADED", |m| &m.title);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, 2);
    }

    #[test]
    fn empty_filter_keeps_everything() {
        assert_eq!(retain_matching(sample_movies(), "", |m| &m.title).len(), 3);
    }

    #[test]
    fn no_match_yields_empty() {
        assert!(retain_matching(sample_movies(), "zardoz", |m| &m.title).is_empty());
    }

    #[test]
    fn request_envelope_shape() {
        let req = RpcRequest {
            jsonrpc: JSONRPC_VERSION,
            method: "VideoLibrary.RefreshMovie",
            params: Some(json!({ "movieid": 7 })),
            id: REQUEST_ID,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "jsonrpc": "2.0",
                "method": "VideoLibrary.RefreshMovie",
                "params": { "movieid": 7 },
                "id": 1
            })
        );
    }

    #[test]
    fn request_envelope_omits_absent_params() {
        let req = RpcRequest {
            jsonrpc: JSONRPC_VERSION,
            method: "VideoLibrary.Scan",
            params: None,
            id: REQUEST_ID,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("params").is_none());
    }

    #[test]
    fn deserialize_movie_listing() {
        let payload = json!({
            "limits": { "start": 0, "end": 2, "total": 2 },
            "movies": [
                { "movieid": 10, "label": "The Matrix", "title": "The Matrix" },
                { "movieid": 11, "label": "Heat", "title": "Heat" }
            ]
        });
        let list: MovieList = serde_json::from_value(payload).unwrap();
        assert_eq!(
            list.movies,
            vec![
                Movie {
                    id: 10,
                    title: "The Matrix".into()
                },
                Movie {
                    id: 11,
                    title: "Heat".into()
                },
            ]
        );
    }

    #[test]
    fn deserialize_listing_without_items_key() {
        // An empty library section answers with just the limits block.
        let payload = json!({ "limits": { "start": 0, "end": 0, "total": 0 } });
        let list: EpisodeList = serde_json::from_value(payload).unwrap();
        assert!(list.episodes.is_empty());
    }

    #[test]
    fn missing_result_is_empty_result() {
        let envelope: RpcEnvelope<Value> =
            serde_json::from_value(json!({ "jsonrpc": "2.0", "id": 1 })).unwrap();
        assert!(envelope.result.is_none());
    }

    #[test]
    fn error_response_carries_no_result() {
        // Kodi answers method-level errors with 200 + an `error` member;
        // those follow the same soft-failure path as a missing result.
        let envelope: RpcEnvelope<Value> = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32601, "message": "Method not found." }
        }))
        .unwrap();
        assert!(envelope.result.is_none());
    }

    #[test]
    fn describe_passes_strings_through() {
        assert_eq!(describe(&json!("OK")), "OK");
    }

    #[test]
    fn describe_renders_other_values_as_json() {
        assert_eq!(describe(&json!({ "queued": true })), r#"{"queued":true}"#);
    }
}
