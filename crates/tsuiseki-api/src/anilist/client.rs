use std::time::Duration;

use reqwest::Client;

use super::error::AniListError;
use super::types::{AniListMedia, GraphQLResponse, PageResponse, SaveEntryResponse};
use crate::traits::{CatalogEntry, EntryUpdate, ListService, SavedEntry, SearchQuery};

pub const API_URL: &str = "https://graphql.anilist.co";

const SEARCH_QUERY: &str = r#"
query ($search: String, $year: FuzzyDateInt, $page: Int, $onList: Boolean) {
    Page(page: $page) {
        media(search: $search, type: ANIME, startDate_greater: $year, onList: $onList) {
            id
            title { romaji }
            season
            seasonYear
            episodes
            duration
            format
            status
            mediaListEntry {
                status
                progress
            }
        }
    }
}
"#;

const SAVE_MEDIA_LIST_ENTRY_MUTATION: &str = r#"
mutation ($mediaId: Int, $progress: Int, $status: MediaListStatus) {
    SaveMediaListEntry(mediaId: $mediaId, progress: $progress, status: $status) {
        mediaId
        status
        progress
    }
}
"#;

/// Transport settings for [`AniListClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Total attempts for searches. Mutations are always sent once.
    pub search_attempts: u32,
    /// Fixed pause between search attempts.
    pub retry_delay: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: API_URL.to_string(),
            timeout: Duration::from_secs(10),
            search_attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// AniList GraphQL API client.
pub struct AniListClient {
    access_token: Option<String>,
    http: Client,
    settings: ClientSettings,
}

impl AniListClient {
    pub fn new(access_token: Option<String>, settings: ClientSettings) -> Result<Self, AniListError> {
        let http = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            access_token,
            http,
            settings,
        })
    }

    async fn graphql_request<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: &serde_json::Value,
    ) -> Result<T, AniListError> {
        tracing::debug!(operation, "AniList GraphQL request");

        let mut request = self
            .http
            .post(&self.settings.api_url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&serde_json::json!({
                "query": query,
                "variables": variables,
            }));
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }
        let resp = request.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(operation, status = status_code, "AniList API error");
            return Err(AniListError::Api {
                status: status_code,
                message: body,
            });
        }

        tracing::debug!(operation, status = %status, "AniList response received");
        let body: GraphQLResponse<T> = resp
            .json()
            .await
            .map_err(|e| AniListError::Parse(e.to_string()))?;

        match body.data {
            Some(data) if body.errors.is_empty() => Ok(data),
            _ => {
                let messages: Vec<String> =
                    body.errors.into_iter().map(|e| e.to_string()).collect();
                let message = if messages.is_empty() {
                    "response carried no data".to_string()
                } else {
                    messages.join("; ")
                };
                tracing::warn!(operation, %message, "AniList GraphQL error");
                Err(AniListError::GraphQL(message))
            }
        }
    }

    /// Send a request, repeating it on transient failures.
    async fn graphql_request_with_retries<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
        attempts: u32,
    ) -> Result<T, AniListError> {
        let attempts = attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.graphql_request(operation, query, &variables).await {
                Err(e) if e.is_transient() && attempt < attempts => {
                    tracing::warn!(operation, attempt, attempts, error = %e, "transient failure, retrying");
                    tokio::time::sleep(self.settings.retry_delay).await;
                    attempt += 1;
                }
                Err(e) if e.is_transient() && attempts > 1 => {
                    tracing::warn!(operation, attempts, error = %e, "giving up after {attempts} attempt(s)");
                    return Err(e);
                }
                result => return result,
            }
        }
    }
}

impl ListService for AniListClient {
    type Error = AniListError;

    async fn search(&self, query: &SearchQuery) -> Result<Vec<CatalogEntry>, AniListError> {
        let variables = serde_json::json!({
            "search": query.search,
            "year": query.start_after,
            "page": 1,
            "onList": query.on_list,
        });
        let page: PageResponse = self
            .graphql_request_with_retries(
                "Search",
                SEARCH_QUERY,
                variables,
                self.settings.search_attempts,
            )
            .await?;
        let entries: Vec<CatalogEntry> = page
            .page
            .media
            .into_iter()
            .map(AniListMedia::into_catalog_entry)
            .collect();
        tracing::debug!(search = %query.search, on_list = query.on_list, results = entries.len(), "search finished");
        Ok(entries)
    }

    async fn save_entry(&self, update: &EntryUpdate) -> Result<SavedEntry, AniListError> {
        // AniList leaves fields whose variables are absent untouched.
        let mut variables = serde_json::json!({ "mediaId": update.media_id });
        if let Some(progress) = update.progress {
            variables["progress"] = serde_json::json!(progress);
        }
        if let Some(status) = update.status {
            variables["status"] = serde_json::json!(status);
        }
        let resp: SaveEntryResponse = self
            .graphql_request("SaveMediaListEntry", SAVE_MEDIA_LIST_ENTRY_MUTATION, &variables)
            .await?;
        Ok(resp.save_media_list_entry.into_saved_entry())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ListStatus;
    use std::collections::VecDeque;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    enum Behavior {
        Respond(u16, String),
        DelayRespond(Duration, u16, String),
    }

    /// A local HTTP server answering each connection with the next queued behavior.
    struct TestServer {
        base_url: String,
        requests: Arc<Mutex<Vec<String>>>,
        shutdown_tx: mpsc::Sender<()>,
        join_handle: Option<std::thread::JoinHandle<()>>,
    }

    impl TestServer {
        fn spawn(behaviors: Vec<Behavior>) -> Self {
            let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind test server");
            listener.set_nonblocking(true).expect("set nonblocking");
            let addr = listener.local_addr().expect("local addr");

            let requests = Arc::new(Mutex::new(Vec::new()));
            let requests_clone = Arc::clone(&requests);
            let queue = Arc::new(Mutex::new(VecDeque::from(behaviors)));
            let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

            let join_handle = std::thread::spawn(move || loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }
                match listener.accept() {
                    Ok((mut stream, _)) => {
                        let behavior = queue
                            .lock()
                            .expect("lock behaviors")
                            .pop_front()
                            .unwrap_or_else(|| Behavior::Respond(500, "unexpected".into()));
                        let requests = Arc::clone(&requests_clone);
                        std::thread::spawn(move || {
                            let raw = read_request(&mut stream).unwrap_or_default();
                            requests.lock().expect("lock requests").push(raw);
                            serve_behavior(&mut stream, behavior);
                        });
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                        std::thread::sleep(Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            });

            Self {
                base_url: format!("http://{addr}"),
                requests,
                shutdown_tx,
                join_handle: Some(join_handle),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().expect("lock requests").len()
        }

        fn request(&self, index: usize) -> String {
            self.requests.lock().expect("lock requests")[index].clone()
        }
    }

    impl Drop for TestServer {
        fn drop(&mut self) {
            let _ = self.shutdown_tx.send(());
            if let Some(handle) = self.join_handle.take() {
                let _ = handle.join();
            }
        }
    }

    /// Read headers and a `Content-Length` body.
    fn read_request(stream: &mut TcpStream) -> std::io::Result<String> {
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(Duration::from_millis(500)))?;
        let mut data = Vec::new();
        let mut buf = [0_u8; 4096];
        loop {
            if let Some(end) = data.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&data[..end]).to_lowercase();
                let length = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if data.len() >= end + 4 + length {
                    break;
                }
            }
            match stream.read(&mut buf) {
                Ok(0) => break,
                Ok(read) => data.extend_from_slice(&buf[..read]),
                Err(_) => break,
            }
        }
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    fn serve_behavior(stream: &mut TcpStream, behavior: Behavior) {
        match behavior {
            Behavior::Respond(status, body) => {
                let _ = write_response(stream, status, &body);
            }
            Behavior::DelayRespond(delay, status, body) => {
                std::thread::sleep(delay);
                let _ = write_response(stream, status, &body);
            }
        }
    }

    fn write_response(stream: &mut TcpStream, status: u16, body: &str) -> std::io::Result<()> {
        let payload = body.as_bytes();
        write!(
            stream,
            "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            payload.len()
        )?;
        stream.write_all(payload)?;
        stream.flush()
    }

    const SEARCH_OK: &str = r#"{"data":{"Page":{"media":[{"id":7,"title":{"romaji":"Mob Psycho 100"},"season":"SUMMER","seasonYear":2016,"episodes":12,"duration":24,"format":"TV","status":"FINISHED","mediaListEntry":{"status":"CURRENT","progress":3}}]}}}"#;

    const SAVE_OK: &str =
        r#"{"data":{"SaveMediaListEntry":{"mediaId":7,"status":"CURRENT","progress":4}}}"#;

    fn client(server: &TestServer, attempts: u32, timeout: Duration) -> AniListClient {
        AniListClient::new(
            Some("secret-token".into()),
            ClientSettings {
                api_url: server.base_url.clone(),
                timeout,
                search_attempts: attempts,
                retry_delay: Duration::from_millis(1),
            },
        )
        .expect("build client")
    }

    fn query() -> SearchQuery {
        SearchQuery {
            search: "Mob Psycho 100".into(),
            start_after: 1,
            on_list: true,
        }
    }

    #[tokio::test]
    async fn search_retries_server_errors_until_success() {
        let server = TestServer::spawn(vec![
            Behavior::Respond(500, "boom".into()),
            Behavior::Respond(503, "down".into()),
            Behavior::Respond(200, SEARCH_OK.into()),
        ]);
        let entries = client(&server, 3, Duration::from_secs(2))
            .search(&query())
            .await
            .expect("third attempt succeeds");

        assert_eq!(server.request_count(), 3);
        assert_eq!(entries[0].id, 7);
        assert_eq!(entries[0].episodes, Some(12));
        assert_eq!(
            entries[0].list_entry.and_then(|e| e.status),
            Some(ListStatus::Current)
        );
    }

    #[tokio::test]
    async fn search_sends_token_and_variables() {
        let server = TestServer::spawn(vec![Behavior::Respond(200, SEARCH_OK.into())]);
        client(&server, 1, Duration::from_secs(2))
            .search(&query())
            .await
            .expect("search succeeds");

        let raw = server.request(0);
        assert!(raw.to_lowercase().contains("authorization: bearer secret-token"));
        assert!(raw.contains(r#""onList":true"#));
        assert!(raw.contains(r#""search":"Mob Psycho 100""#));
        assert!(raw.contains(r#""year":1"#));
    }

    #[tokio::test]
    async fn search_does_not_retry_client_errors() {
        let server = TestServer::spawn(vec![Behavior::Respond(400, "bad query".into())]);
        let err = client(&server, 5, Duration::from_secs(2))
            .search(&query())
            .await
            .expect_err("400 is final");

        assert!(matches!(err, AniListError::Api { status: 400, .. }), "{err}");
        assert_eq!(server.request_count(), 1);
    }

    #[tokio::test]
    async fn search_gives_up_after_configured_attempts() {
        let server = TestServer::spawn(vec![
            Behavior::Respond(503, "down".into()),
            Behavior::Respond(503, "still down".into()),
        ]);
        let err = client(&server, 2, Duration::from_secs(2))
            .search(&query())
            .await
            .expect_err("retries exhausted");

        assert!(err.to_string().contains("still down"), "{err}");
        assert_eq!(server.request_count(), 2);
    }

    #[tokio::test]
    async fn search_retries_timeouts() {
        let server = TestServer::spawn(vec![
            Behavior::DelayRespond(Duration::from_millis(600), 200, SEARCH_OK.into()),
            Behavior::Respond(200, SEARCH_OK.into()),
        ]);
        let entries = client(&server, 2, Duration::from_millis(200))
            .search(&query())
            .await
            .expect("second attempt succeeds");

        assert_eq!(entries.len(), 1);
        assert_eq!(server.request_count(), 2);
    }

    #[tokio::test]
    async fn save_entry_is_sent_once() {
        let server = TestServer::spawn(vec![Behavior::Respond(500, "boom".into())]);
        let update = EntryUpdate {
            media_id: 7,
            progress: Some(4),
            status: Some(ListStatus::Current),
        };
        let err = client(&server, 5, Duration::from_secs(2))
            .save_entry(&update)
            .await
            .expect_err("mutation failure surfaces");

        assert!(matches!(err, AniListError::Api { status: 500, .. }));
        assert_eq!(server.request_count(), 1);
    }

    #[tokio::test]
    async fn save_entry_returns_echoed_values() {
        let server = TestServer::spawn(vec![Behavior::Respond(200, SAVE_OK.into())]);
        let update = EntryUpdate {
            media_id: 7,
            progress: Some(4),
            status: None,
        };
        let saved = client(&server, 1, Duration::from_secs(2))
            .save_entry(&update)
            .await
            .expect("mutation succeeds");

        assert_eq!(saved.progress, Some(4));
        assert_eq!(saved.status, Some(ListStatus::Current));
        let raw = server.request(0);
        assert!(raw.contains(r#""progress":4"#));
        assert!(!raw.contains(r#""status""#));
    }

    #[tokio::test]
    async fn graphql_errors_surface() {
        let server = TestServer::spawn(vec![Behavior::Respond(
            200,
            r#"{"data":null,"errors":[{"message":"Invalid token","status":400}]}"#.into(),
        )]);
        let err = client(&server, 3, Duration::from_secs(2))
            .search(&query())
            .await
            .expect_err("graphql error");

        assert!(matches!(err, AniListError::GraphQL(ref m) if m == "Invalid token (400)"));
        assert_eq!(server.request_count(), 1);
    }
}
