use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError};
use crate::models::{Book, BookPage, BookUpdate, NewBook, PageRequest, SearchRequest};
use crate::notifier::Notifier;
use crate::outcome::Outcome;
use crate::repo::BookRepo;
use crate::state::OperationKind;

/// Talks to the book service over HTTP and reports every result through the notifier.
#[derive(Clone)]
pub struct HttpBookRepo {
    client: Client,
    base_url: Url,
    notifier: Arc<dyn Notifier>,
}

impl HttpBookRepo {
    pub fn new(config: &ClientConfig, notifier: Arc<dyn Notifier>) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ConfigError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                url: config.base_url.clone(),
                reason: "URL cannot have path segments".to_string(),
            });
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(HttpBookRepo {
            client,
            base_url,
            notifier,
        })
    }

    /// Appends percent-encoded path segments to the base URL.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn call<E: Envelope>(
        &self,
        kind: OperationKind,
        request: RequestBuilder,
    ) -> Outcome<E::Payload> {
        debug!("Sending {:?} request to the book service", kind);

        let outcome = match exchange::<E>(kind, request).await {
            Ok(envelope) => envelope.into_outcome(kind),
            Err(error) => Outcome::failed(error),
        };

        if let Some(error) = &outcome.error {
            warn!("{:?} request failed: {}", kind, error);
        }
        self.notify(&outcome);

        outcome
    }

    fn notify<T>(&self, outcome: &Outcome<T>) {
        match &outcome.error {
            None => self.notifier.notify_success(&outcome.message),
            Some(ApiError::Validation(m)) | Some(ApiError::Conflict(m)) => {
                self.notifier.notify_info(m)
            }
            Some(error) => self.notifier.notify_error(error.message()),
        }
    }
}

impl BookRepo for HttpBookRepo {
    async fn list_books(&self, page: PageRequest) -> Outcome<BookPage> {
        let request = self
            .client
            .get(self.url(&["book", "fetch-all"]))
            .query(&[("page", page.page), ("limit", page.limit)]);

        self.call::<BooksEnvelope>(OperationKind::FetchAll, request).await
    }

    async fn get_book(&self, id: String) -> Outcome<Option<Book>> {
        let request = self.client.get(self.url(&["book", "fetch", id.as_str()]));

        self.call::<BookEnvelope>(OperationKind::FetchById, request).await
    }

    async fn insert_book(&self, new_book: NewBook) -> Outcome<Option<Book>> {
        let request = self
            .client
            .post(self.url(&["book", "create"]))
            .json(&new_book);

        self.call::<BookEnvelope>(OperationKind::Create, request).await
    }

    async fn update_book(&self, update: BookUpdate) -> Outcome<Option<Book>> {
        let request = self
            .client
            .put(self.url(&["book", "update", update.id.as_str()]))
            .json(&update.patch);

        self.call::<BookEnvelope>(OperationKind::Update, request).await
    }

    async fn delete_book(&self, id: String) -> Outcome<()> {
        let request = self.client.delete(self.url(&["book", "delete", id.as_str()]));

        self.call::<StatusEnvelope>(OperationKind::Delete, request).await
    }

    async fn search_books(&self, search: SearchRequest) -> Outcome<BookPage> {
        let request = self
            .client
            .post(self.url(&["book", "search"]))
            .query(&[("page", search.page.page), ("limit", search.page.limit)])
            .json(&SearchBody {
                search_input: &search.query,
            });

        self.call::<BooksEnvelope>(OperationKind::Search, request).await
    }
}

/// Sends the request and decodes a 2xx body, classifying everything else.
async fn exchange<E: DeserializeOwned>(
    kind: OperationKind,
    request: RequestBuilder,
) -> Result<E, ApiError> {
    let fallback = || kind.fallback_message().to_string();

    let response = request.send().await.map_err(|e| {
        warn!("No response for {:?} request: {}", kind, e);
        ApiError::Transport(fallback())
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        warn!("Could not read {:?} response body: {}", kind, e);
        ApiError::Transport(fallback())
    })?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .ok()
            .and_then(|envelope| non_empty(envelope.message))
            .unwrap_or_else(fallback);
        return Err(ApiError::from_status(status.as_u16(), message));
    }

    serde_json::from_str(&body).map_err(|e| {
        warn!("Could not decode {:?} response: {}", kind, e);
        ApiError::Transport(fallback())
    })
}

fn non_empty(message: Option<String>) -> Option<String> {
    message.filter(|m| !m.trim().is_empty())
}

/// A 2xx response body from the book service.
trait Envelope: DeserializeOwned {
    type Payload: Default;

    fn into_parts(self) -> (bool, Option<String>, Self::Payload);

    fn into_outcome(self, kind: OperationKind) -> Outcome<Self::Payload> {
        let (success, message, payload) = self.into_parts();
        let message = non_empty(message);

        if success {
            Outcome::succeeded(
                message.unwrap_or_else(|| kind.success_message().to_string()),
                payload,
            )
        } else {
            let message = message.unwrap_or_else(|| kind.fallback_message().to_string());
            Outcome::failed(ApiError::Rejected(message))
        }
    }
}

#[derive(Deserialize)]
struct BookEnvelope {
    success: bool,
    message: Option<String>,
    book: Option<Book>,
}

impl Envelope for BookEnvelope {
    type Payload = Option<Book>;

    fn into_parts(self) -> (bool, Option<String>, Option<Book>) {
        (self.success, self.message, self.book)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BooksEnvelope {
    success: bool,
    message: Option<String>,
    total_docs_count: Option<u64>,
    #[serde(default)]
    books: Vec<Book>,
}

impl Envelope for BooksEnvelope {
    type Payload = BookPage;

    fn into_parts(self) -> (bool, Option<String>, BookPage) {
        let total_count = self.total_docs_count.unwrap_or(self.books.len() as u64);
        let page = BookPage {
            books: self.books,
            total_count,
        };
        (self.success, self.message, page)
    }
}

#[derive(Deserialize)]
struct StatusEnvelope {
    success: bool,
    message: Option<String>,
}

impl Envelope for StatusEnvelope {
    type Payload = ();

    fn into_parts(self) -> (bool, Option<String>, ()) {
        (self.success, self.message, ())
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody<'a> {
    search_input: &'a str,
}
