//! This module provides a client to connect to the remote task store over its REST API

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::error::Error;
use crate::session::Session;
use crate::task::{Task, TaskDraft, TaskId, TaskPatch};
use crate::traits::TaskStore;

/// The header carrying the session token on every call
static AUTH_HEADER: &str = "auth-token";

/// A [`TaskStore`] that fetches its data from the remote REST service
pub struct Client {
    base_url: Url,
    session: Session,
    http: reqwest::Client,
}

impl Client {
    /// Create a client. This does not start a connection.
    ///
    /// `base_url` is the API root, e.g. `https://example.com/api`.
    pub fn new<S: AsRef<str>>(base_url: S, session: Session) -> Result<Self, Error> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self {
            base_url,
            session,
            http: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let joined = format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path);
        Ok(Url::parse(&joined)?)
    }

    /// Attach the session token and send.
    ///
    /// A call issued with no token at all fails `Unauthorized` without touching the
    /// network, which is indistinguishable (on purpose) from a server-side rejection.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        let token = match self.session.token() {
            Some(token) => token,
            None => return Err(Error::Unauthorized),
        };

        let response = request.header(AUTH_HEADER, token).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }
        if response.status().is_success() == false {
            return Err(Error::UnexpectedStatus(response.status().as_u16()));
        }
        Ok(response)
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[derive(Deserialize)]
struct PlanTomorrowResponse {
    #[serde(default)]
    planned: bool,
}

#[async_trait]
impl TaskStore for Client {
    async fn list_tasks(&self) -> Result<Vec<Task>, Error> {
        let url = self.endpoint("todos")?;
        let response = self.send(self.http.get(url)).await?;
        let tasks: Vec<Task> = Self::decode(response).await?;
        log::debug!("Fetched {} tasks from the store", tasks.len());
        Ok(tasks)
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, Error> {
        let url = self.endpoint("todos")?;
        let response = self.send(self.http.post(url).json(draft)).await?;
        Self::decode(response).await
    }

    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, Error> {
        let url = self.endpoint(&format!("todos/{}", id))?;
        let response = self.send(self.http.put(url).json(patch)).await?;
        Self::decode(response).await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), Error> {
        let url = self.endpoint(&format!("todos/{}", id))?;
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    async fn plan_tomorrow(&self) -> Result<bool, Error> {
        let url = self.endpoint("todos/plan-tomorrow")?;
        let response = self.send(self.http.post(url)).await?;
        let reply: PlanTomorrowResponse = Self::decode(response).await?;
        Ok(reply.planned)
    }
}
