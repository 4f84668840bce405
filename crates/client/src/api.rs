use dealfeed_core::{Comment, NewComment, VoteDirection};
use serde::de::DeserializeOwned;

use crate::models::{CommentRequest, FeedEntry, MeResponse, VoteRequest, VoteResponse};

pub struct Api {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl Api {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            http: reqwest::Client::new(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.header("Authorization", format!("Bearer {}", token)),
            None => builder,
        }
    }

    /// Every deal, unfiltered. Filtering and sorting happen locally.
    pub async fn deals(&self) -> anyhow::Result<Vec<FeedEntry>> {
        read(self.request(reqwest::Method::GET, "/deals").send().await?, "Feed").await
    }

    pub async fn deal(&self, id: &str) -> anyhow::Result<FeedEntry> {
        read(
            self.request(reqwest::Method::GET, &format!("/deals/{id}"))
                .send()
                .await?,
            "Deal",
        )
        .await
    }

    pub async fn comments(&self, deal_id: &str) -> anyhow::Result<Vec<Comment>> {
        read(
            self.request(reqwest::Method::GET, &format!("/deals/{deal_id}/comments"))
                .send()
                .await?,
            "Comments",
        )
        .await
    }

    pub async fn vote(&self, deal_id: &str, direction: VoteDirection) -> anyhow::Result<VoteResponse> {
        let response = self
            .request(reqwest::Method::POST, &format!("/deals/{deal_id}/vote"))
            .json(&VoteRequest { direction })
            .send()
            .await?;

        read(response, "Vote").await
    }

    pub async fn comment(&self, deal_id: &str, content: &str) -> anyhow::Result<Comment> {
        // Same check the server applies, without the round trip.
        let draft = NewComment {
            content: content.to_string(),
        };
        if let Err(errors) = draft.validate() {
            let messages: Vec<_> = errors.iter().map(ToString::to_string).collect();
            anyhow::bail!("{}", messages.join(", "));
        }

        let response = self
            .request(reqwest::Method::POST, &format!("/deals/{deal_id}/comments"))
            .json(&CommentRequest { content })
            .send()
            .await?;

        read(response, "Comment").await
    }

    pub async fn me(&self) -> anyhow::Result<MeResponse> {
        read(self.request(reqwest::Method::GET, "/me").send().await?, "Profile").await
    }
}

async fn read<T: DeserializeOwned>(response: reqwest::Response, what: &str) -> anyhow::Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await?;
        anyhow::bail!("{} failed ({}): {}", what, status, text);
    }

    Ok(response.json().await?)
}
