use dealfeed_core::{Deal, VoteDirection, VoteState, VoteTally};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct FeedEntry {
    #[serde(flatten)]
    pub deal: Deal,
    #[serde(default)]
    pub my_vote: VoteState,
}

#[derive(Debug, Serialize)]
pub struct VoteRequest {
    pub direction: VoteDirection,
}

#[derive(Debug, Deserialize)]
pub struct VoteResponse {
    pub upvotes: u32,
    pub downvotes: u32,
    pub state: VoteState,
}

impl VoteResponse {
    pub fn tally(&self) -> VoteTally {
        VoteTally::with_state(self.upvotes, self.downvotes, self.state)
    }
}

#[derive(Debug, Serialize)]
pub struct CommentRequest<'a> {
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct MeResponse {
    pub authenticated: bool,
    pub profile: Option<Profile>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub access_token: Option<String>,
    pub error: Option<String>,
}
