use serde::Deserialize;

// GitHub API response structures. Only the fields the follow-back run reads
// are declared; everything else in the payload is ignored.

/// Entry of a followers / following listing.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

/// Single user resource from `/users/{login}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubProfile {
    pub followers: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepo {
    pub stargazers_count: u64,
}
