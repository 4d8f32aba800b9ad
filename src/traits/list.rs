//! List trait for fetching collections of entities.

use async_trait::async_trait;

use crate::client::CircleClient;
use crate::error::Result;

/// List entities matching a query.
///
/// Each call is a single request; offsets and limits in the query are passed
/// through to the API as they are.
///
/// # Example
///
/// ```ignore
/// use circleci_api::{Build, BuildQuery, CircleClient, List};
///
/// let client = CircleClient::from_env()?;
/// let query = BuildQuery::new("acme", "widgets").branch("main");
/// let builds = Build::list(&client, &query).await?;
/// ```
#[async_trait]
pub trait List: Sized + Send {
    /// Query describing what to fetch.
    type Query: Send + Sync;

    /// List entities matching the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is incomplete or the request fails.
    async fn list(client: &CircleClient, query: &Self::Query) -> Result<Vec<Self>>;
}
