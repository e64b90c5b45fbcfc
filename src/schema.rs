//! Resolver orchestration: the mapping from each graph field onto upstream
//! calls.
//!
//! Root fields issue a direct fetch keyed by a query argument or by the
//! caller's identity; derived fields are keyed by an attribute of their
//! already-resolved parent. Every resolver reads the per-query credential
//! from the request data, and an upstream failure degrades its own field to
//! null without disturbing sibling resolution. Independent siblings carry no
//! ordering constraints between them; the executor is free to run them
//! concurrently.

use async_graphql::{ComplexObject, Context, EmptyMutation, EmptySubscription, Object, Schema};
use tracing::warn;

use crate::client::{AuthToken, UpstreamClient};
use crate::error::{Error, Result};
use crate::types::{
    resolve_owner, ContentAnalyticsPage, ContentRevision, Me, Org, Owner, SearchAnalytics, Space,
    User,
};

/// Built gateway schema.
pub type GatewaySchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

/// Build the executable schema around one upstream client.
///
/// The client is shared by every query; the credential is not - it enters
/// per request via [`AuthToken`] in the request data.
pub fn build_schema(upstream: UpstreamClient) -> GatewaySchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(upstream)
        .finish()
}

fn upstream<'ctx>(ctx: &Context<'ctx>) -> async_graphql::Result<&'ctx UpstreamClient> {
    ctx.data::<UpstreamClient>()
}

/// The per-query credential, or an `UNAUTHENTICATED` field error when the
/// hosting layer supplied none.
fn auth_token<'ctx>(ctx: &Context<'ctx>) -> async_graphql::Result<&'ctx AuthToken> {
    ctx.data_opt::<AuthToken>().ok_or_else(|| {
        Error::Unauthorized("request carries no bearer credential".to_string()).to_field_error()
    })
}

/// Degrade an upstream failure to an absent node.
///
/// The failed field resolves to null and siblings keep resolving; the error
/// itself is only logged.
fn or_null<T>(field: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(field, error = %err, "field degraded to null after upstream failure");
            None
        }
    }
}

/// Root query type.
///
/// Each field issues a direct upstream fetch keyed by an argument from the
/// query, or by the caller's own identity when no argument is declared.
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The caller's own identity.
    async fn me(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<Me>> {
        let api = upstream(ctx)?;
        let token = auth_token(ctx)?;
        Ok(or_null("me", api.current_user(token).await))
    }

    /// Organizations the caller belongs to.
    async fn my_orgs(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<Vec<Org>>> {
        let api = upstream(ctx)?;
        let token = auth_token(ctx)?;
        Ok(or_null("myOrgs", api.orgs(token).await))
    }

    /// Spaces owned by the caller.
    async fn my_spaces(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<Vec<Space>>> {
        let api = upstream(ctx)?;
        let token = auth_token(ctx)?;
        Ok(or_null("mySpaces", api.current_user_spaces(token).await))
    }

    /// A user addressed by identifier.
    async fn user(&self, ctx: &Context<'_>, uid: String) -> async_graphql::Result<Option<User>> {
        let api = upstream(ctx)?;
        let token = auth_token(ctx)?;
        let fetched = api
            .owner(&uid, token)
            .await
            .and_then(|value| serde_json::from_value::<User>(value).map_err(Error::from));
        Ok(or_null("user", fetched))
    }

    /// An organization addressed by identifier.
    async fn org(&self, ctx: &Context<'_>, uid: String) -> async_graphql::Result<Option<Org>> {
        let api = upstream(ctx)?;
        let token = auth_token(ctx)?;
        let fetched = api
            .owner(&uid, token)
            .await
            .and_then(|value| serde_json::from_value::<Org>(value).map_err(Error::from));
        Ok(or_null("org", fetched))
    }

    /// An owner addressed by identifier, resolved to its concrete variant
    /// strictly by the `kind` discriminant.
    async fn owner(&self, ctx: &Context<'_>, uid: String) -> async_graphql::Result<Option<Owner>> {
        let api = upstream(ctx)?;
        let token = auth_token(ctx)?;
        let fetched = api.owner(&uid, token).await.and_then(resolve_owner);
        Ok(or_null("owner", fetched))
    }

    /// Spaces owned by `ownerId`, or by the caller when omitted.
    async fn spaces(
        &self,
        ctx: &Context<'_>,
        owner_id: Option<String>,
    ) -> async_graphql::Result<Option<Vec<Space>>> {
        let api = upstream(ctx)?;
        let token = auth_token(ctx)?;
        let fetched = match owner_id.as_deref() {
            Some(owner_id) => api.owner_spaces(owner_id, token).await,
            None => api.current_user_spaces(token).await,
        };
        Ok(or_null("spaces", fetched))
    }

    /// A space addressed by identifier.
    async fn space(&self, ctx: &Context<'_>, uid: String) -> async_graphql::Result<Option<Space>> {
        let api = upstream(ctx)?;
        let token = auth_token(ctx)?;
        Ok(or_null("space", api.space(&uid, token).await))
    }
}

#[ComplexObject]
impl Me {
    /// Spaces owned by the caller.
    ///
    /// The caller's identity comes from the credential alone; an explicit
    /// `ownerId` cannot redirect the identity route.
    pub async fn spaces(
        &self,
        ctx: &Context<'_>,
        owner_id: Option<String>,
    ) -> async_graphql::Result<Option<Vec<Space>>> {
        let _ = owner_id;
        let api = upstream(ctx)?;
        let token = auth_token(ctx)?;
        Ok(or_null("Me.spaces", api.current_user_spaces(token).await))
    }

    /// Organizations the caller belongs to.
    pub async fn orgs(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<Vec<Org>>> {
        let api = upstream(ctx)?;
        let token = auth_token(ctx)?;
        Ok(or_null("Me.orgs", api.orgs(token).await))
    }
}

#[ComplexObject]
impl User {
    /// Spaces owned by this user.
    ///
    /// Keyed by the resolved user's own identifier; the identifier wins over
    /// a like-named argument when both exist.
    pub async fn spaces(
        &self,
        ctx: &Context<'_>,
        owner_id: Option<String>,
    ) -> async_graphql::Result<Option<Vec<Space>>> {
        let api = upstream(ctx)?;
        let token = auth_token(ctx)?;
        let Some(owner_id) = self.id.as_deref().or(owner_id.as_deref()) else {
            warn!("user node has no identifier to key a spaces fetch");
            return Ok(None);
        };
        Ok(or_null("User.spaces", api.owner_spaces(owner_id, token).await))
    }
}

#[ComplexObject]
impl Org {
    /// Spaces owned by this organization.
    ///
    /// Keyed by the resolved org's own identifier; the identifier wins over
    /// a like-named argument when both exist.
    pub async fn spaces(
        &self,
        ctx: &Context<'_>,
        owner_id: Option<String>,
    ) -> async_graphql::Result<Option<Vec<Space>>> {
        let api = upstream(ctx)?;
        let token = auth_token(ctx)?;
        let Some(owner_id) = self.id.as_deref().or(owner_id.as_deref()) else {
            warn!("org node has no identifier to key a spaces fetch");
            return Ok(None);
        };
        Ok(or_null("Org.spaces", api.owner_spaces(owner_id, token).await))
    }
}

#[ComplexObject]
impl Space {
    /// Per-page view and engagement metrics for this space.
    pub async fn content_analytics(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Option<Vec<ContentAnalyticsPage>>> {
        let api = upstream(ctx)?;
        let token = auth_token(ctx)?;
        let Some(space_id) = self.id.as_deref() else {
            return Ok(None);
        };
        Ok(or_null(
            "Space.contentAnalytics",
            api.space_content_analytics(space_id, token).await,
        ))
    }

    /// Aggregate and per-query search metrics for this space.
    pub async fn search_analytics(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Option<SearchAnalytics>> {
        let api = upstream(ctx)?;
        let token = auth_token(ctx)?;
        let Some(space_id) = self.id.as_deref() else {
            return Ok(None);
        };
        Ok(or_null(
            "Space.searchAnalytics",
            api.space_search_analytics(space_id, token).await,
        ))
    }

    /// The current revision of this space's document tree.
    pub async fn content(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Option<ContentRevision>> {
        let api = upstream(ctx)?;
        let token = auth_token(ctx)?;
        let Some(space_id) = self.id.as_deref() else {
            return Ok(None);
        };
        Ok(or_null("Space.content", api.space_content(space_id, token).await))
    }
}
