//! Entity types projected from upstream REST resources.
//!
//! Pure declaration: serde gives each entity its upstream JSON shape,
//! async-graphql its graph shape. Upstream payloads spell identifiers
//! either `id` or `uid` depending on API revision, so deserialization
//! accepts both while the graph exposes `id`. Derived fields (the ones that
//! issue their own upstream fetches) live in the resolver layer in
//! [`crate::schema`].

use async_graphql::{Interface, SimpleObject};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

/// Polymorphic identity capability shared by the caller, users, and orgs.
///
/// A closed variant set: concrete selection is driven by
/// [`resolve_owner`] for generically-addressed owners, while [`Me`] is only
/// ever produced by the identity route.
#[derive(Clone, Interface)]
#[graphql(
    field(name = "id", ty = "&Option<String>"),
    field(name = "kind", ty = "&Option<String>"),
    field(
        name = "spaces",
        ty = "Option<Vec<Space>>",
        arg(name = "owner_id", ty = "Option<String>")
    )
)]
pub enum Owner {
    Me(Me),
    User(User),
    Org(Org),
}

/// The caller's own identity, resolved from the credential alone.
#[derive(Debug, Clone, Deserialize, SimpleObject)]
#[graphql(complex)]
#[serde(rename_all = "camelCase")]
pub struct Me {
    #[serde(alias = "uid")]
    pub id: Option<String>,
    pub kind: Option<String>,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    #[graphql(name = "photoURL")]
    pub photo_url: Option<String>,
}

/// A generically-addressed user.
#[derive(Debug, Clone, Deserialize, SimpleObject)]
#[graphql(complex)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "uid")]
    pub id: Option<String>,
    pub kind: Option<String>,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    #[graphql(name = "photoURL")]
    pub photo_url: Option<String>,
}

/// An organization.
#[derive(Debug, Clone, Deserialize, SimpleObject)]
#[graphql(complex)]
#[serde(rename_all = "camelCase")]
pub struct Org {
    #[serde(alias = "uid")]
    pub id: Option<String>,
    pub kind: Option<String>,
    pub title: Option<String>,
}

/// A content container belonging to exactly one owner.
#[derive(Debug, Clone, Deserialize, SimpleObject)]
#[graphql(complex)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    #[serde(alias = "uid")]
    pub id: Option<String>,
    #[serde(alias = "name")]
    pub title: Option<String>,
    pub path: Option<String>,
    pub visibility: Option<String>,
}

/// Per-page view and engagement metrics for a space.
#[derive(Debug, Clone, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalyticsPage {
    #[serde(alias = "uid")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub page_views: Option<i64>,
    pub unique_visitors: Option<i64>,
    pub time_on_page: Option<i64>,
    pub feedback: Option<PageFeedback>,
}

/// Aggregated reader feedback for one page, absent when none was recorded.
#[derive(Debug, Clone, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct PageFeedback {
    pub total: Option<i64>,
    pub score: Option<f64>,
}

/// Aggregate and per-query search metrics for a space.
#[derive(Debug, Clone, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct SearchAnalytics {
    pub searches: Option<i64>,
    #[serde(default)]
    pub queries: Vec<SearchAnalyticsQuery>,
}

/// One recorded search query and its outcome.
#[derive(Debug, Clone, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct SearchAnalyticsQuery {
    pub query: Option<String>,
    pub searches: Option<i64>,
    pub hits: Option<i64>,
}

/// A snapshot of a space's document tree.
#[derive(Debug, Clone, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct ContentRevision {
    #[serde(alias = "uid")]
    pub id: Option<String>,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// One variant of a revision's content, rooted at a page tree.
#[derive(Debug, Clone, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    #[serde(alias = "uid")]
    pub id: Option<String>,
    #[serde(rename = "ref")]
    #[graphql(name = "ref")]
    pub reference: Option<String>,
    pub title: Option<String>,
    pub page: Option<Page>,
}

/// A node in a document tree.
///
/// The upstream delivers the whole tree in one payload; `pages` nests
/// recursively and is passed through unchanged, never re-fetched per level.
#[derive(Debug, Clone, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(alias = "uid")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub path: Option<String>,
    pub kind: Option<String>,
    #[serde(default)]
    pub pages: Vec<Page>,
}

/// A binary asset attached to a revision.
#[derive(Debug, Clone, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(alias = "uid")]
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "downloadURL")]
    #[graphql(name = "downloadURL")]
    pub download_url: Option<String>,
    pub content_type: Option<String>,
}

/// Select the concrete variant for a generically-addressed owner payload.
///
/// The `kind` discriminant is the sole authority: `"user"` and `"org"` map
/// to their variants, anything else (or a missing discriminant) fails
/// resolution rather than guessing. [`Me`] is never produced here - the
/// caller's own identity comes only from the identity route.
pub fn resolve_owner(value: JsonValue) -> Result<Owner> {
    match value.get("kind").and_then(JsonValue::as_str) {
        Some("user") => Ok(Owner::User(serde_json::from_value(value)?)),
        Some("org") => Ok(Owner::Org(serde_json::from_value(value)?)),
        Some(other) => Err(Error::TypeResolution(format!(
            "unrecognized owner kind `{other}`"
        ))),
        None => Err(Error::TypeResolution(
            "owner payload carries no `kind` discriminant".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_owner_user() {
        let owner = resolve_owner(json!({
            "id": "u_1",
            "kind": "user",
            "displayName": "Ada",
        }))
        .expect("user resolves");
        match owner {
            Owner::User(user) => {
                assert_eq!(user.id.as_deref(), Some("u_1"));
                assert_eq!(user.display_name.as_deref(), Some("Ada"));
            }
            _ => panic!("expected a User variant"),
        }
    }

    #[test]
    fn test_resolve_owner_org() {
        let owner = resolve_owner(json!({
            "uid": "o_1",
            "kind": "org",
            "title": "Acme",
        }))
        .expect("org resolves");
        match owner {
            Owner::Org(org) => {
                assert_eq!(org.id.as_deref(), Some("o_1"));
                assert_eq!(org.title.as_deref(), Some("Acme"));
            }
            _ => panic!("expected an Org variant"),
        }
    }

    #[test]
    fn test_resolve_owner_unknown_kind_fails_closed() {
        let result = resolve_owner(json!({"id": "b_1", "kind": "bot"}));
        assert!(matches!(result, Err(Error::TypeResolution(_))));
    }

    #[test]
    fn test_resolve_owner_missing_kind_fails_closed() {
        let result = resolve_owner(json!({"id": "u_1"}));
        assert!(matches!(result, Err(Error::TypeResolution(_))));
    }

    #[test]
    fn test_space_accepts_both_identifier_spellings() {
        let earlier: Space = serde_json::from_value(json!({
            "uid": "sp_1",
            "name": "Docs",
            "private": true,
        }))
        .unwrap();
        assert_eq!(earlier.id.as_deref(), Some("sp_1"));
        assert_eq!(earlier.title.as_deref(), Some("Docs"));

        let later: Space = serde_json::from_value(json!({
            "id": "sp_2",
            "title": "Handbook",
            "visibility": "public",
        }))
        .unwrap();
        assert_eq!(later.id.as_deref(), Some("sp_2"));
        assert_eq!(later.visibility.as_deref(), Some("public"));
    }

    #[test]
    fn test_page_tree_deserializes_recursively() {
        let page: Page = serde_json::from_value(json!({
            "id": "p_root",
            "title": "Root",
            "kind": "sheet",
            "pages": [
                {"id": "p_child", "title": "Child", "pages": [
                    {"id": "p_leaf", "title": "Leaf"}
                ]}
            ]
        }))
        .unwrap();
        assert_eq!(page.pages.len(), 1);
        assert_eq!(page.pages[0].pages[0].id.as_deref(), Some("p_leaf"));
    }

    #[test]
    fn test_content_revision_defaults_empty_collections() {
        let revision: ContentRevision = serde_json::from_value(json!({"id": "rev_1"})).unwrap();
        assert!(revision.parents.is_empty());
        assert!(revision.variants.is_empty());
        assert!(revision.assets.is_empty());
    }

    #[test]
    fn test_asset_field_spellings() {
        let asset: Asset = serde_json::from_value(json!({
            "uid": "a_1",
            "name": "diagram.png",
            "downloadURL": "https://cdn.example.com/a_1",
            "contentType": "image/png",
        }))
        .unwrap();
        assert_eq!(asset.id.as_deref(), Some("a_1"));
        assert_eq!(asset.download_url.as_deref(), Some("https://cdn.example.com/a_1"));
        assert_eq!(asset.content_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_variant_ref_spelling() {
        let variant: Variant = serde_json::from_value(json!({
            "uid": "v_1",
            "ref": "main",
            "title": "Primary",
        }))
        .unwrap();
        assert_eq!(variant.reference.as_deref(), Some("main"));
    }

    #[test]
    fn test_search_analytics_defaults_empty_queries() {
        let analytics: SearchAnalytics = serde_json::from_value(json!({"searches": 12})).unwrap();
        assert_eq!(analytics.searches, Some(12));
        assert!(analytics.queries.is_empty());
    }
}
