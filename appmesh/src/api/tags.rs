//! Tag API: list, tag and untag by resource ARN

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use super::common::{ApiQueryParams, API_VERSION_PATH};
use super::error::ApiError;
use super::Client;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListTagsResponse {
    #[serde(default)]
    tags: Vec<TagRef>,
    next_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct TagResourceRequest<'a> {
    tags: &'a [TagRef],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UntagResourceRequest<'a> {
    tag_keys: &'a [String],
}

pub struct TagsApi<'a> {
    client: &'a Client,
}

impl<'a> TagsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /v20190125/tags, following `nextToken` until exhausted
    pub async fn list(&self, resource_arn: &str) -> Result<Vec<TagRef>, ApiError> {
        let path = format!("{}/tags", API_VERSION_PATH);
        let mut tags = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let params = ApiQueryParams::new()
                .add("resourceArn", resource_arn)
                .add_optional("nextToken", next_token.as_deref());
            let page: ListTagsResponse = self.client.get(&path, &params).await?;
            tags.extend(page.tags);

            match page.next_token.filter(|t| !t.is_empty()) {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        Ok(tags)
    }

    /// PUT /v20190125/tag
    pub async fn tag(&self, resource_arn: &str, tags: &[TagRef]) -> Result<(), ApiError> {
        let path = format!("{}/tag", API_VERSION_PATH);
        let params = ApiQueryParams::new().add("resourceArn", resource_arn);
        self.client
            .put::<IgnoredAny, _>(&path, &params, &TagResourceRequest { tags })
            .await
            .map(|_| ())
    }

    /// PUT /v20190125/untag
    pub async fn untag(&self, resource_arn: &str, keys: &[String]) -> Result<(), ApiError> {
        let path = format!("{}/untag", API_VERSION_PATH);
        let params = ApiQueryParams::new().add("resourceArn", resource_arn);
        self.client
            .put::<IgnoredAny, _>(&path, &params, &UntagResourceRequest { tag_keys: keys })
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_helpers::create_test_client;
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    const ARN: &str = "arn:aws:appmesh:us-west-2:123456789012:mesh/demo";

    #[tokio::test]
    async fn list_follows_pagination() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", "/v20190125/tags")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("resourceArn".to_string(), ARN.to_string()),
                Matcher::Regex("^resourceArn=[^&]*$".to_string()),
            ]))
            .with_status(200)
            .with_body(r#"{"tags":[{"key":"a","value":"1"}],"nextToken":"page2"}"#)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/v20190125/tags")
            .match_query(Matcher::UrlEncoded(
                "nextToken".to_string(),
                "page2".to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"tags":[{"key":"b","value":"2"}]}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let tags = client.tags().list(ARN).await.unwrap();

        assert_eq!(
            tags.iter().map(|t| t.key.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn untag_sends_keys() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/v20190125/untag")
            .match_query(Matcher::UrlEncoded("resourceArn".to_string(), ARN.to_string()))
            .match_body(Matcher::Json(json!({"tagKeys": ["b"]})))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        client.tags().untag(ARN, &["b".to_string()]).await.unwrap();
        mock.assert_async().await;
    }
}
