//! Support desk issues and comments.

use serde_json::{Map, Value, json};

use super::{CREATED, WaldurClient};
use crate::endpoints::Endpoint;
use crate::error::Result;
use crate::models::Resource;
use crate::query::Query;

impl WaldurClient {
    /// Opens an issue; `extra` carries optional fields such as `description`.
    pub async fn create_support_issue(
        &self,
        summary: &str,
        issue_type: &str,
        caller_url: &str,
        remote_id: &str,
        extra: Map<String, Value>,
    ) -> Result<Resource> {
        let mut payload = json!({
            "summary": summary,
            "type": issue_type,
            "caller": caller_url,
            "remote_id": remote_id,
        });
        merge(&mut payload, extra);
        self.create(Endpoint::SupportIssues, &payload, CREATED)
            .await
    }

    pub async fn list_support_issues(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::SupportIssues, filters).await
    }

    pub async fn list_support_comments(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::SupportComments, filters).await
    }

    pub async fn create_support_comment(
        &self,
        issue_uuid: &str,
        description: &str,
        remote_id: &str,
        extra: Map<String, Value>,
    ) -> Result<Resource> {
        let mut payload = json!({ "description": description, "remote_id": remote_id });
        merge(&mut payload, extra);
        self.action_with_status(
            Endpoint::SupportIssues,
            issue_uuid,
            "comment",
            CREATED,
            Some(&payload),
        )
        .await
    }
}

fn merge(payload: &mut Value, extra: Map<String, Value>) {
    if let Value::Object(fields) = payload {
        fields.extend(extra);
    }
}
