use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

/// Accept numeric or string identifiers and keep them as strings.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(deserialize_with = "id_string")]
    pub team_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeploymentType {
    Prod,
    Dev,
    Preview,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub name: String,
    pub deployment_type: DeploymentType,
    #[serde(deserialize_with = "id_string")]
    pub project_id: String,
    #[serde(default)]
    pub preview_identifier: Option<String>,
}

/// What a deployment-scoped client needs to authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentCredentials {
    pub deployment_name: String,
    pub url: String,
    pub admin_key: String,
}

/// Runnable function kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FunctionKind {
    Query,
    Mutation,
    Action,
}

/// Result of running a function on a deployment.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionOutcome {
    Success {
        value: serde_json::Value,
        log_lines: Vec<String>,
    },
    Failure {
        message: String,
        log_lines: Vec<String>,
    },
}

impl FunctionOutcome {
    pub fn log_lines(&self) -> &[String] {
        match self {
            Self::Success { log_lines, .. } | Self::Failure { log_lines, .. } => log_lines,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// One page of table documents.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPage {
    pub page: Vec<serde_json::Value>,
    pub is_done: bool,
    pub continue_cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn numeric_ids_become_strings() {
        let team: Team =
            serde_json::from_str(r#"{"id": 42, "name": "Acme", "slug": "acme"}"#).unwrap();
        assert_eq!(team.id, "42");
        let project: Project = serde_json::from_str(
            r#"{"id": "7", "name": "Chat", "slug": "chat", "teamId": 42}"#,
        )
        .unwrap();
        assert_eq!(project.team_id, "42");
    }

    #[test]
    fn function_kind_parses_case_insensitively() {
        assert_eq!(FunctionKind::from_str("Mutation").unwrap(), FunctionKind::Mutation);
        assert_eq!(FunctionKind::Action.to_string(), "action");
        assert!(FunctionKind::from_str("cron").is_err());
    }
}
