// Requests, payloads and results of command executions

use crate::client::{ConnectionDescriptor, NetworkDescription, NetworkNode, NodeConfiguration, Timestamp};
use crate::dispatch::descriptor::CommandKind;
use crate::dispatch::error::CommandFailure;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Object a command acts on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "name")]
pub enum TargetObject {
    Cluster,
    Node(String),
    Application(String),
    Network(String),
    Partition(Uuid),
    Service(String),
}

impl fmt::Display for TargetObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetObject::Cluster => f.write_str("cluster"),
            TargetObject::Node(name) => write!(f, "node {}", name),
            TargetObject::Application(name) => write!(f, "application {}", name),
            TargetObject::Network(name) => write!(f, "network {}", name),
            TargetObject::Partition(id) => write!(f, "partition {}", id),
            TargetObject::Service(name) => write!(f, "service {}", name),
        }
    }
}

/// One bound invocation of a command
///
/// Consumed by the invoker so the same request cannot be issued twice.
#[derive(Debug, Serialize)]
pub struct CommandRequest {
    request_id: Uuid,
    kind: CommandKind,
    target: TargetObject,
    arguments: BTreeMap<String, Value>,
    #[serde(skip)]
    timeout: Option<Duration>,
    created_at: Timestamp,
}

impl CommandRequest {
    pub fn new(kind: CommandKind, target: TargetObject) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            kind,
            target,
            arguments: BTreeMap::new(),
            timeout: None,
            created_at: chrono::Utc::now(),
        }
    }

    /// Add a named argument
    pub fn with_argument(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.to_string(), value.into());
        self
    }

    /// Set the operator-supplied timeout
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn target(&self) -> &TargetObject {
        &self.target
    }

    pub fn arguments(&self) -> &BTreeMap<String, Value> {
        &self.arguments
    }

    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

/// Confirmation returned by commands whose remote call has no result body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Acknowledgement {
    pub command: String,
    pub target: TargetObject,
}

/// Command-specific success payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Connection(ConnectionDescriptor),
    NodeConfiguration(NodeConfiguration),
    Text(String),
    Network(NetworkDescription),
    Networks(Vec<NetworkDescription>),
    NetworkNodes(Vec<NetworkNode>),
    Acknowledged(Acknowledgement),
}

/// Value produced by a completed remote call
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    Payload(Payload),
    /// Nothing to return; the warning explains why
    Empty { warning: String },
}

impl CallOutcome {
    pub fn empty(warning: impl Into<String>) -> Self {
        Self::Empty {
            warning: warning.into(),
        }
    }
}

impl From<Payload> for CallOutcome {
    fn from(payload: Payload) -> Self {
        Self::Payload(payload)
    }
}

/// Outcome of one invocation: exactly one of payload or failure
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    Succeeded(CallOutcome),
    Failed(CommandFailure),
}

impl CommandResult {
    pub fn failure(&self) -> Option<&CommandFailure> {
        match self {
            CommandResult::Failed(failure) => Some(failure),
            CommandResult::Succeeded(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_arguments_are_ordered() {
        let request = CommandRequest::new(
            CommandKind::InvokeInfrastructureQuery,
            TargetObject::Service("fabric:/InfraService".to_string()),
        )
        .with_argument("service_name", "fabric:/InfraService")
        .with_argument("command", "status")
        .with_timeout(Some(Duration::from_secs(30)));

        let names: Vec<&str> = request.arguments().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["command", "service_name"]);
        assert_eq!(request.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(request.argument("command"), Some(&Value::from("status")));
    }

    #[test]
    fn test_payload_serializes_untagged() {
        let payload = Payload::Text("ok".to_string());
        assert_eq!(serde_json::to_string(&payload).unwrap(), "\"ok\"");

        let ack = Payload::Acknowledged(Acknowledgement {
            command: "enable-node".to_string(),
            target: TargetObject::Node("_Node_0".to_string()),
        });
        let json = serde_json::to_value(&ack).unwrap();
        assert_eq!(json["target"]["type"], "Node");
        assert_eq!(json["target"]["name"], "_Node_0");
    }
}
