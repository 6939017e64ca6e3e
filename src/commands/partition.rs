// Partition commands

use super::acknowledged;
use crate::client::CallOptions;
use crate::dispatch::{AdminCommand, CommandFailure, CommandKind, CommandRequest, RemoteCall, TargetObject};
use crate::session::ClusterConnection;
use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Reset the reported load of a partition
#[derive(Debug, Clone)]
pub struct ResetPartitionLoad {
    pub partition_id: Uuid,
    pub timeout: Option<Duration>,
}

impl AdminCommand for ResetPartitionLoad {
    fn kind(&self) -> CommandKind {
        CommandKind::ResetPartitionLoad
    }

    fn bind(&self) -> Result<CommandRequest, CommandFailure> {
        if self.partition_id.is_nil() {
            return Err(CommandFailure::invalid_argument(
                "partition_id",
                "the nil partition id is not a partition",
            ));
        }
        Ok(
            CommandRequest::new(self.kind(), TargetObject::Partition(self.partition_id))
                .with_argument("partition_id", self.partition_id.to_string())
                .with_timeout(self.timeout),
        )
    }

    fn call(&self, connection: Arc<ClusterConnection>, options: CallOptions) -> RemoteCall {
        let partition_id = self.partition_id;
        let kind = self.kind();
        async move {
            connection.client().reset_partition_load(partition_id, options).await?;
            Ok(acknowledged(kind, TargetObject::Partition(partition_id)))
        }
        .boxed()
    }
}
