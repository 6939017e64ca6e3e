// Application and cluster upgrade commands

use super::acknowledged;
use crate::client::CallOptions;
use crate::dispatch::command::{require_application_name, require_name};
use crate::dispatch::{AdminCommand, CommandFailure, CommandKind, CommandRequest, RemoteCall, TargetObject};
use crate::session::ClusterConnection;
use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;

/// Resume a monitored application upgrade in the next upgrade domain
#[derive(Debug, Clone)]
pub struct ResumeApplicationUpgrade {
    pub application_name: String,
    pub upgrade_domain: String,
    pub timeout: Option<Duration>,
}

impl AdminCommand for ResumeApplicationUpgrade {
    fn kind(&self) -> CommandKind {
        CommandKind::ResumeApplicationUpgrade
    }

    fn bind(&self) -> Result<CommandRequest, CommandFailure> {
        require_application_name(&self.application_name)?;
        require_name("upgrade_domain", &self.upgrade_domain)?;
        Ok(CommandRequest::new(
            self.kind(),
            TargetObject::Application(self.application_name.clone()),
        )
        .with_argument("application_name", self.application_name.clone())
        .with_argument("upgrade_domain", self.upgrade_domain.clone())
        .with_timeout(self.timeout))
    }

    fn call(&self, connection: Arc<ClusterConnection>, options: CallOptions) -> RemoteCall {
        let application_name = self.application_name.clone();
        let upgrade_domain = self.upgrade_domain.clone();
        let kind = self.kind();
        async move {
            connection
                .client()
                .move_next_upgrade_domain(&application_name, &upgrade_domain, options)
                .await?;
            Ok(acknowledged(kind, TargetObject::Application(application_name)))
        }
        .boxed()
    }
}

/// Roll back an in-progress application upgrade
#[derive(Debug, Clone)]
pub struct RollbackApplicationUpgrade {
    pub application_name: String,
    pub timeout: Option<Duration>,
}

impl AdminCommand for RollbackApplicationUpgrade {
    fn kind(&self) -> CommandKind {
        CommandKind::RollbackApplicationUpgrade
    }

    fn bind(&self) -> Result<CommandRequest, CommandFailure> {
        require_application_name(&self.application_name)?;
        Ok(CommandRequest::new(
            self.kind(),
            TargetObject::Application(self.application_name.clone()),
        )
        .with_argument("application_name", self.application_name.clone())
        .with_timeout(self.timeout))
    }

    fn call(&self, connection: Arc<ClusterConnection>, options: CallOptions) -> RemoteCall {
        let application_name = self.application_name.clone();
        let kind = self.kind();
        async move {
            connection
                .client()
                .rollback_application_upgrade(&application_name, options)
                .await?;
            Ok(acknowledged(kind, TargetObject::Application(application_name)))
        }
        .boxed()
    }
}

/// Roll back an in-progress cluster upgrade
#[derive(Debug, Clone, Default)]
pub struct RollbackClusterUpgrade {
    pub timeout: Option<Duration>,
}

impl AdminCommand for RollbackClusterUpgrade {
    fn kind(&self) -> CommandKind {
        CommandKind::RollbackClusterUpgrade
    }

    fn bind(&self) -> Result<CommandRequest, CommandFailure> {
        Ok(CommandRequest::new(self.kind(), TargetObject::Cluster).with_timeout(self.timeout))
    }

    fn call(&self, connection: Arc<ClusterConnection>, options: CallOptions) -> RemoteCall {
        let kind = self.kind();
        async move {
            connection.client().rollback_cluster_upgrade(options).await?;
            Ok(acknowledged(kind, TargetObject::Cluster))
        }
        .boxed()
    }
}
