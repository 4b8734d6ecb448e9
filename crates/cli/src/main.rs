//! deploy-notify: compile and send a deployment-status Slack message.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use deploy_notify::config::Config;
use deploy_notify::pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("deploy_notify=info".parse()?)
                .add_directive("notify=info".parse()?)
                .add_directive("scm=info".parse()?),
        )
        .init();

    let config = Config::parse();
    pipeline::run(config).await
}
