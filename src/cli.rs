use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::core::GatewayCenter;
use crate::error::{AppError, ConfigError, PrecedenceViolation};
use crate::models::Paths;
use crate::publish::{AwsGateway, GatewayPublisher};
use crate::storage::Workspace;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Assemble and deploy Swagger definitions to AWS API Gateway",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new RestAPI on AWS API Gateway
    Create {
        name: String,
        description: Option<String>,
        /// The ID of the RestAPI that you want to clone from
        #[arg(short, long)]
        clone: Option<String>,
        /// Force creation, overriding the existing rest-api-id
        #[arg(short, long)]
        force: bool,
    },
    /// Deploy the RestAPI with the merged Swagger definitions
    Deploy {
        /// Stage name, defaults to stage_name from project.json
        #[arg(short, long)]
        stage: Option<String>,
        /// Deployment alias appended to every integration target
        #[arg(short, long)]
        alias: Option<String>,
        /// Print the Swagger document instead of publishing
        #[arg(short = 'o', long)]
        stdout: bool,
    },
    /// List the merged API routes
    List,
}

/// 命令分发。远端客户端只在真正要发请求的分支里构造。
pub async fn run(cli: Cli) -> Result<(), AppError> {
    let workspace = Workspace::current()?;

    match cli.command {
        Commands::Create {
            name,
            description,
            clone,
            force,
        } => {
            let mut center = GatewayCenter::new(workspace)?;
            let publisher = AwsGateway::from_env().await;
            create(
                &mut center,
                &publisher,
                &name,
                description.as_deref(),
                clone.as_deref(),
                force,
            )
            .await
        }
        Commands::Deploy {
            stage,
            alias,
            stdout,
        } => {
            let center = GatewayCenter::new(workspace)?;
            if stdout {
                print_document(&center, alias.as_deref())
            } else {
                let publisher = AwsGateway::from_env().await;
                deploy(&center, &publisher, stage.as_deref(), alias.as_deref()).await
            }
        }
        Commands::List => {
            let center = GatewayCenter::new(workspace)?;
            list(&center)
        }
    }
}

/// create 命令：前置检查在任何远端调用之前完成。
/// rest-api-id 已存在时只有 --force 才继续。
pub async fn create<P: GatewayPublisher>(
    center: &mut GatewayCenter,
    publisher: &P,
    name: &str,
    description: Option<&str>,
    clone_from: Option<&str>,
    force: bool,
) -> Result<(), AppError> {
    if !force && center.project().gateway.rest_api_id.is_some() {
        return Err(PrecedenceViolation::RestApiIdExists.into());
    }

    let id = publisher.create_rest_api(name, description, clone_from).await?;
    center.record_rest_api_id(id)?;
    println!("Create success! Now you can push your RestAPI.");
    Ok(())
}

/// deploy 命令：推送合并后的 Swagger 定义并部署到 stage
pub async fn deploy<P: GatewayPublisher>(
    center: &GatewayCenter,
    publisher: &P,
    stage: Option<&str>,
    alias: Option<&str>,
) -> Result<(), AppError> {
    let rest_api_id = require_rest_api_id(center)?;
    let stage = match stage.or(center.project().gateway.stage_name.as_deref()) {
        Some(stage) => stage.to_string(),
        None => return Err(ConfigError::MissingStageName.into()),
    };

    println!("Loading Swagger...");
    let document = center.build_document(alias)?;

    println!("Pushing REST API...");
    publisher.put_rest_api(&rest_api_id, &document).await?;
    println!("Updated API with success!");

    println!("Deploying REST API...");
    publisher.create_deployment(&rest_api_id, &stage).await?;
    println!("API deployed successfully!");
    Ok(())
}

/// deploy --stdout：构建文档并原样打印，不触发任何远端调用
pub fn print_document(center: &GatewayCenter, alias: Option<&str>) -> Result<(), AppError> {
    require_rest_api_id(center)?;
    let document = center.build_document(alias)?;
    let json = serde_json::to_string_pretty(&document).map_err(ConfigError::from)?;
    println!("{}", json);
    Ok(())
}

/// list 命令：打印合并后的路由表
pub fn list(center: &GatewayCenter) -> Result<(), AppError> {
    let paths = center.merge_all(None)?;
    print_routes(&paths);
    Ok(())
}

fn require_rest_api_id(center: &GatewayCenter) -> Result<String, AppError> {
    match &center.project().gateway.rest_api_id {
        Some(id) => Ok(id.clone()),
        None => Err(PrecedenceViolation::RestApiIdMissing.into()),
    }
}

/// 三列对齐输出：summary / METHOD PATH / description
fn print_routes(paths: &Paths) {
    println!("{:<25} {:<35} {}", "Name", "PATH", "Description");
    for (path, item) in paths {
        let methods = match item.as_object() {
            Some(m) => m,
            None => continue,
        };
        for (method, operation) in methods {
            let summary = operation
                .get("summary")
                .and_then(Value::as_str)
                .unwrap_or("");
            let description = operation
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("");
            let route = format!("{} {}", method.to_uppercase(), path);
            println!("{:<25} {:<35} {}", summary, route, description);
        }
    }
}
