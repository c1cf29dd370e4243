//! 远端网关端口及其 AWS 适配器。合并核心不直接触碰 AWS，
//! 命令层把组装好的文档交到这个边界上。

use async_trait::async_trait;
use aws_sdk_apigateway::error::DisplayErrorContext;
use aws_sdk_apigateway::primitives::Blob;
use aws_sdk_apigateway::types::PutMode;

use crate::error::RemoteError;
use crate::models::SwaggerDocument;

#[async_trait]
pub trait GatewayPublisher: Send + Sync {
    /// 创建 RestAPI，返回远端分配的 id
    async fn create_rest_api(
        &self,
        name: &str,
        description: Option<&str>,
        clone_from: Option<&str>,
    ) -> Result<String, RemoteError>;

    /// 以 overwrite 模式推送 Swagger 定义
    async fn put_rest_api(
        &self,
        rest_api_id: &str,
        document: &SwaggerDocument,
    ) -> Result<(), RemoteError>;

    /// 将当前定义部署到指定 stage
    async fn create_deployment(
        &self,
        rest_api_id: &str,
        stage_name: &str,
    ) -> Result<(), RemoteError>;
}

/// AWS API Gateway 适配器
pub struct AwsGateway {
    client: aws_sdk_apigateway::Client,
}

impl AwsGateway {
    /// 凭证和区域走 AWS 默认的 provider 链
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self {
            client: aws_sdk_apigateway::Client::new(&config),
        }
    }
}

#[async_trait]
impl GatewayPublisher for AwsGateway {
    async fn create_rest_api(
        &self,
        name: &str,
        description: Option<&str>,
        clone_from: Option<&str>,
    ) -> Result<String, RemoteError> {
        let mut request = self.client.create_rest_api().name(name);
        if let Some(description) = description {
            request = request.description(description);
        }
        if let Some(clone_from) = clone_from {
            request = request.clone_from(clone_from);
        }

        let output = request
            .send()
            .await
            .map_err(|e| RemoteError::CreateRestApi(DisplayErrorContext(&e).to_string()))?;
        output
            .id()
            .map(|id| id.to_string())
            .ok_or_else(|| RemoteError::CreateRestApi("response missing rest api id".to_string()))
    }

    async fn put_rest_api(
        &self,
        rest_api_id: &str,
        document: &SwaggerDocument,
    ) -> Result<(), RemoteError> {
        let body =
            serde_json::to_vec(document).map_err(|e| RemoteError::PutRestApi(e.to_string()))?;
        self.client
            .put_rest_api()
            .rest_api_id(rest_api_id)
            .mode(PutMode::Overwrite)
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| RemoteError::PutRestApi(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    async fn create_deployment(
        &self,
        rest_api_id: &str,
        stage_name: &str,
    ) -> Result<(), RemoteError> {
        self.client
            .create_deployment()
            .rest_api_id(rest_api_id)
            .stage_name(stage_name)
            .send()
            .await
            .map_err(|e| RemoteError::CreateDeployment(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }
}
