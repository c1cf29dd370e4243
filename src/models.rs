use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 合并后的 paths 映射：path -> method -> operation 对象
pub type Paths = Map<String, Value>;

/// 项目配置（project.json）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(rename = "x-api-gateway")]
    pub gateway: GatewayConfig,
    /// 未识别的顶层键，保存时原样写回
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// project.json 中的 x-api-gateway 段
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GatewayConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_name: Option<String>,

    /// 远端 RestAPI id，存在即代表远端资源已创建
    #[serde(rename = "rest-api-id", skip_serializing_if = "Option::is_none")]
    pub rest_api_id: Option<String>,

    /// 全局 operation 模板，integration uri 中含 {{functionName}} 占位符
    #[serde(rename = "swagger-func-template", default, skip_serializing_if = "Value::is_null")]
    pub func_template: Value,

    /// 路径覆盖：正则模式 -> 部分 path 对象，按声明顺序生效
    #[serde(rename = "paths", default, skip_serializing_if = "Map::is_empty")]
    pub path_overrides: Map<String, Value>,

    #[serde(
        rename = "x-amazon-apigateway-request-validators",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_validators: Option<Value>,

    #[serde(
        rename = "x-amazon-apigateway-request-validator",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_request_validator: Option<Value>,

    #[serde(rename = "minimum-compression-size", skip_serializing_if = "Option::is_none")]
    pub minimum_compression_size: Option<u64>,

    #[serde(rename = "securityDefinitions", skip_serializing_if = "Option::is_none")]
    pub security_definitions: Option<Map<String, Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub definitions: Option<Map<String, Value>>,

    /// 未识别的键，保存时原样写回
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 函数配置（functions/<name>/function.json）
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FunctionConfig {
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "x-api-gateway")]
    pub gateway: Option<GatewayMeta>,
}

/// 函数的网关元数据，path 和 method 缺一不可
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GatewayMeta {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub parameters: Vec<Value>,
    #[serde(default)]
    pub security: Vec<Value>,
}

/// 组装完成的 Swagger 2.0 文档
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SwaggerDocument {
    pub swagger: String,
    pub info: SwaggerInfo,

    #[serde(rename = "basePath", skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,

    pub schemes: Vec<String>,

    #[serde(
        rename = "x-amazon-apigateway-request-validators",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_validators: Option<Value>,

    #[serde(
        rename = "x-amazon-apigateway-request-validator",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_request_validator: Option<Value>,

    #[serde(
        rename = "x-amazon-apigateway-minimum-compression-size",
        skip_serializing_if = "Option::is_none"
    )]
    pub minimum_compression_size: Option<u64>,

    pub paths: Paths,

    #[serde(rename = "securityDefinitions")]
    pub security_definitions: Map<String, Value>,

    pub definitions: Map<String, Value>,
}

/// 文档级元数据，version 为组装时刻的时间戳
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SwaggerInfo {
    pub version: String,
    pub title: String,
}
