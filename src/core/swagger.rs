use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use crate::models::{Paths, ProjectConfig, SwaggerDocument, SwaggerInfo};

/// 将合并后的 paths 包装为完整的 Swagger 2.0 文档。
/// version 取组装时刻的 UTC 时间戳，每次组装都不同。
pub fn assemble(project: &ProjectConfig, paths: Paths) -> SwaggerDocument {
    let gateway = &project.gateway;
    SwaggerDocument {
        swagger: "2.0".to_string(),
        info: SwaggerInfo {
            version: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            title: project.name.clone(),
        },
        base_path: gateway.base_path.clone(),
        schemes: vec!["https".to_string()],
        request_validators: gateway.request_validators.clone(),
        default_request_validator: gateway.default_request_validator.clone(),
        minimum_compression_size: gateway.minimum_compression_size,
        paths,
        security_definitions: gateway
            .security_definitions
            .clone()
            .unwrap_or_else(default_security_definitions),
        definitions: gateway.definitions.clone().unwrap_or_else(default_definitions),
    }
}

/// 缺省安全定义：单个放在请求头里的 api key 方案
fn default_security_definitions() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(
        "api_key".to_string(),
        json!({
            "type": "apiKey",
            "name": "x-api-key",
            "in": "header"
        }),
    );
    map
}

/// 缺省模型定义：一个空对象模型
fn default_definitions() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("Empty".to_string(), json!({"type": "object"}));
    map
}
