use regex::Regex;
use serde_json::{json, Map, Value};

use crate::error::{ConfigError, Result};
use crate::models::{FunctionConfig, GatewayConfig, ProjectConfig};

/// 编译后的路径覆盖规则
#[derive(Debug, Clone)]
pub struct PathOverride {
    pub pattern: Regex,
    pub value: Value,
}

/// 按声明顺序编译 paths 覆盖规则，模式整体锚定（^...$）。
/// 非法正则在这里立即失败，而不是拖到匹配时。
pub fn compile_overrides(gateway: &GatewayConfig) -> Result<Vec<PathOverride>> {
    gateway
        .path_overrides
        .iter()
        .map(|(pattern, value)| {
            let anchored = format!("^{}$", pattern);
            let compiled =
                Regex::new(&anchored).map_err(|source| ConfigError::InvalidPathPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
            Ok(PathOverride {
                pattern: compiled,
                value: value.clone(),
            })
        })
        .collect()
}

/// 递归补缺合并：target 已有的键永不被覆盖，缺失的键从 defaults 填充。
/// 嵌套对象逐键递归；数组不合并，target 的非空数组优先；
/// 类型不一致时保留 target。
pub fn defaults_deep(target: &mut Value, defaults: &Value) {
    match (target, defaults) {
        (Value::Object(target), Value::Object(defaults)) => {
            for (key, default) in defaults {
                match target.get_mut(key) {
                    Some(existing) => defaults_deep(existing, default),
                    None => {
                        target.insert(key.clone(), default.clone());
                    }
                }
            }
        }
        (Value::Array(target), Value::Array(defaults)) => {
            if target.is_empty() && !defaults.is_empty() {
                *target = defaults.clone();
            }
        }
        _ => {}
    }
}

/// 单个函数的合并：函数种子 > 匹配的路径覆盖 > 全局模板。
/// 返回 (path, method, path 对象)，path 对象形如 {method: operation}，
/// 覆盖规则可以在其中补出兄弟 method（例如 CORS 的 options）。
pub fn merge_function(
    name: &str,
    func: &FunctionConfig,
    project: &ProjectConfig,
    overrides: &[PathOverride],
    alias: Option<&str>,
) -> Result<(String, String, Value)> {
    let meta = func
        .gateway
        .as_ref()
        .ok_or_else(|| ConfigError::InvalidGatewayMeta(name.to_string()))?;

    let template = &project.gateway.func_template;
    let mut operation = json!({
        "summary": func.summary.clone().unwrap_or_else(|| name.to_string()),
        "description": func.description.clone().unwrap_or_default(),
        "x-amazon-apigateway-integration": {
            "httpMethod": "post",
            "uri": integration_uri(template, &project.name, name, alias),
        },
        "parameters": meta.parameters.clone(),
        "security": meta.security.clone(),
    });
    defaults_deep(&mut operation, template);

    let mut methods = Map::new();
    methods.insert(meta.method.clone(), operation);
    let mut path_item = Value::Object(methods);

    // 覆盖按声明顺序套用，同一个键先到先得
    for rule in overrides {
        if rule.pattern.is_match(&meta.path) {
            defaults_deep(&mut path_item, &rule.value);
        }
    }

    Ok((meta.path.clone(), meta.method.clone(), path_item))
}

/// 将模板 integration uri 中的 {{functionName}} 替换为部署目标名，
/// 带别名时为 <project>_<name>:<alias>
fn integration_uri(template: &Value, project: &str, name: &str, alias: Option<&str>) -> String {
    let uri = template
        .pointer("/x-amazon-apigateway-integration/uri")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let target = match alias {
        Some(alias) => format!("{}_{}:{}", project, name, alias),
        None => format!("{}_{}", project, name),
    };
    uri.replace("{{functionName}}", &target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GatewayMeta;
    use proptest::prelude::*;

    fn project_with(gateway: GatewayConfig) -> ProjectConfig {
        ProjectConfig {
            name: "svc".to_string(),
            gateway,
            extra: Map::new(),
        }
    }

    fn func_with(meta: GatewayMeta) -> FunctionConfig {
        FunctionConfig {
            summary: None,
            description: None,
            gateway: Some(meta),
        }
    }

    // ---- defaults_deep ----

    #[test]
    fn test_defaults_fill_missing_keys() {
        let mut target = json!({"a": 1});
        defaults_deep(&mut target, &json!({"a": 9, "b": 2}));
        assert_eq!(target, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_defaults_recursive_merge() {
        let mut target = json!({"outer": {"kept": "mine"}});
        defaults_deep(
            &mut target,
            &json!({"outer": {"kept": "theirs", "added": true}, "top": 1}),
        );
        assert_eq!(
            target,
            json!({"outer": {"kept": "mine", "added": true}, "top": 1})
        );
    }

    #[test]
    fn test_defaults_arrays_not_merged() {
        let mut target = json!({"list": [1, 2]});
        defaults_deep(&mut target, &json!({"list": [3, 4, 5]}));
        assert_eq!(target, json!({"list": [1, 2]}));
    }

    #[test]
    fn test_defaults_empty_array_filled() {
        let mut target = json!({"list": []});
        defaults_deep(&mut target, &json!({"list": [3]}));
        assert_eq!(target, json!({"list": [3]}));
    }

    #[test]
    fn test_defaults_type_conflict_keeps_target() {
        let mut target = json!({"k": "scalar"});
        defaults_deep(&mut target, &json!({"k": {"nested": true}}));
        assert_eq!(target, json!({"k": "scalar"}));
    }

    // ---- 性质测试 ----

    /// 生成小型 JSON 树
    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-z]{0,6}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,3}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    /// merged 必须原样保留 target 已有的值
    fn preserves_target(target: &Value, merged: &Value) -> bool {
        match (target, merged) {
            (Value::Object(t), Value::Object(m)) => t
                .iter()
                .all(|(k, tv)| m.get(k).map_or(false, |mv| preserves_target(tv, mv))),
            (Value::Array(t), _) => t.is_empty() || target == merged,
            _ => target == merged,
        }
    }

    proptest! {
        #[test]
        fn prop_existing_keys_never_overwritten(target in arb_json(), defaults in arb_json()) {
            let mut merged = target.clone();
            defaults_deep(&mut merged, &defaults);
            prop_assert!(preserves_target(&target, &merged));
        }

        #[test]
        fn prop_merge_idempotent(target in arb_json(), defaults in arb_json()) {
            let mut once = target.clone();
            defaults_deep(&mut once, &defaults);
            let mut twice = once.clone();
            defaults_deep(&mut twice, &defaults);
            prop_assert_eq!(once, twice);
        }

        /// 模板独有的键总会出现在结果里
        #[test]
        fn prop_defaults_fill(defaults in arb_json()) {
            let mut merged = json!({});
            defaults_deep(&mut merged, &defaults);
            if defaults.is_object() {
                prop_assert_eq!(merged, defaults);
            } else {
                prop_assert_eq!(merged, json!({}));
            }
        }
    }

    // ---- compile_overrides ----

    #[test]
    fn test_compile_overrides_order() {
        let mut path_overrides = Map::new();
        path_overrides.insert("/users/.*".to_string(), json!({"a": 1}));
        path_overrides.insert("/users/\\d+".to_string(), json!({"b": 2}));

        let gateway = GatewayConfig {
            path_overrides,
            ..Default::default()
        };
        let overrides = compile_overrides(&gateway).unwrap();
        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides[0].value, json!({"a": 1}));
        assert_eq!(overrides[1].value, json!({"b": 2}));
    }

    #[test]
    fn test_compile_overrides_anchored() {
        let mut path_overrides = Map::new();
        path_overrides.insert("/users/.*".to_string(), json!({}));

        let gateway = GatewayConfig {
            path_overrides,
            ..Default::default()
        };
        let overrides = compile_overrides(&gateway).unwrap();
        assert!(overrides[0].pattern.is_match("/users/123"));
        // 锚定全匹配，前后缀都不算
        assert!(!overrides[0].pattern.is_match("/api/users/123"));
        assert!(!overrides[0].pattern.is_match("/accounts/123"));
    }

    #[test]
    fn test_compile_overrides_invalid_pattern() {
        let mut path_overrides = Map::new();
        path_overrides.insert("/users/(".to_string(), json!({}));

        let gateway = GatewayConfig {
            path_overrides,
            ..Default::default()
        };
        let err = compile_overrides(&gateway).unwrap_err();
        match err {
            ConfigError::InvalidPathPattern { pattern, .. } => {
                assert_eq!(pattern, "/users/(");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    // ---- merge_function ----

    fn template_gateway() -> GatewayConfig {
        GatewayConfig {
            func_template: json!({
                "consumes": ["application/json"],
                "produces": ["application/json"],
                "responses": {"200": {"description": "ok"}},
                "x-amazon-apigateway-integration": {
                    "uri": "arn:aws:apigateway:lambda/{{functionName}}/invocations",
                    "type": "aws_proxy",
                    "passthroughBehavior": "when_no_match"
                }
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_function_seed_wins_over_template() {
        let project = project_with(GatewayConfig {
            func_template: json!({
                "summary": "from template",
                "x-amazon-apigateway-integration": {
                    "httpMethod": "get",
                    "uri": "arn:{{functionName}}"
                }
            }),
            ..Default::default()
        });
        let func = FunctionConfig {
            summary: Some("mine".to_string()),
            description: None,
            gateway: Some(GatewayMeta {
                path: "/hello".to_string(),
                method: "get".to_string(),
                ..Default::default()
            }),
        };

        let (path, method, item) = merge_function("hello", &func, &project, &[], None).unwrap();
        assert_eq!(path, "/hello");
        assert_eq!(method, "get");
        let op = &item["get"];
        assert_eq!(op["summary"], json!("mine"));
        // integration 的 httpMethod 固定为 post，模板值填不进来
        assert_eq!(op["x-amazon-apigateway-integration"]["httpMethod"], json!("post"));
        assert_eq!(
            op["x-amazon-apigateway-integration"]["uri"],
            json!("arn:svc_hello")
        );
    }

    #[test]
    fn test_merge_function_defaults_from_template() {
        let project = project_with(template_gateway());
        let func = func_with(GatewayMeta {
            path: "/ping".to_string(),
            method: "get".to_string(),
            ..Default::default()
        });

        let (_, _, item) = merge_function("ping", &func, &project, &[], None).unwrap();
        let op = &item["get"];
        // 模板独有的键全部补进来
        assert_eq!(op["consumes"], json!(["application/json"]));
        assert_eq!(op["responses"]["200"]["description"], json!("ok"));
        assert_eq!(
            op["x-amazon-apigateway-integration"]["type"],
            json!("aws_proxy")
        );
        // summary 缺省为函数名，description 为空串
        assert_eq!(op["summary"], json!("ping"));
        assert_eq!(op["description"], json!(""));
    }

    #[test]
    fn test_merge_function_alias_substitution() {
        let project = project_with(template_gateway());
        let func = func_with(GatewayMeta {
            path: "/hello".to_string(),
            method: "get".to_string(),
            ..Default::default()
        });

        let (_, _, item) = merge_function("hello", &func, &project, &[], Some("prod")).unwrap();
        assert_eq!(
            item["get"]["x-amazon-apigateway-integration"]["uri"],
            json!("arn:aws:apigateway:lambda/svc_hello:prod/invocations")
        );

        let (_, _, item) = merge_function("hello", &func, &project, &[], None).unwrap();
        assert_eq!(
            item["get"]["x-amazon-apigateway-integration"]["uri"],
            json!("arn:aws:apigateway:lambda/svc_hello/invocations")
        );
    }

    #[test]
    fn test_merge_function_override_applies_to_matching_path() {
        let mut path_overrides = Map::new();
        path_overrides.insert(
            "/users/.*".to_string(),
            json!({"options": {"summary": "cors"}}),
        );
        let mut gateway = template_gateway();
        gateway.path_overrides = path_overrides;
        let project = project_with(gateway);

        let overrides = compile_overrides(&project.gateway).unwrap();
        let matching = func_with(GatewayMeta {
            path: "/users/123".to_string(),
            method: "get".to_string(),
            ..Default::default()
        });
        let (_, _, item) =
            merge_function("get_user", &matching, &project, &overrides, None).unwrap();
        assert_eq!(item["options"]["summary"], json!("cors"));

        let other = func_with(GatewayMeta {
            path: "/accounts/123".to_string(),
            method: "get".to_string(),
            ..Default::default()
        });
        let (_, _, item) = merge_function("get_account", &other, &project, &overrides, None).unwrap();
        assert!(item.get("options").is_none());
    }

    #[test]
    fn test_merge_function_seed_wins_over_override() {
        // 三层同键冲突：函数种子 > 覆盖 > 模板
        let mut path_overrides = Map::new();
        path_overrides.insert(
            "/hello".to_string(),
            json!({"get": {"summary": "from override"}}),
        );
        let project = project_with(GatewayConfig {
            func_template: json!({"summary": "from template"}),
            path_overrides,
            ..Default::default()
        });
        let overrides = compile_overrides(&project.gateway).unwrap();
        let func = FunctionConfig {
            summary: Some("from function".to_string()),
            description: None,
            gateway: Some(GatewayMeta {
                path: "/hello".to_string(),
                method: "get".to_string(),
                ..Default::default()
            }),
        };

        let (_, _, item) = merge_function("hello", &func, &project, &overrides, None).unwrap();
        assert_eq!(item["get"]["summary"], json!("from function"));
    }

    #[test]
    fn test_merge_function_first_matching_override_wins() {
        let mut path_overrides = Map::new();
        path_overrides.insert("/x".to_string(), json!({"get": {"tag": "first"}}));
        path_overrides.insert("/.*".to_string(), json!({"get": {"tag": "second", "extra": 1}}));
        let project = project_with(GatewayConfig {
            path_overrides,
            ..Default::default()
        });
        let overrides = compile_overrides(&project.gateway).unwrap();
        let func = func_with(GatewayMeta {
            path: "/x".to_string(),
            method: "post".to_string(),
            ..Default::default()
        });

        let (_, _, item) = merge_function("x", &func, &project, &overrides, None).unwrap();
        // 两条规则都命中：同键先到先得，其余键照常补齐
        assert_eq!(item["get"]["tag"], json!("first"));
        assert_eq!(item["get"]["extra"], json!(1));
    }

    #[test]
    fn test_merge_function_parameters_and_security() {
        let project = project_with(template_gateway());
        let func = func_with(GatewayMeta {
            path: "/users".to_string(),
            method: "post".to_string(),
            parameters: vec![json!({"name": "body", "in": "body"})],
            security: vec![json!({"api_key": []})],
        });

        let (_, _, item) = merge_function("create_user", &func, &project, &[], None).unwrap();
        let op = &item["post"];
        assert_eq!(op["parameters"], json!([{"name": "body", "in": "body"}]));
        assert_eq!(op["security"], json!([{"api_key": []}]));
    }
}
