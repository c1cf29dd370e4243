pub mod merge;
pub mod swagger;

use crate::error::{ConfigError, Result};
use crate::models::{Paths, ProjectConfig, SwaggerDocument};
use crate::storage::Workspace;

use self::merge::PathOverride;

/// 网关中心：project.json 加一组预编译的路径覆盖规则。
/// 构造后只读，函数配置在每次合并时重新读取。
pub struct GatewayCenter {
    workspace: Workspace,
    project: ProjectConfig,
    overrides: Vec<PathOverride>,
}

impl GatewayCenter {
    /// 加载 project.json 并预编译覆盖规则，任一失败立即返回
    pub fn new(workspace: Workspace) -> Result<Self> {
        let project = workspace.load_project()?;
        let overrides = merge::compile_overrides(&project.gateway)?;
        Ok(Self {
            workspace,
            project,
            overrides,
        })
    }

    pub fn project(&self) -> &ProjectConfig {
        &self.project
    }

    /// 记录远端分配的 RestAPI id 并写回 project.json
    pub fn record_rest_api_id(&mut self, id: String) -> Result<()> {
        self.project.gateway.rest_api_id = Some(id);
        self.workspace.save_project(&self.project)
    }

    /// 合并全部函数：逐个 merge_function，按 path 补缺累积。
    /// 两个函数声明同一 (path, method) 直接报错，不做静默取舍。
    pub fn merge_all(&self, alias: Option<&str>) -> Result<Paths> {
        let mut paths = Paths::new();
        // (path, method, 函数名)，用于重复路由检测
        let mut declared: Vec<(String, String, String)> = Vec::new();

        for name in self.workspace.list_function_names()? {
            let func = self.workspace.load_function(&name)?;
            let (path, method, path_item) =
                merge::merge_function(&name, &func, &self.project, &self.overrides, alias)?;

            if let Some((_, _, first)) = declared
                .iter()
                .find(|(p, m, _)| *p == path && *m == method)
            {
                return Err(ConfigError::DuplicateRoute {
                    path,
                    method,
                    first: first.clone(),
                    second: name,
                });
            }
            declared.push((path.clone(), method.clone(), name.clone()));

            match paths.get_mut(&path) {
                // 同一路径的不同 method：已有条目优先，缺的键补进去
                Some(existing) => merge::defaults_deep(existing, &path_item),
                None => {
                    paths.insert(path, path_item);
                }
            }
        }

        Ok(paths)
    }

    /// 组装完整的 Swagger 文档
    pub fn build_document(&self, alias: Option<&str>) -> Result<SwaggerDocument> {
        let paths = self.merge_all(alias)?;
        Ok(swagger::assemble(&self.project, paths))
    }
}
