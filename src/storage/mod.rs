use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::models::{FunctionConfig, ProjectConfig};

/// 工作区：以一个目录为根的 project.json + functions/ 文件树。
/// 每次调用都重新读文件，不做缓存。
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// 以进程当前目录为根
    pub fn current() -> Result<Self> {
        Ok(Self {
            root: std::env::current_dir()?,
        })
    }

    pub fn project_path(&self) -> PathBuf {
        self.root.join("project.json")
    }

    /// 读取并解析 project.json
    pub fn load_project(&self) -> Result<ProjectConfig> {
        let path = self.project_path();
        if !path.exists() {
            return Err(ConfigError::ProjectConfigNotFound(
                path.display().to_string(),
            ));
        }
        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|source| ConfigError::InvalidProjectConfig {
            path: path.display().to_string(),
            source,
        })
    }

    /// 将项目配置格式化写回 project.json
    pub fn save_project(&self, project: &ProjectConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(project)?;
        std::fs::write(self.project_path(), json)?;
        Ok(())
    }

    /// 枚举 functions/ 下的函数子目录，过滤系统和编辑器的垃圾条目。
    /// 顺序为目录遍历顺序，不保证跨平台稳定。
    pub fn list_function_names(&self) -> Result<Vec<String>> {
        let dir = self.root.join("functions");
        let mut names = Vec::new();

        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = match entry.file_name().into_string() {
                Ok(n) => n,
                Err(_) => continue,
            };
            if is_junk(&name) {
                tracing::warn!("跳过垃圾条目：functions/{}", name);
                continue;
            }
            names.push(name);
        }

        Ok(names)
    }

    /// 读取并校验单个函数配置。
    /// 校验失败立即报错，绝不部分加载。
    pub fn load_function(&self, name: &str) -> Result<FunctionConfig> {
        let path = self
            .root
            .join("functions")
            .join(name)
            .join("function.json");
        if !path.exists() {
            return Err(ConfigError::FunctionConfigNotFound(name.to_string()));
        }
        let content = std::fs::read_to_string(&path)?;
        let func: FunctionConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::InvalidFunctionConfig {
                name: name.to_string(),
                source,
            })?;

        // path 和 method 缺一不可
        let valid = func
            .gateway
            .as_ref()
            .map(|meta| !meta.path.is_empty() && !meta.method.is_empty())
            .unwrap_or(false);
        if !valid {
            return Err(ConfigError::InvalidGatewayMeta(name.to_string()));
        }

        Ok(func)
    }
}

/// 隐藏文件、备份文件和常见系统垃圾
fn is_junk(name: &str) -> bool {
    name.starts_with('.')
        || name.ends_with('~')
        || name == "Thumbs.db"
        || name == "Desktop.ini"
}
