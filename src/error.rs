#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("can't find {0}")]
    ProjectConfigNotFound(String),

    #[error("invalid project config at {path}: {source}")]
    InvalidProjectConfig {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("can't find function config for {0}")]
    FunctionConfigNotFound(String),

    #[error("invalid function config for {name}: {source}")]
    InvalidFunctionConfig {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("function {0} is missing x-api-gateway path or method")]
    InvalidGatewayMeta(String),

    #[error("invalid path override pattern `{pattern}`: {source}")]
    InvalidPathPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("duplicate route {method} {path}: declared by both {first} and {second}")]
    DuplicateRoute {
        path: String,
        method: String,
        first: String,
        second: String,
    },

    #[error("missing stage_name in project.json, pass --stage instead")]
    MissingStageName,

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum PrecedenceViolation {
    #[error("rest-api-id is already in project.json, use --force to override")]
    RestApiIdExists,

    #[error("missing rest-api-id, you might want to use the create command first")]
    RestApiIdMissing,
}

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("create rest api failed: {0}")]
    CreateRestApi(String),

    #[error("put rest api failed: {0}")]
    PutRestApi(String),

    #[error("create deployment failed: {0}")]
    CreateDeployment(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Precedence(#[from] PrecedenceViolation),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}
