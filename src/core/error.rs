use thiserror::Error;

#[derive(Error, Debug)]
pub enum RolePlayError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("No active session")]
    NoActiveSession,

    #[error("A session is already active")]
    SessionActive,

    #[error("A reply is already being generated for this session")]
    ReplyInProgress,
}

#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Gateway error payload: {0}")]
    Application(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Persona not found: {0}")]
    PersonaNotFound(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file error: {0}")]
    File(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Cache file error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
