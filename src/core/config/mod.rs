pub mod paths;
pub mod service;
pub mod settings;
pub mod validation;

pub use paths::AppPaths;
pub use service::ConfigService;
pub use settings::{
    CohereSettings, IndexBackend, LlmSettings, LoggingSettings, NetworkSettings, PineconeSettings,
    RetrievalSettings, Secret, ServerSettings, Settings,
};
