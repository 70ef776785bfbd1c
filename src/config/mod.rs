pub mod paths;
pub mod timing_config;
pub mod utils_config;

pub use paths::ProjectPaths;
pub use timing_config::TimingConfig;
pub use utils_config::{ConfigLoadError, LoggingConfig, UtilsConfig, APP_NAME};
