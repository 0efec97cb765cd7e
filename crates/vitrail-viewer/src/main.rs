mod app;
mod scene;

use vitrail_engine::logging::{init_logging, LoggingConfig};
use vitrail_engine::window::{Runtime, RuntimeConfig};

use app::Viewer;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "vitrail: weighted-blended OIT".to_string(),
        ..Default::default()
    };
    Runtime::run(config, Viewer::default())
}
