mod overlay;
mod scenes;

use kiln_engine::engine::EngineBuilder;
use kiln_engine::logging::{LoggingConfig, init_logging};

use overlay::EditorOverlay;
use scenes::{LevelEditorInitializer, LevelInitializer};

fn main() {
    init_logging(LoggingConfig::default());

    // Index 0 is the editor scene, index 1 the play scene.
    let result = EngineBuilder::new()
        .title("Kiln Studio")
        .scene(|| Box::new(LevelEditorInitializer::new()))
        .scene(|| Box::new(LevelInitializer::new()))
        .overlay(EditorOverlay::new())
        .run();

    if let Err(e) = result {
        log::error!("kiln studio failed: {e:#}");
        std::process::exit(1);
    }
}
