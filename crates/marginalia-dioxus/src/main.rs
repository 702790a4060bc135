use dioxus::prelude::*;
use marginalia_config::Config;
use marginalia_engine::store;
use std::env;
use std::path::PathBuf;
use std::process;

mod ui;

use ui::App;

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("marginalia starting up");

    // Determine posts path from CLI args or config file
    let config_path = Config::config_path();
    let args: Vec<String> = env::args().collect();

    let posts_path;
    let from_config;

    if args.len() == 2 {
        posts_path = PathBuf::from(&args[1]);
        from_config = false;
        log::info!("Using posts path from CLI argument: {}", posts_path.display());
    } else if args.len() == 1 {
        match Config::load() {
            Ok(Some(config)) => {
                posts_path = config.posts_path.clone();
                from_config = true;
                log::info!("Loaded posts path from config: {}", posts_path.display());
                // Later reads (site title in the sidebar) use the accessor.
                let _ = config.install();
            }
            Ok(None) => {
                eprintln!("Error: No posts path provided and no config file found");
                eprintln!("Usage: {} <posts-folder-path>", args[0]);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
            Err(e) => {
                log::error!("Config::load() failed with error: {e}");
                eprintln!("Error: Failed to load config file: {e}");
                eprintln!("Usage: {} <posts-folder-path>", args[0]);
                process::exit(1);
            }
        }
    } else {
        eprintln!("Usage: {} [posts-folder-path]", args[0]);
        process::exit(1);
    };

    // Validate posts directory using the engine
    if let Err(e) = store::validate_posts_dir(&posts_path) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Posts path '{}'{} is invalid: {e}",
            posts_path.display(),
            source
        );
        process::exit(1);
    }

    dioxus::LaunchBuilder::desktop()
        .with_cfg(make_window_config())
        .launch(app_root);
}

fn app_root() -> Element {
    // Launch closures take no arguments; recover the posts path the same way
    // main resolved it.
    let posts_path = if env::args().count() == 2 {
        let args: Vec<String> = env::args().collect();
        PathBuf::from(&args[1])
    } else {
        Config::global()
            .map(|config| config.posts_path.clone())
            .or_else(|| Config::load().ok().flatten().map(|c| c.posts_path))
            .unwrap_or_default()
    };

    rsx! {
        App { posts_path }
    }
}

fn make_window_config() -> dioxus::desktop::Config {
    use dioxus::desktop::{Config, WindowBuilder};

    let window = WindowBuilder::new()
        .with_title("Marginalia")
        .with_always_on_top(false);

    Config::default().with_window(window)
}
