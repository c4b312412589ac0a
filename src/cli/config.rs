use crate::config::generate::generate_starter_config;
use std::fs;
use std::path::PathBuf;

pub fn init(stdout: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_content = generate_starter_config();

    if stdout {
        print!("{}", config_content);
        return Ok(());
    }

    // Prefer the per-user location, fall back to the system one
    let mut candidates = crate::config::default_config_paths().into_iter();
    let mut config_path = candidates
        .next()
        .unwrap_or_else(|| PathBuf::from("/etc/tailpoll/config.yml"));

    if let Some(parent) = config_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Warning: Could not create directory {}: {}", parent.display(), e);
            if let Some(fallback) = candidates.next() {
                eprintln!("Falling back to {}", fallback.display());
                config_path = fallback;
            }
        }
    }

    if config_path.exists() {
        eprintln!(
            "Error: Config file already exists at {}",
            config_path.display()
        );
        eprintln!("Remove it first or use --stdout to print the config");
        std::process::exit(1);
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&config_path, config_content)?;

    println!("Config file written to {}", config_path.display());
    Ok(())
}

pub fn validate(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path.ok_or("No config file found. Use --config to specify a path.")?;

    println!("Validating config file: {}", path.display());

    match crate::config::load_config(&path) {
        Ok(config) => {
            for (name, section) in [("node_log", &config.node_log), ("slow_http", &config.slow_http)] {
                match section {
                    Some(section) if section.logdir.is_empty() => {
                        println!("! {}: no usable logdir, runs will fail", name)
                    }
                    Some(section) => println!("✓ {}: {} directories", name, section.logdir.len()),
                    None => println!("- {}: not configured", name),
                }
            }
            println!("✓ Config is valid");
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Config validation failed:\n{}", e);
            std::process::exit(1);
        }
    }
}
