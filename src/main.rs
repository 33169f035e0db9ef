mod cli;

use cli::{CliConfig, CliError};
use culler_core::{
    count_files, inspect, print_summary, progress, sweep, write_entropy_log, write_hash_log,
    write_json, ScanConfig, ScanResult, ThumbnailWriter,
};
use indicatif::ProgressBar;
use std::path::Path;

fn main() {
    let config = CliConfig::from_env().unwrap_or_else(|err| match err {
        CliError::Help => {
            println!("{}", err);
            std::process::exit(0);
        }
        _ => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    });

    let scan_config = ScanConfig::new(config.root.clone())
        .with_expected_mode(config.mode.clone())
        .with_side_length(config.side_length)
        .with_entropy_check(config.check_entropy, config.entropy_threshold)
        .with_hash_check(config.check_hash, config.hash)
        .with_soft_hash(config.soft_hash, config.soft_hash_threshold);

    let progress_bar = ProgressBar::new(count_files(&config.root));
    progress_bar.set_style(progress::default_style());
    let result = inspect(&scan_config, &progress_bar);
    progress_bar.finish_with_message("Inspection complete");

    print_summary(&result);

    if let Some(aux_dir) = config.aux_dir.as_deref() {
        if let Err(error) = std::fs::create_dir_all(aux_dir) {
            eprintln!("Error creating {}: {}", aux_dir.display(), error);
        } else {
            write_reports(&result, &config, aux_dir);
        }
    }

    let sweep_bar = ProgressBar::new(result.offending_files() as u64);
    sweep_bar.set_style(progress::default_style());
    let stats = sweep(&result, &config.root, config.action, &sweep_bar);
    sweep_bar.finish_with_message("Sweep complete");

    println!("{} offending files handled ({})", stats.swept, config.action);
    for failure in &stats.failures {
        eprintln!("{}", failure);
    }
}

fn write_reports(result: &ScanResult, config: &CliConfig, aux_dir: &Path) {
    match write_entropy_log(result, aux_dir) {
        Ok(path) => println!("Entropy log written to {}", path.display()),
        Err(error) => eprintln!("Error writing entropy log: {}", error),
    }
    match write_hash_log(result, aux_dir) {
        Ok(path) => println!("Hash log written to {}", path.display()),
        Err(error) => eprintln!("Error writing hash log: {}", error),
    }
    let json_path = aux_dir.join("report.json");
    match write_json(result, &json_path) {
        Ok(()) => println!("Report written to {}", json_path.display()),
        Err(error) => eprintln!("Error writing report: {}", error),
    }

    if config.create_thumbnails {
        write_thumbnails(result, config, aux_dir);
    }
}

fn write_thumbnails(result: &ScanResult, config: &CliConfig, aux_dir: &Path) {
    let writer = match ThumbnailWriter::new(aux_dir.to_path_buf(), config.thumbnail_size) {
        Ok(writer) => writer,
        Err(error) => {
            eprintln!("Error preparing thumbnail directories: {}", error);
            return;
        }
    };

    for (filename, record) in &result.records {
        let Some(entropy) = record.entropy else {
            continue;
        };
        if entropy >= config.entropy_threshold {
            continue;
        }
        let source = config.root.join(filename);
        if let Err(error) = writer.write_low_entropy(&source, filename, entropy) {
            eprintln!("Thumbnail error: {}", error);
        }
    }

    for cluster in result.duplicate_clusters() {
        if let Err(error) = writer.write_cluster_grid(&config.root, cluster) {
            eprintln!("Thumbnail error: {}", error);
        }
    }
}
