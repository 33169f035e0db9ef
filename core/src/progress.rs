use indicatif::ProgressStyle;

/// Shared bar style for the inspect, report, and sweep phases.
pub fn default_style() -> ProgressStyle {
    match ProgressStyle::default_bar().template("{bar:40.green/white} {pos}/{len} {msg}") {
        Ok(style) => style.progress_chars("=>-"),
        Err(_) => ProgressStyle::default_bar(),
    }
}
