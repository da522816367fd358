use std::time::SystemTime;

// ============================================================================
// UTILITY FUNCTIONS
// ============================================================================

pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if size >= TB {
        format!("{:.2} TB", size as f64 / TB as f64)
    } else if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} B", size)
    }
}

pub fn format_modified_time(time: Option<SystemTime>) -> String {
    time.map(|t| {
        let datetime = chrono::DateTime::<chrono::Local>::from(t);
        datetime.format("%b %d, %Y %H:%M").to_string()
    })
    .unwrap_or_else(|| "Unknown".to_string())
}

/// Dot-files are hidden on every platform this engine targets.
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}
