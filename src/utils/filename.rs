use chrono::{Datelike, Local};
use std::path::{Path, PathBuf};

/// Generate default output filename with format: wildfire-features-{YYMMDD}.{extension}
pub fn generate_default_output_filename(extension: &str) -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    let filename = format!(
        "wildfire-features-{:02}{:02}{:02}.{}",
        year, month, day, extension
    );
    PathBuf::from("output").join(filename)
}

/// Lower-cased extension of a path, if any
pub fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_output_filename() {
        let filename = generate_default_output_filename("parquet");
        let filename_str = filename.to_string_lossy();

        assert!(filename_str.starts_with("output/"));
        assert!(filename_str.ends_with(".parquet"));

        let parts: Vec<&str> = filename_str.split('/').collect();
        assert_eq!(parts.len(), 2);
        assert!(parts[1].starts_with("wildfire-features-"));
        // wildfire-features-YYMMDD.parquet
        assert_eq!(parts[1].len(), "wildfire-features-".len() + 6 + ".parquet".len());
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension(Path::new("out/batch.CSV")), Some("csv".to_string()));
        assert_eq!(file_extension(Path::new("out/batch.parquet")), Some("parquet".to_string()));
        assert_eq!(file_extension(Path::new("out/batch")), None);
    }
}
