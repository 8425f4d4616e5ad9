use std::path::PathBuf;

/// Spark configuration directory (~/.spark)
pub fn spark_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join(".spark")
}

/// Path of the user level config.json
pub fn config_json_path() -> PathBuf {
    spark_dir().join("config.json")
}
