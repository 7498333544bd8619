// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::{self, OpenOptions};
use std::path::Path;

/// Installs the global file logger. The terminal belongs to the UI, so
/// nothing is ever logged to stdout or stderr.
pub fn init(level: LevelFilter, path: &Path) -> Result<()> {
    if level == LevelFilter::Off {
        return Ok(());
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let config = ConfigBuilder::new().set_time_format_rfc3339().build();
    WriteLogger::init(level, config, file).context("install logger")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::init;
    use anyhow::Result;
    use simplelog::LevelFilter;

    #[test]
    fn off_level_touches_nothing() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join("taskpane.log");
        init(LevelFilter::Off, &path)?;
        assert!(!path.exists());
        assert!(!temp.path().join("nested").exists());
        Ok(())
    }

    #[test]
    fn writes_records_to_file_in_new_directory() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("logs").join("taskpane.log");
        init(LevelFilter::Info, &path)?;

        log::info!("logger smoke test");
        log::debug!("filtered out");
        log::logger().flush();

        let contents = std::fs::read_to_string(&path)?;
        assert!(contents.contains("logger smoke test"), "got {contents}");
        assert!(!contents.contains("filtered out"));
        Ok(())
    }
}
