use std::path::PathBuf;

use clap::Parser;

use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "trackfs")]
#[command(about = "Store files through a tracker and its storage nodes")]
pub struct Args {
    /// Path to the trackfs directory (defaults to ~/.trackfs)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: crate::Command,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "trackfs",
            "url",
            "group1/M00/00/00/a.jpg",
            "--config-path",
            "/tmp/trackfs",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.config_path, Some(PathBuf::from("/tmp/trackfs")));
        assert_eq!(args.log_level, LevelFilter::DEBUG);
        assert!(matches!(args.command, crate::Command::Url(_)));
    }

    #[test]
    fn test_reject_malformed_reference() {
        assert!(Args::try_parse_from(["trackfs", "stat", "no-slash"]).is_err());
    }
}
