use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Buckets above this never come due within the `u64` day range.
pub const MAX_RETIRED_BUCKET: u32 = 64;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "leitner",
    version,
    about = "Leitner flashcard trainer (HTTP API / terminal practice)"
)]
pub struct Cli {
    /// Seed deck (.csv or .json); the built-in sample deck is used when omitted
    #[arg(long, env = "LEITNER_CARDS")]
    pub cards: Option<PathBuf>,

    /// Highest bucket number; cards that reach it are retired
    #[arg(
        long,
        env = "LEITNER_RETIRED_BUCKET",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..=MAX_RETIRED_BUCKET as i64)
    )]
    pub retired_bucket: u32,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Launch the HTTP API
    Serve(ServeCmd),
    /// Practice in the terminal, one day at a time
    Practice(PracticeCmd),
}

#[derive(Debug, Args, Clone)]
pub struct ServeCmd {
    /// Bind address (host:port)
    #[arg(long, env = "LEITNER_ADDR", default_value = "127.0.0.1:3001")]
    pub addr: String,
}

#[derive(Debug, Args, Clone)]
pub struct PracticeCmd {
    /// Number of days to simulate
    #[arg(long, default_value_t = 7)]
    pub days: u64,
    /// Only practice cards carrying this tag
    #[arg(long)]
    pub tag: Option<String>,
    /// Only practice cards whose text contains this (case-insensitive)
    #[arg(long)]
    pub query: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serve_defaults() {
        let cli = Cli::try_parse_from(["leitner", "serve"]).unwrap();
        assert_eq!(cli.retired_bucket, 1);
        assert!(cli.cards.is_none());
        match cli.cmd {
            Command::Serve(s) => assert_eq!(s.addr, "127.0.0.1:3001"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn retired_bucket_is_bounded() {
        assert!(Cli::try_parse_from(["leitner", "--retired-bucket", "0", "serve"]).is_err());
        assert!(Cli::try_parse_from(["leitner", "--retired-bucket", "65", "serve"]).is_err());
        assert!(
            Cli::try_parse_from(["leitner", "--retired-bucket", "4000000000", "serve"]).is_err()
        );
        let cli = Cli::try_parse_from(["leitner", "--retired-bucket", "64", "serve"]).unwrap();
        assert_eq!(cli.retired_bucket, MAX_RETIRED_BUCKET);
    }

    #[test]
    fn parses_practice_options() {
        let cli = Cli::try_parse_from([
            "leitner",
            "--retired-bucket",
            "4",
            "practice",
            "--days",
            "3",
            "--tag",
            "math",
            "--query",
            "cube",
        ])
        .unwrap();
        assert_eq!(cli.retired_bucket, 4);
        match cli.cmd {
            Command::Practice(p) => {
                assert_eq!(p.days, 3);
                assert_eq!(p.tag.as_deref(), Some("math"));
                assert_eq!(p.query.as_deref(), Some("cube"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
