use clap::{builder::RangedU64ValueParser, value_parser, Arg, ArgAction, ArgMatches};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug)]
pub struct Options {
    pub input: Option<PathBuf>,
    pub chunk_size: usize,
    pub max_payload_len: usize,
    pub format: OutputFormat,
    pub summary: bool,
}

pub fn command() -> clap::Command {
    clap::Command::new("ubx-cli")
        .about("Decodes a UBX byte stream and prints one line per frame")
        .version(clap::crate_version!())
        .arg(
            Arg::new("input")
                .value_name("FILE")
                .short('i')
                .long("input")
                .required(false)
                .value_parser(value_parser!(PathBuf))
                .help("File to read, stdin when omitted"),
        )
        .arg(
            Arg::new("chunk-size")
                .value_name("N")
                .short('c')
                .long("chunk-size")
                .default_value("1024")
                .value_parser(RangedU64ValueParser::<usize>::new().range(1..))
                .help("Number of bytes handed to the decoder per read"),
        )
        .arg(
            Arg::new("max-payload")
                .value_name("N")
                .long("max-payload")
                .value_parser(value_parser!(usize))
                .help("Length fields above this value are reported as malformed [default: 8192]"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .default_value("text")
                .value_parser(["text", "json"])
                .help("Output format"),
        )
        .arg(
            Arg::new("summary")
                .long("summary")
                .action(ArgAction::SetTrue)
                .help("Print per-message counts once the input is exhausted"),
        )
}

impl Options {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let format = match matches.get_one::<String>("format").map(String::as_str) {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Text,
        };
        Self {
            input: matches.get_one::<PathBuf>("input").cloned(),
            chunk_size: matches.get_one::<usize>("chunk-size").copied().unwrap_or(1024),
            max_payload_len: matches
                .get_one::<usize>("max-payload")
                .copied()
                .unwrap_or(ubx_codec::MAX_PAYLOAD_LEN),
            format,
            summary: matches.get_flag("summary"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(args: &[&str]) -> Options {
        let matches = command().try_get_matches_from(args).unwrap();
        Options::from_matches(&matches)
    }

    #[test]
    fn defaults() {
        let opts = parse(&["ubx-cli"]);
        assert_eq!(opts.input, None);
        assert_eq!(opts.chunk_size, 1024);
        assert_eq!(opts.max_payload_len, ubx_codec::MAX_PAYLOAD_LEN);
        assert_eq!(opts.format, OutputFormat::Text);
        assert!(!opts.summary);
    }

    #[test]
    fn all_flags() {
        let opts = parse(&[
            "ubx-cli",
            "--input",
            "log.ubx",
            "--chunk-size",
            "7",
            "--max-payload",
            "512",
            "--format",
            "json",
            "--summary",
        ]);
        assert_eq!(opts.input, Some(PathBuf::from("log.ubx")));
        assert_eq!(opts.chunk_size, 7);
        assert_eq!(opts.max_payload_len, 512);
        assert_eq!(opts.format, OutputFormat::Json);
        assert!(opts.summary);
    }

    #[test]
    fn zero_chunk_size_rejected() {
        assert!(command()
            .try_get_matches_from(["ubx-cli", "--chunk-size", "0"])
            .is_err());
    }

    #[test]
    fn command_is_consistent() {
        command().debug_assert();
    }
}
