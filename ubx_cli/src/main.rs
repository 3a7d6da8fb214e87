use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{self, BufWriter, ErrorKind, Read, Write},
};
use ubx_codec::{Decoder, MessageRegistry};

mod cli;
mod output;

use cli::Options;
use output::{render_event, Summary};

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_env("RUST_LOG")
        .init();

    let matches = cli::command().get_matches();
    let opts = Options::from_matches(&matches);
    log::debug!("{:?}", opts);

    let reader: Box<dyn Read> = match &opts.input {
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        ),
        None => Box::new(io::stdin().lock()),
    };
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let summary = run(reader, &mut out, &opts)?;
    if opts.summary {
        writeln!(out, "{}", summary.render(opts.format))?;
    }
    out.flush()?;
    Ok(())
}

fn run<R: Read, W: Write>(mut reader: R, out: &mut W, opts: &Options) -> Result<Summary> {
    let mut decoder = Decoder::with_registry(MessageRegistry::builtin())
        .with_max_payload_len(opts.max_payload_len);
    let mut buffer = vec![0u8; opts.chunk_size];
    let mut summary = Summary::default();

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).context("failed to read input"),
        };
        let mut it = decoder.consume(&buffer[..bytes_read]);
        while let Some(event) = it.next() {
            summary.record(&event);
            writeln!(out, "{}", render_event(&event, opts.format))?;
        }
    }

    let leftover = decoder.scanner().buffer_len();
    if leftover > 0 {
        log::warn!("input ended inside a frame, {} bytes left undecoded", leftover);
    }
    Ok(summary)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cli::OutputFormat;
    use ubx_codec::encode_frame;

    #[test]
    fn run_small_chunks() {
        let mut input = Vec::new();
        for n in 0..5u8 {
            input.extend(encode_frame(0x05, 0x01, &[0x06, n]).unwrap());
        }
        input.extend_from_slice(&[0xb5, 0x62, 0x05]);

        let opts = Options {
            input: None,
            chunk_size: 3,
            max_payload_len: 64,
            format: OutputFormat::Text,
            summary: true,
        };
        let mut out = Vec::new();
        let summary = run(input.as_slice(), &mut out, &opts).unwrap();
        assert_eq!(summary.total(), 5);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 5);
        assert!(text.lines().all(|l| l.starts_with("ACK-ACK")));
    }
}
