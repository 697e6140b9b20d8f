//! Lists the elements of an eSIM profile.
//!
//! The profile is read from a file either in binary form or as hex text.
//! For each element, one line with its index, offset, tag, kind, and
//! length is printed. With `--check`, the profile is also encoded again
//! and compared to the input, and every element is encoded from its
//! decoded value and decoded again to see whether the value survives.
//!
//! Warnings about clamped records and unknown elements are printed to
//! stderr. Use `-v` to also see debug messages and `-vv` for a line per
//! decoded element.

use std::{fs, io, process};
use std::path::PathBuf;
use bytes::Bytes;
use clap::{ArgAction, Parser};
use tracing_subscriber::filter::LevelFilter;
use saip::{Captured, Profile, ProfileElement};


//------------ Args ----------------------------------------------------------

/// Lists the elements of an eSIM profile.
#[derive(Debug, Parser)]
#[command(name = "saipdump", version, about, long_about = None)]
struct Args {
    /// The file contains hex text instead of binary data.
    ///
    /// White space in the text is ignored.
    #[arg(long)]
    hex: bool,

    /// Check that the profile survives re-encoding.
    #[arg(long)]
    check: bool,

    /// Print more log messages.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// The file to read the profile from.
    file: PathBuf,
}

impl Args {
    /// Returns the most verbose log level to print.
    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    /// Reads the profile data from the file.
    fn read(&self) -> Result<Bytes, String> {
        let data = fs::read(&self.file).map_err(|err| {
            format!("{}: {}", self.file.display(), err)
        })?;
        if !self.hex {
            return Ok(data.into())
        }
        let text: Vec<u8> = data.into_iter().filter(|ch| {
            !ch.is_ascii_whitespace()
        }).collect();
        match hex::decode(text) {
            Ok(data) => Ok(data.into()),
            Err(err) => Err(format!("{}: {}", self.file.display(), err))
        }
    }
}


//------------ Checks --------------------------------------------------------

/// Checks that the profile re-encodes to `data`, then checks each element.
fn check(profile: &Profile, data: &Bytes) -> Result<(), String> {
    let encoded = profile.encode().map_err(|err| err.to_string())?;
    if encoded != data[..] {
        return Err("re-encoded profile differs from input".into())
    }

    let mut failed = 0;
    for (idx, element) in profile.iter().enumerate() {
        if let Err(err) = check_element(element) {
            eprintln!("element {}: {}", idx, err);
            failed += 1;
        }
    }
    if failed > 0 {
        return Err(format!(
            "{} of {} elements failed the check", failed, profile.len()
        ))
    }
    println!("ok: {} elements, {} octets", profile.len(), data.len());
    Ok(())
}

/// Checks that the value of an element survives encoding and decoding.
fn check_element(element: &ProfileElement) -> Result<(), String> {
    let mut encoded = Vec::new();
    element.value().append_encoded(
        &mut encoded
    ).map_err(|err| err.to_string())?;
    let decoded = Profile::decode(
        Bytes::from(encoded)
    ).map_err(|err| format!("cannot decode re-encoded value: {}", err))?;
    match decoded.elements() {
        [single] if single.value() == element.value() => Ok(()),
        _ => Err("value changed by re-encoding".into())
    }
}


//------------ main ----------------------------------------------------------

fn run(args: &Args) -> Result<(), String> {
    let data = args.read()?;
    let profile = Profile::decode(data.clone()).map_err(|err| {
        match err.element() {
            Some(idx) => {
                format!("{}: element {}: {}", args.file.display(), idx, err)
            }
            None => format!("{}: {}", args.file.display(), err)
        }
    })?;

    let mut offset = 0;
    for (idx, element) in profile.iter().enumerate() {
        let len = element.raw().map(Captured::len).unwrap_or_default();
        println!(
            "{:4} {:8} [{:2}] {:22} {}",
            idx, offset, element.tag(), element.kind(), len
        );
        offset += len;
    }

    if args.check {
        check(&profile, &data)?;
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(args.log_level())
        .try_init();
    if let Err(err) = run(&args) {
        eprintln!("{}", err);
        process::exit(1);
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn log_levels() {
        let args = Args::parse_from(["saipdump", "profile.der"]);
        assert_eq!(args.log_level(), LevelFilter::WARN);
        assert!(!args.hex);

        let args = Args::parse_from(["saipdump", "-v", "profile.der"]);
        assert_eq!(args.log_level(), LevelFilter::DEBUG);

        let args = Args::parse_from(["saipdump", "-vv", "--hex", "p.txt"]);
        assert_eq!(args.log_level(), LevelFilter::TRACE);
        assert!(args.hex);
    }
}
