//! Command-line configuration

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use stamp_core::model::{DEFAULT_OPACITY, DEFAULT_STAMP_SIZE};
use stamp_core::Position;
use thiserror::Error;

/// Command-line arguments for pdfstamp
#[derive(Parser, Debug)]
#[command(name = "pdfstamp")]
#[command(version, about = "Stamp a signature image onto many PDF documents at once")]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stamp the signature onto the given PDF files
    Sign(SignArgs),
    /// Show page counts and page sizes
    Info(InfoArgs),
}

#[derive(Args, Debug)]
pub struct SignArgs {
    /// PDF files to sign
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Signature image (PNG or JPEG)
    #[arg(short, long, conflicts_with = "signature_uri")]
    pub signature: Option<PathBuf>,

    /// Signature as a data URI (data:image/png;base64,...)
    #[arg(long)]
    pub signature_uri: Option<String>,

    /// Stamp width in points
    #[arg(long, env = "PDFSTAMP_SIZE", default_value_t = DEFAULT_STAMP_SIZE)]
    pub size: f64,

    /// Stamp opacity between 0 and 1
    #[arg(long, env = "PDFSTAMP_OPACITY", default_value_t = DEFAULT_OPACITY)]
    pub opacity: f64,

    /// Position for every file without its own: x,y,page (top-left origin)
    #[arg(short, long)]
    pub position: Option<PositionArg>,

    /// Position for one file: NAME=x,y,page
    #[arg(long = "at", value_name = "NAME=X,Y,PAGE")]
    pub at: Vec<FilePosition>,

    /// Only sign the files with these names (default: all)
    #[arg(long = "only", value_name = "NAME")]
    pub only: Vec<String>,

    /// Save into this directory instead of the Downloads folder
    #[arg(short, long, env = "PDFSTAMP_OUT_DIR")]
    pub out_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// PDF files to inspect
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgError {
    #[error("expected x,y,page but got '{0}'")]
    BadPosition(String),

    #[error("expected NAME=x,y,page but got '{0}'")]
    BadFilePosition(String),
}

/// `x,y,page`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionArg(pub Position);

impl FromStr for PositionArg {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ArgError::BadPosition(s.to_string());
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [x, y, page] = parts.as_slice() else {
            return Err(bad());
        };
        let x: f64 = x.parse().map_err(|_| bad())?;
        let y: f64 = y.parse().map_err(|_| bad())?;
        let page: i64 = page.parse().map_err(|_| bad())?;
        if !x.is_finite() || !y.is_finite() {
            return Err(bad());
        }
        Ok(Self(Position::new(x, y, page)))
    }
}

/// `NAME=x,y,page`
#[derive(Debug, Clone, PartialEq)]
pub struct FilePosition {
    pub name: String,
    pub position: Position,
}

impl FromStr for FilePosition {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, pos) = s
            .rsplit_once('=')
            .ok_or_else(|| ArgError::BadFilePosition(s.to_string()))?;
        if name.trim().is_empty() {
            return Err(ArgError::BadFilePosition(s.to_string()));
        }
        let PositionArg(position) = pos
            .parse()
            .map_err(|_| ArgError::BadFilePosition(s.to_string()))?;
        Ok(Self {
            name: name.trim().to_string(),
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_parse_position() {
        let p: PositionArg = "100, 120.5, 2".parse().unwrap();
        assert_eq!(p.0, Position::new(100.0, 120.5, 2));
    }

    #[test]
    fn test_parse_position_rejects_garbage() {
        assert!("100,120".parse::<PositionArg>().is_err());
        assert!("a,b,c".parse::<PositionArg>().is_err());
        assert!("1,2,3,4".parse::<PositionArg>().is_err());
        assert!("inf,2,3".parse::<PositionArg>().is_err());
    }

    #[test]
    fn test_parse_file_position() {
        let fp: FilePosition = "my=file.pdf=10,20,-1".parse().unwrap();
        assert_eq!(fp.name, "my=file.pdf");
        assert_eq!(fp.position, Position::new(10.0, 20.0, -1));
    }

    #[test]
    fn test_parse_file_position_needs_name() {
        assert!("=1,2,3".parse::<FilePosition>().is_err());
        assert!("1,2,3".parse::<FilePosition>().is_err());
    }

    #[test]
    fn test_sign_defaults() {
        let cli = Cli::try_parse_from(["pdfstamp", "sign", "a.pdf", "-s", "sig.png"]).unwrap();
        let Command::Sign(args) = cli.command else {
            panic!("expected sign");
        };
        assert_eq!(args.files, vec![PathBuf::from("a.pdf")]);
        assert_eq!(args.size, DEFAULT_STAMP_SIZE);
        assert_eq!(args.opacity, DEFAULT_OPACITY);
        assert!(args.position.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_sign_full_arguments() {
        let cli = Cli::try_parse_from([
            "pdfstamp",
            "-v",
            "sign",
            "a.pdf",
            "b.pdf",
            "--signature-uri",
            "data:image/png;base64,AAAA",
            "--position",
            "100,100,1",
            "--at",
            "b.pdf=5,6,3",
            "--only",
            "b.pdf",
            "--opacity",
            "0.5",
        ])
        .unwrap();
        let Command::Sign(args) = cli.command else {
            panic!("expected sign");
        };
        assert!(cli.verbose);
        assert_eq!(args.position, Some(PositionArg(Position::new(100.0, 100.0, 1))));
        assert_eq!(args.at[0].name, "b.pdf");
        assert_eq!(args.only, vec!["b.pdf".to_string()]);
        assert_eq!(args.opacity, 0.5);
    }

    #[test]
    fn test_signature_sources_conflict() {
        let result = Cli::try_parse_from([
            "pdfstamp",
            "sign",
            "a.pdf",
            "-s",
            "sig.png",
            "--signature-uri",
            "data:image/png;base64,AAAA",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_info_json_flag() {
        let cli = Cli::try_parse_from(["pdfstamp", "info", "a.pdf", "--json"]).unwrap();
        assert!(matches!(cli.command, Command::Info(InfoArgs { json: true, .. })));
    }

    proptest! {
        #[test]
        fn prop_position_round_trips(x in -1000.0f64..1000.0, y in -1000.0f64..1000.0, page in -5i64..500) {
            let parsed: PositionArg = format!("{},{},{}", x, y, page).parse().unwrap();
            prop_assert_eq!(parsed.0, Position::new(x, y, page));
        }
    }
}
