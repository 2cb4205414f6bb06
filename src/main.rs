use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use unwoff::{ChecksumPolicy, Converter, FontType, Options};

/// Convert a WOFF font to an OpenType PostScript (.otf) or TrueType (.ttf) font
#[derive(clap::Parser, Debug)]
#[command(version)]
struct Args {
    /// Print whether the WOFF file holds a PostScript or TrueType font instead of converting it
    #[arg(long = "type", value_name = "INPUT", conflicts_with_all = ["input", "output"])]
    font_type: Option<PathBuf>,
    /// Refuse files whose signature is not `wOFF`
    #[arg(long)]
    strict: bool,
    /// How to treat the table checksums stored in the WOFF
    #[arg(long, value_enum, default_value_t)]
    checksums: Checksums,
    /// The WOFF file to read
    #[arg(required_unless_present = "font_type")]
    input: Option<PathBuf>,
    /// The .otf/.ttf file to write
    #[arg(required_unless_present = "font_type")]
    output: Option<PathBuf>,
}

#[derive(clap::ValueEnum, Copy, Clone, Default, Debug)]
enum Checksums {
    /// Copy checksums through unchecked.
    #[default]
    Trust,
    /// Warn about tables that do not match their checksum.
    Warn,
    /// Fail on tables that do not match their checksum.
    Reject,
}

impl From<Checksums> for ChecksumPolicy {
    fn from(value: Checksums) -> Self {
        match value {
            Checksums::Trust => ChecksumPolicy::Trust,
            Checksums::Warn => ChecksumPolicy::Warn,
            Checksums::Reject => ChecksumPolicy::Reject,
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    if let Some(path) = args.font_type {
        let font_type = unwoff::font_type(&path);
        println!("Font type is {}", font_type.description());
        return match font_type {
            FontType::Unknown => ExitCode::FAILURE,
            _ => ExitCode::SUCCESS,
        };
    }

    let (Some(input), Some(output)) = (args.input, args.output) else {
        unreachable!("clap requires both paths unless --type is given");
    };
    let options = Options::default()
        .verify_signature(args.strict)
        .checksums(args.checksums.into());

    match Converter::new(options).convert(&input, &output) {
        Ok(_) => {
            println!("Success");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
