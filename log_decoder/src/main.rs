use anyhow::{anyhow, Context, Result};
use clap::Parser;
use colored::*;
use llcpp_decoder::{DecodeError, LogLine, RecordDecoder};
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Default, Debug)]
#[clap(version = option_env!("VERGEN_GIT_DESCRIBE"), about = "Decode llcpp binary log files into text.")]
struct CliArgs {
    /// Binary log files to decode
    #[clap(required = true)]
    files: Vec<PathBuf>,

    /// Print one JSON object per decoded line
    #[clap(long)]
    json: bool,

    /// Only print lines matching this regular expression
    #[clap(short, long)]
    filter: Option<String>,

    /// Prefix each line with its record number
    #[clap(short, long)]
    number: bool,

    /// Report decoder progress on stderr, repeat for more detail
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Everything decoded from one file, up to the first error.
#[derive(Debug)]
struct FileReport {
    path: PathBuf,
    lines: Vec<LogLine>,
    error: Option<DecodeError>,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    file: String,
    record: usize,
    text: &'a LogLine,
}

struct OutputOptions {
    json: bool,
    number: bool,
    filter: Option<Regex>,
    show_file_headers: bool,
}

fn decode_file(path: &Path) -> Result<FileReport> {
    let decoder = RecordDecoder::open(path)
        .with_context(|| format!("Error opening log file: {}", path.display()))?;

    let mut lines = Vec::new();
    let mut error = None;
    for item in decoder {
        match item {
            Ok(line) => lines.push(line),
            Err(e) => {
                error = Some(e);
                break;
            }
        }
    }

    tracing::info!(file = %path.display(), lines = lines.len(), failed = error.is_some(), "decoded");
    Ok(FileReport {
        path: path.to_path_buf(),
        lines,
        error,
    })
}

fn write_report<W: Write>(out: &mut W, report: &FileReport, opts: &OutputOptions) -> Result<()> {
    if opts.show_file_headers && !opts.json {
        writeln!(out, "{}", format!("==> {} <==", report.path.display()).bold())?;
    }

    for (record, line) in report.lines.iter().enumerate() {
        if let Some(re) = &opts.filter {
            if !re.is_match(&line.text()) {
                continue;
            }
        }

        if opts.json {
            let entry = JsonLine {
                file: report.path.display().to_string(),
                record,
                text: line,
            };
            serde_json::to_writer(&mut *out, &entry)?;
            out.write_all(b"\n")?;
            continue;
        }

        if opts.number {
            write!(out, "{} ", format!("{:>6}", record).cyan())?;
        }
        // Lines carry their own newlines, if any.
        out.write_all(line.as_bytes())?;
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info,llcpp_decoder=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    let filter = args
        .filter
        .as_deref()
        .map(Regex::new)
        .transpose()
        .context("Invalid --filter expression")?;

    let opts = OutputOptions {
        json: args.json,
        number: args.number,
        filter,
        show_file_headers: args.files.len() > 1,
    };

    // Each file is its own decode session; collect keeps argument order.
    let reports: Vec<Result<FileReport>> = args.files.par_iter().map(|p| decode_file(p)).collect();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut failures = 0;

    for report in reports {
        let report = match report {
            Ok(report) => report,
            Err(e) => {
                out.flush()?;
                eprintln!("{} {:#}", "error:".red().bold(), e);
                failures += 1;
                continue;
            }
        };

        write_report(&mut out, &report, &opts)?;

        if let Some(e) = &report.error {
            out.flush()?;
            eprintln!(
                "{} {}: {} (after {} records)",
                "error:".red().bold(),
                report.path.display(),
                e.to_string().red(),
                report.lines.len()
            );
            failures += 1;
        }
    }
    out.flush()?;

    if failures > 0 {
        return Err(anyhow!("{} of {} files failed to decode", failures, args.files.len()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use llcpp_decoder::{LogArg, RecordWriter};
    use tempfile::NamedTempFile;

    fn options() -> OutputOptions {
        OutputOptions {
            json: false,
            number: false,
            filter: None,
            show_file_headers: false,
        }
    }

    fn sample_file() -> NamedTempFile {
        let mut writer = RecordWriter::new(Vec::new()).with_line_suffix(b'\n');
        writer.write_record("boot %u", &[LogArg::Uint(1)]).unwrap();
        writer.write_record("link up on %s", &["eth0".into()]).unwrap();
        writer.write_record("temp %d C", &[LogArg::Int(-4)]).unwrap();

        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), writer.into_inner()).unwrap();
        file
    }

    fn render(report: &FileReport, opts: &OutputOptions) -> String {
        colored::control::set_override(false);
        let mut out = Vec::new();
        write_report(&mut out, report, opts).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_plain_output() {
        let file = sample_file();
        let report = decode_file(file.path()).unwrap();
        assert!(report.error.is_none());
        assert_eq!(render(&report, &options()), "boot 1\nlink up on eth0\ntemp -4 C\n");
    }

    #[test]
    fn test_filter_and_numbering() {
        let file = sample_file();
        let report = decode_file(file.path()).unwrap();
        let opts = OutputOptions {
            number: true,
            filter: Some(Regex::new("link|temp").unwrap()),
            ..options()
        };
        assert_eq!(render(&report, &opts), "     1 link up on eth0\n     2 temp -4 C\n");
    }

    #[test]
    fn test_json_output() {
        let file = sample_file();
        let report = decode_file(file.path()).unwrap();
        let opts = OutputOptions {
            json: true,
            ..options()
        };
        let rendered = render(&report, &opts);
        let first: serde_json::Value = serde_json::from_str(rendered.lines().next().unwrap()).unwrap();
        assert_eq!(first["record"], 0);
        assert_eq!(first["text"], "boot 1\n");
    }

    #[test]
    fn test_truncated_file_reports_error() {
        let file = sample_file();
        let mut data = std::fs::read(file.path()).unwrap();
        data.truncate(data.len() - 2);
        std::fs::write(file.path(), data).unwrap();

        let report = decode_file(file.path()).unwrap();
        assert_eq!(report.lines.len(), 2);
        assert!(matches!(report.error, Some(DecodeError::TruncatedStream { .. })));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(decode_file(Path::new("/non/existent/log.bin")).is_err());
    }
}
