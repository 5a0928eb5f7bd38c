// CSV/TSV import/export

use std::io::Read;
use std::path::Path;

use tbcompare_recon::{Cell, RawGrid};

use crate::error::IoError;

pub fn import(path: &Path) -> Result<RawGrid, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter).map_err(|message| IoError::Csv {
        path: path.to_path_buf(),
        message,
    })
}

pub fn import_with_delimiter(path: &Path, delimiter: u8) -> Result<RawGrid, IoError> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, delimiter).map_err(|message| IoError::Csv {
        path: path.to_path_buf(),
        message,
    })
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins. Trial balance exports
/// usually open with a title block, so the sample is taken from the densest lines.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(20)
        .collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                ::csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Most common field count above 1 is the table width for this candidate
        let Some(target) = modal_width(&counts) else {
            continue;
        };
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

fn modal_width(counts: &[usize]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for &c in counts.iter().filter(|&&c| c > 1) {
        let n = counts.iter().filter(|&&x| x == c).count();
        // Wider table wins ties
        if best.map_or(true, |(bc, bn)| n > bn || (n == bn && c > bc)) {
            best = Some((c, n));
        }
    }
    best.map(|(c, _)| c)
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let read_err = |source| IoError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.strip_prefix('\u{feff}').map(str::to_owned).unwrap_or(s)),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            log::debug!("{} is not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Parse CSV text into a grid. Every non-empty field is text; the engine
/// parses amounts itself.
pub fn import_from_string(content: &str, delimiter: u8) -> Result<RawGrid, String> {
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        rows.push(record.iter().map(Cell::from).collect());
    }

    Ok(RawGrid::new(rows))
}

/// Write rows of display text to a file. Rows may differ in width (the
/// TB_Clean balance line is a single field).
pub fn write_rows(path: &Path, rows: &[Vec<String>], delimiter: u8) -> Result<(), IoError> {
    let file = std::fs::File::create(path).map_err(|e| IoError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    write_to(file, rows, delimiter).map_err(|message| IoError::Write {
        path: path.to_path_buf(),
        message,
    })
}

/// Write rows of display text to any writer (stdout for the CLI).
pub fn write_to<W: std::io::Write>(out: W, rows: &[Vec<String>], delimiter: u8) -> Result<(), String> {
    let mut writer = ::csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_writer(out);

    for row in rows {
        writer.write_record(row).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}
