use crate::common::Mat;

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

///
/// Read every line of the input_file into memory
///
/// * `input_file` - file name--either gzipped or not
///
pub fn read_lines(input_file: &str) -> anyhow::Result<Vec<Box<str>>> {
    let buf: Box<dyn BufRead> = open_buf_reader(input_file)?;
    let mut lines = vec![];
    for x in buf.lines() {
        lines.push(x?.into_boxed_str());
    }
    Ok(lines)
}

///
/// Write every item on its own line into the output_file
///
/// * `lines` - anything that can be displayed
/// * `output_file` - file name--either gzipped or not
///
pub fn write_lines<T>(lines: &[T], output_file: &str) -> anyhow::Result<()>
where
    T: std::fmt::Display,
{
    let mut buf = open_buf_writer(output_file)?;
    for line in lines {
        if let Err(e) = writeln!(buf, "{}", line) {
            if e.kind() == std::io::ErrorKind::BrokenPipe {
                return Ok(());
            } else {
                return Err(anyhow::anyhow!("unexpected error: {}", e));
            }
        }
    }
    buf.flush()?;
    Ok(())
}

///
/// Write a matrix as tab-separated rows
///
/// * `mat` - matrix to write
/// * `output_file` - file name--either gzipped or not
///
pub fn write_matrix_tsv(mat: &Mat, output_file: &str) -> anyhow::Result<()> {
    let lines: Vec<Box<str>> = mat
        .row_iter()
        .map(|row| {
            row.iter()
                .map(|x| x.to_string())
                .collect::<Vec<_>>()
                .join("\t")
                .into_boxed_str()
        })
        .collect();
    write_lines(&lines, output_file)
}

///
/// Read a tab- or space-separated matrix; all rows must have the same length
///
/// * `input_file` - file name--either gzipped or not
///
pub fn read_matrix_tsv(input_file: &str) -> anyhow::Result<Mat> {
    let mut rows: Vec<Vec<f64>> = vec![];
    for line in read_lines(input_file)? {
        if line.trim().is_empty() {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|x| x.parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("{}: {}", input_file, e))?;
        rows.push(row);
    }

    let nrows = rows.len();
    let ncols = rows.first().map(|x| x.len()).unwrap_or(0);
    if rows.iter().any(|x| x.len() != ncols) {
        return Err(anyhow::anyhow!("{}: ragged rows", input_file));
    }

    Ok(Mat::from_row_iterator(
        nrows,
        ncols,
        rows.into_iter().flatten(),
    ))
}

///
/// Open a file for reading, and return a buffered reader
/// * `input_file` - file name--either gzipped or not
pub fn open_buf_reader(input_file: &str) -> anyhow::Result<Box<dyn BufRead>> {
    let ext = Path::new(input_file).extension().and_then(|x| x.to_str());
    let file = File::open(input_file)
        .map_err(|e| anyhow::anyhow!("failed to open {}: {}", input_file, e))?;
    match ext {
        Some("gz") => Ok(Box::new(BufReader::new(GzDecoder::new(file)))),
        _ => Ok(Box::new(BufReader::new(file))),
    }
}

///
/// Open a file for writing, and return a buffered writer
/// * `output_file` - file name--either gzipped or not
pub fn open_buf_writer(output_file: &str) -> anyhow::Result<Box<dyn std::io::Write>> {
    // we can simply override with stdout
    if output_file.eq_ignore_ascii_case("stdout") {
        return Ok(Box::new(BufWriter::new(std::io::stdout())));
    }

    if output_file.eq_ignore_ascii_case("stderr") {
        return Ok(Box::new(BufWriter::new(std::io::stderr())));
    }

    let ext = Path::new(output_file).extension().and_then(|x| x.to_str());
    match ext {
        Some("gz") => {
            let output_file = File::create(output_file)?;
            let encoder =
                flate2::write::GzEncoder::new(output_file, flate2::Compression::default());
            Ok(Box::new(BufWriter::new(encoder)))
        }
        _ => {
            let output_file = File::create(output_file)?;
            Ok(Box::new(BufWriter::new(output_file)))
        }
    }
}

///
/// Create a directory if needed
/// * `dir` - directory name
///
pub fn mkdir(dir: &str) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)?;
    Ok(())
}
