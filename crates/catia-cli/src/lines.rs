//! Line input from files or stdin.

use std::path::Path;

use anyhow::{Context, Result};
use catia_core::error::{ApiError, ErrorCode};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::warn;

/// Maximum line size in bytes (1 MB is far above any event snapshot).
pub const MAX_LINE_SIZE: usize = 1024 * 1024;

pub type LineReader = Box<dyn AsyncBufRead + Unpin + Send>;

/// Open `file`, or stdin when no file is given.
pub async fn open(file: Option<&Path>) -> Result<LineReader> {
    match file {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(tokio::io::stdin()))),
    }
}

/// Read a line with a maximum size limit.
///
/// Returns the number of bytes read (0 means EOF).
/// Returns an error if the line exceeds max_size before finding a newline.
pub async fn read_line_bounded<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    buf: &mut String,
    max_size: usize,
) -> Result<usize> {
    let mut total = 0;
    let mut bytes = Vec::new();

    loop {
        let available = reader.fill_buf().await.context("Failed to read input")?;

        if available.is_empty() {
            // EOF
            break;
        }

        let newline_pos = available.iter().position(|&b| b == b'\n');
        let bytes_to_consume = newline_pos.map(|p| p + 1).unwrap_or(available.len());

        // Check size limit before consuming
        if total + bytes_to_consume > max_size {
            return Err(ApiError::input_too_large(max_size).into());
        }

        // Append raw bytes and validate UTF-8 once at the end
        bytes.extend_from_slice(&available[..bytes_to_consume]);
        total += bytes_to_consume;
        reader.consume(bytes_to_consume);

        if newline_pos.is_some() {
            break;
        }
    }

    let line = std::str::from_utf8(&bytes).context("Invalid UTF-8 in input")?;
    buf.push_str(line);
    Ok(total)
}

/// Discard input up to and including the next newline.
///
/// Returns the number of bytes discarded (0 means EOF).
pub async fn skip_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<usize> {
    let mut total = 0;
    loop {
        let available = reader.fill_buf().await.context("Failed to read input")?;
        if available.is_empty() {
            return Ok(total);
        }

        let newline_pos = available.iter().position(|&b| b == b'\n');
        let bytes_to_consume = newline_pos.map(|p| p + 1).unwrap_or(available.len());
        reader.consume(bytes_to_consume);
        total += bytes_to_consume;

        if newline_pos.is_some() {
            return Ok(total);
        }
    }
}

/// Whether `error` is a line over the size limit.
pub fn is_too_large(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<ApiError>()
        .is_some_and(|api| api.code == ErrorCode::InputTooLarge)
}

/// Read every non-blank line, trimmed. Oversized lines are skipped.
pub async fn read_all<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    let mut line = String::new();
    loop {
        line.clear();
        match read_line_bounded(reader, &mut line, MAX_LINE_SIZE).await {
            Ok(0) => return Ok(lines),
            Ok(_) => {}
            Err(e) if is_too_large(&e) => {
                warn!("Skipping: {}", e);
                skip_line(reader).await?;
                continue;
            }
            Err(e) => return Err(e),
        }
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_line_bounded_handles_utf8_chunks() {
        let data = "click 你好\n".as_bytes().to_vec();
        let cursor = std::io::Cursor::new(data);
        let mut reader = BufReader::with_capacity(1, cursor);
        let mut buf = String::new();

        let bytes = read_line_bounded(&mut reader, &mut buf, 1024)
            .await
            .expect("read line");

        assert!(bytes > 0);
        assert_eq!(buf, "click 你好\n");
    }

    #[tokio::test]
    async fn test_read_line_bounded_rejects_long_lines() {
        let cursor = std::io::Cursor::new(vec![b'x'; 64]);
        let mut reader = BufReader::with_capacity(8, cursor);
        let mut buf = String::new();

        let err = read_line_bounded(&mut reader, &mut buf, 16)
            .await
            .unwrap_err();
        let api = err.downcast_ref::<ApiError>().expect("api error");
        assert_eq!(api.code, ErrorCode::InputTooLarge);
    }

    #[tokio::test]
    async fn test_read_line_bounded_last_line_without_newline() {
        let cursor = std::io::Cursor::new(b"a\nb".to_vec());
        let mut reader = BufReader::new(cursor);
        let mut buf = String::new();

        assert_eq!(read_line_bounded(&mut reader, &mut buf, 16).await.unwrap(), 2);
        buf.clear();
        assert_eq!(read_line_bounded(&mut reader, &mut buf, 16).await.unwrap(), 1);
        assert_eq!(buf, "b");
        buf.clear();
        assert_eq!(read_line_bounded(&mut reader, &mut buf, 16).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_skip_line_resumes_after_oversized_line() {
        let mut data = vec![b'x'; 64];
        data.extend_from_slice(b"\nok\n");
        let mut reader = BufReader::with_capacity(8, std::io::Cursor::new(data));
        let mut buf = String::new();

        let err = read_line_bounded(&mut reader, &mut buf, 16)
            .await
            .unwrap_err();
        assert!(is_too_large(&err));

        let skipped = skip_line(&mut reader).await.unwrap();
        assert!(skipped > 0);

        buf.clear();
        read_line_bounded(&mut reader, &mut buf, 16).await.unwrap();
        assert_eq!(buf, "ok\n");
    }

    #[tokio::test]
    async fn test_skip_line_at_eof() {
        let mut reader = BufReader::new(std::io::Cursor::new(b"tail".to_vec()));
        assert_eq!(skip_line(&mut reader).await.unwrap(), 4);
        assert_eq!(skip_line(&mut reader).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_read_all_skips_oversized_lines() {
        let mut data = vec![b'x'; MAX_LINE_SIZE + 1];
        data.extend_from_slice(b"\ntype a\n");
        let mut reader = BufReader::new(std::io::Cursor::new(data));
        let lines = read_all(&mut reader).await.unwrap();
        assert_eq!(lines, vec!["type a"]);
    }

    #[test]
    fn test_is_too_large_only_matches_size_errors() {
        assert!(is_too_large(&ApiError::input_too_large(16).into()));
        assert!(!is_too_large(&ApiError::internal("boom").into()));
        assert!(!is_too_large(&anyhow::anyhow!("plain")));
    }

    #[tokio::test]
    async fn test_read_all_skips_blank_lines() {
        let cursor = std::io::Cursor::new(b"  type a  \n\n\ttype b\n".to_vec());
        let mut reader = BufReader::new(cursor);
        let lines = read_all(&mut reader).await.unwrap();
        assert_eq!(lines, vec!["type a", "type b"]);
    }

    #[tokio::test]
    async fn test_open_missing_file_has_context() {
        let path = std::env::temp_dir().join("catia-lines-missing.log");
        let err = match open(Some(&path)).await {
            Ok(_) => panic!("Expected open to fail"),
            Err(e) => e,
        };
        assert!(err.to_string().contains("catia-lines-missing.log"));
    }
}
