use crate::{
    config::ContainerConfig,
    container::{Container, ContainerKind},
    file::parser::Parser,
    utils::find_bytes,
    FormatError, Result,
};

/// Frames raw file bytes into a [`Container`].
///
/// # Examples
///
/// ```rust
/// use fasscope::container::ContainerReader;
///
/// let container = ContainerReader::default().read(b"FAS4-FILE ; comment\r\n4\r\nabcd")?;
/// assert_eq!(container.declared_length(), 4);
/// assert_eq!(container.payload(), b"abcd");
/// # Ok::<(), fasscope::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ContainerReader {
    config: ContainerConfig,
}

impl ContainerReader {
    /// Create a reader using `config` for the marker and magic values.
    #[must_use]
    pub fn new(config: ContainerConfig) -> Self {
        ContainerReader { config }
    }

    /// Frame `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Format`] with
    /// - [`FormatError::MissingHeader`] if neither the marker nor the legacy magic is present
    /// - [`FormatError::MissingLength`] if the size line is absent or not a decimal integer
    /// - [`FormatError::TruncatedPayload`] if fewer bytes than declared follow the size line
    pub fn read(&self, data: &[u8]) -> Result<Container> {
        if self.is_legacy(data) {
            log::debug!("legacy payload without envelope, {} bytes", data.len());
            let tag = String::from_utf8_lossy(&self.config.legacy_magic)
                .trim_end_matches('\0')
                .to_string();
            return Ok(Container::new(ContainerKind::Legacy, tag, data.to_vec()));
        }

        let Some(marker_pos) = find_bytes(data, &self.config.marker) else {
            return Err(FormatError::MissingHeader.into());
        };

        let line_start = data[..marker_pos]
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |lf| lf + 1);

        let mut parser = Parser::new(data);
        parser
            .seek(line_start)
            .map_err(|_| FormatError::MissingHeader)?;
        let header = parser.read_line().map_err(|_| FormatError::MissingHeader)?;
        let header_tag = String::from_utf8_lossy(header).trim().to_string();

        let declared = Self::read_size_line(&mut parser)?;

        let mut start = parser.pos();
        let available = data.len() - start;
        if available > declared {
            let rest = &data[start..];
            let stray = if rest.starts_with(b"\r\n") {
                2
            } else if rest.starts_with(b"\n") {
                1
            } else {
                0
            };
            if stray > 0 && available - stray == declared {
                start += stray;
            }
        }

        let available = data.len() - start;
        if available < declared {
            return Err(FormatError::TruncatedPayload {
                declared,
                available,
            }
            .into());
        }

        log::debug!(
            "framed container '{}' with {} payload bytes at offset {}",
            header_tag,
            declared,
            start
        );

        Ok(Container::new(
            ContainerKind::Framed,
            header_tag,
            data[start..start + declared].to_vec(),
        ))
    }

    fn is_legacy(&self, data: &[u8]) -> bool {
        let magic = &self.config.legacy_magic;
        !magic.is_empty() && data.len() >= magic.len() + 4 && data.starts_with(magic)
    }

    fn read_size_line(parser: &mut Parser) -> Result<usize> {
        if !parser.has_more_data() {
            return Err(FormatError::MissingLength.into());
        }

        let mut line = parser.read_line().map_err(|_| FormatError::MissingLength)?;
        if line.iter().all(u8::is_ascii_whitespace) {
            line = parser.read_line().map_err(|_| FormatError::MissingLength)?;
        }

        let text = String::from_utf8_lossy(line);
        let digits = text.trim();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            log::debug!("size line is not a decimal integer: '{digits}'");
            return Err(FormatError::MissingLength.into());
        }

        digits
            .parse::<usize>()
            .map_err(|_| FormatError::MissingLength.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn frame(payload: &[u8], newline: &str) -> Vec<u8> {
        let mut data = format!("FAS4-FILE ; Do not change it!{newline}{}{newline}", payload.len())
            .into_bytes();
        data.extend_from_slice(payload);
        data
    }

    fn format_err(result: Result<Container>) -> FormatError {
        match result {
            Err(Error::Format(err)) => err,
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn framing_roundtrip_crlf_and_lf() {
        let payloads: [&[u8]; 4] = [b"", b"abcd", b"\n\nstarts with newlines", &[0u8, 0xFF, 0x0D, 0x0A, 0x01]];
        let reader = ContainerReader::default();
        for payload in payloads {
            for newline in ["\r\n", "\n"] {
                let container = reader.read(&frame(payload, newline)).unwrap();
                assert_eq!(container.kind(), ContainerKind::Framed);
                assert_eq!(container.declared_length(), payload.len());
                assert_eq!(container.payload(), payload);
            }
        }
    }

    #[test]
    fn header_with_leading_blank_line_and_annotation() {
        let data = b"\r\n FAS4-FILE ; Do not change it!\r\n5\r\nhello";
        let container = ContainerReader::default().read(data).unwrap();
        assert_eq!(container.header_tag(), "FAS4-FILE ; Do not change it!");
        assert_eq!(container.payload(), b"hello");
    }

    #[test]
    fn blank_line_before_size_line() {
        let data = b"FAS4-FILE\r\n\r\n3\r\nxyz";
        let container = ContainerReader::default().read(data).unwrap();
        assert_eq!(container.payload(), b"xyz");
    }

    #[test]
    fn stray_blank_line_before_payload() {
        let data = b"FAS4-FILE\r\n3\r\n\r\nxyz";
        let container = ContainerReader::default().read(data).unwrap();
        assert_eq!(container.payload(), b"xyz");

        let data = b"FAS4-FILE\n3\n\nxyz";
        let container = ContainerReader::default().read(data).unwrap();
        assert_eq!(container.payload(), b"xyz");
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let data = b"FAS4-FILE\n3\nxyz-trailer";
        let container = ContainerReader::default().read(data).unwrap();
        assert_eq!(container.payload(), b"xyz");
    }

    #[test]
    fn missing_header() {
        let err = format_err(ContainerReader::default().read(b"nothing to see\n4\nabcd"));
        assert_eq!(err, FormatError::MissingHeader);
    }

    #[test]
    fn missing_length() {
        let reader = ContainerReader::default();
        assert_eq!(
            format_err(reader.read(b"FAS4-FILE")),
            FormatError::MissingLength
        );
        assert_eq!(
            format_err(reader.read(b"FAS4-FILE\r\n")),
            FormatError::MissingLength
        );
        assert_eq!(
            format_err(reader.read(b"FAS4-FILE\r\nfour\r\nabcd")),
            FormatError::MissingLength
        );
        assert_eq!(
            format_err(reader.read(b"FAS4-FILE\r\n-4\r\nabcd")),
            FormatError::MissingLength
        );
    }

    #[test]
    fn truncated_payload() {
        let err = format_err(ContainerReader::default().read(b"FAS4-FILE\r\n10\r\nabcd"));
        assert_eq!(
            err,
            FormatError::TruncatedPayload {
                declared: 10,
                available: 4
            }
        );
    }

    #[test]
    fn legacy_passthrough() {
        let mut data = b"FAS\0".to_vec();
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&[0xAA, 0xBB]);

        let container = ContainerReader::default().read(&data).unwrap();
        assert_eq!(container.kind(), ContainerKind::Legacy);
        assert_eq!(container.header_tag(), "FAS");
        assert_eq!(container.payload(), data.as_slice());
        assert_eq!(container.declared_length(), data.len());
    }
}
