/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct SseFrame {
    pub(super) event: Option<String>,
    pub(super) data: String,
}

/// Incremental `text/event-stream` decoder.
///
/// Bytes may arrive split anywhere, including inside a line. Comment lines
/// and fields other than `event` and `data` are skipped.
#[derive(Debug, Default)]
pub(super) struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub(super) fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(end) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=end).collect();
            let text = String::from_utf8_lossy(&raw);
            let line = text.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                frames.extend(self.dispatch());
                continue;
            }
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };
            match field {
                "event" => self.event = Some(value.to_owned()),
                "data" => self.data.push(value.to_owned()),
                _ => {}
            }
        }

        frames
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }

        Some(SseFrame {
            event,
            data: std::mem::take(&mut self.data).join("\n"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_events_and_multi_line_data() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push(b"event: error\r\ndata: {\"code\":\r\ndata: \"internal\"}\r\n\r\n");

        assert_eq!(
            frames,
            vec![SseFrame {
                event: Some("error".to_owned()),
                data: "{\"code\":\n\"internal\"}".to_owned(),
            }]
        );
    }

    #[test]
    fn keep_alive_comments_produce_nothing() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b":\n\n: ping\n\n").is_empty());
    }

    #[test]
    fn incomplete_frames_wait_for_the_blank_line() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"data: 1\n").is_empty());
        assert_eq!(
            decoder.push(b"\n"),
            vec![SseFrame {
                event: None,
                data: "1".to_owned(),
            }]
        );
    }
}
