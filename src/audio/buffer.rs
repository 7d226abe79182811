/// Append-only byte buffer for one recording session.
///
/// No framing is imposed: payloads are concatenated in arrival order.
#[derive(Debug, Default)]
pub struct AudioBuffer {
    bytes: Vec<u8>,
}

impl AudioBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a payload. The first payload is moved in without copying.
    pub fn append(&mut self, payload: Vec<u8>) {
        if self.bytes.is_empty() {
            self.bytes = payload;
        } else {
            self.bytes.extend_from_slice(&payload);
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concatenates_in_order() {
        let mut buffer = AudioBuffer::new();
        buffer.append(vec![0x01, 0x02]);
        buffer.append(Vec::new());
        buffer.append(vec![0x03]);

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.into_bytes(), vec![0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_empty_payloads_leave_buffer_empty() {
        let mut buffer = AudioBuffer::new();
        buffer.append(Vec::new());
        buffer.append(Vec::new());

        assert!(buffer.is_empty());
    }
}
