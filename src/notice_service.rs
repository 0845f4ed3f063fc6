use compact_str::CompactString;

/// Remembers the last message sent per level so repeats are not re-sent
#[derive(Debug, Default)]
pub struct NoticeService {
    last_info: Option<CompactString>,
    last_error: Option<CompactString>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Homework status messages
    Info,
    /// Poll failures
    Error,
}

impl NoticeService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` and returns whether it differs from the previous one
    /// at the same level.
    pub fn push_notice(&mut self, level: NoticeLevel, message: &str) -> bool {
        let slot = match level {
            NoticeLevel::Info => &mut self.last_info,
            NoticeLevel::Error => &mut self.last_error,
        };

        if slot.as_deref() == Some(message) {
            return false;
        }

        *slot = Some(message.into());
        true
    }

    #[cfg(test)]
    pub fn last_notice(&self, level: NoticeLevel) -> Option<&str> {
        match level {
            NoticeLevel::Info => self.last_info.as_deref(),
            NoticeLevel::Error => self.last_error.as_deref(),
        }
    }
}
