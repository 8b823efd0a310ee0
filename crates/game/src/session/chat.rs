/// Receives chat text from the remote side.
pub trait ChatSink {
    fn on_chat(&mut self, text: &str);
}

/// Writes chat lines to the log at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogChat;

impl ChatSink for LogChat {
    fn on_chat(&mut self, text: &str) {
        log::info!("[chat] {}", text);
    }
}

impl ChatSink for Vec<String> {
    fn on_chat(&mut self, text: &str) {
        self.push(text.to_string());
    }
}

