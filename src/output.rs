use std::fs::File;
use std::io::Write;

use anyhow::anyhow;
use colored::Colorize;

use crate::general::common::Res;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Message {
    Info,
    Warning,
    /// Error and Debug messages go to `stderr`, everything else to `stdout`.
    Error,
    Debug,
}

impl Message {
    fn message_prefix(self) -> &'static str {
        match self {
            Message::Info => "",
            Message::Warning => "Warning:",
            Message::Error => "Error:",
            Message::Debug => "Debug:",
        }
    }

    fn colored_prefix(self) -> String {
        let prefix = self.message_prefix();
        match self {
            Message::Info => prefix.to_string(),
            Message::Warning => prefix.yellow().to_string(),
            Message::Error => prefix.red().bold().to_string(),
            Message::Debug => prefix.dimmed().to_string(),
        }
    }

    pub fn format(self, msg: &str) -> String {
        match self {
            Message::Info => msg.to_string(),
            _ => format!("{0} {msg}", self.colored_prefix()),
        }
    }

    /// Prints a message for a human. Protocol output doesn't go through this.
    pub fn display(self, msg: &str) {
        let text = self.format(msg);
        match self {
            Message::Info | Message::Warning => println!("{text}"),
            Message::Error | Message::Debug => eprintln!("{text}"),
        }
    }
}

#[derive(Debug)]
pub enum LogSink {
    /// Unbuffered, so the transcript is complete even if the engine gets killed mid-game.
    File(File),
    Memory(Vec<u8>),
}

/// A transcript of a UCI session: what the GUI sent, what the engine answered,
/// and a summary line after every search.
#[derive(Debug)]
pub struct Logger {
    sink: LogSink,
}

impl Logger {
    fn new(sink: LogSink) -> Self {
        let mut res = Self { sink };
        let start = format!(
            "[Starting logging at {}]",
            chrono::offset::Utc::now().to_rfc2822()
        );
        res.write_line("", &start);
        res
    }

    pub fn create(path: &str) -> Res<Self> {
        let file = File::create(path)
            .map_err(|err| anyhow!("Couldn't create log file '{path}': {err}"))?;
        Ok(Self::new(LogSink::File(file)))
    }

    pub fn in_memory() -> Self {
        Self::new(LogSink::Memory(vec![]))
    }

    fn write_line(&mut self, prefix: &str, msg: &str) {
        let out: &mut dyn Write = match &mut self.sink {
            LogSink::File(file) => file,
            LogSink::Memory(buf) => buf,
        };
        // write errors are ignored
        _ = if prefix.is_empty() {
            writeln!(out, "{msg}")
        } else {
            writeln!(out, "{prefix} {msg}")
        };
    }

    pub fn write_uci_input(&mut self, line: &str) {
        self.write_line(">", line);
    }

    pub fn write_uci_output(&mut self, line: &str) {
        self.write_line("<", line);
    }

    pub fn write_search_log(&mut self, log: &str) {
        self.write_line("+ log +", log);
    }

    pub fn display_message(&mut self, typ: Message, message: &str) {
        self.write_line(typ.message_prefix(), message);
    }

    /// Everything written so far, only for in-memory transcripts.
    pub fn contents(&self) -> Option<String> {
        match &self.sink {
            LogSink::Memory(buf) => Some(String::from_utf8_lossy(buf).into_owned()),
            LogSink::File(_) => None,
        }
    }
}
