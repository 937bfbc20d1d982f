//! Request/response bridge between a front end and the library.
//!
//! Two operations cross the process boundary:
//!
//! - `get-beatmaps`: the full list of sets, or `[]` if anything goes wrong
//! - `open-external`: hand a URL to the OS default handler
//!
//! On the wire each request is one JSON object per line on stdin and each
//! reply one JSON object per line on stdout:
//!
//! ```text
//! → {"id": 1, "op": "get-beatmaps"}
//! ← {"id": 1, "result": [ ...BeatmapSet... ]}
//! → {"id": 2, "op": "open-external", "url": "https://osu.ppy.sh/b/42"}
//! ← {"id": 2, "result": null}
//! → {"id": 3, "op": "frobnicate"}
//! ← {"id": 3, "error": "unknown operation 'frobnicate'"}
//! ```

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, BufRead, Write};
use std::sync::{Mutex, MutexGuard};

use crate::db::LibraryReader;
use crate::error::BridgeError;
use crate::model::BeatmapSet;

/// Something that can open a URL outside the process.
pub trait Opener {
    fn open(&self, url: &str) -> io::Result<()>;
}

/// The operating system's default handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

impl Opener for SystemOpener {
    fn open(&self, url: &str) -> io::Result<()> {
        open::that(url)
    }
}

/// One decoded request line.
#[derive(Debug, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: Value,
    pub op: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Operations the bridge understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    GetBeatmaps,
    OpenExternal(String),
}

impl Request {
    pub fn operation(&self) -> Result<Operation, BridgeError> {
        match self.op.as_str() {
            "get-beatmaps" => Ok(Operation::GetBeatmaps),
            "open-external" => self
                .url
                .clone()
                .map(Operation::OpenExternal)
                .ok_or_else(|| BridgeError::MissingArgument {
                    op: self.op.clone(),
                    arg: "url",
                }),
            other => Err(BridgeError::UnknownOp(other.to_string())),
        }
    }
}

/// One reply line.
#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Reply {
    Ok { id: Value, result: Value },
    Err { id: Value, error: String },
}

/// Owns the library reader for the process lifetime and answers requests.
#[derive(Debug)]
pub struct Bridge<O = SystemOpener> {
    reader: Mutex<LibraryReader>,
    opener: O,
}

impl Bridge<SystemOpener> {
    pub fn new(reader: LibraryReader) -> Self {
        Self::with_opener(reader, SystemOpener)
    }
}

impl<O: Opener> Bridge<O> {
    pub fn with_opener(reader: LibraryReader, opener: O) -> Self {
        Self {
            reader: Mutex::new(reader),
            opener,
        }
    }

    // The reader is never mutated by a query, so a panic in another caller
    // leaves it usable.
    fn reader(&self) -> MutexGuard<'_, LibraryReader> {
        self.reader.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current library. Never fails: errors are logged and yield `[]`.
    pub fn get_beatmaps(&self) -> Vec<BeatmapSet> {
        match self.reader().beatmap_sets() {
            Ok(sets) => sets,
            Err(e) => {
                error!("get-beatmaps failed: {e}");
                Vec::new()
            }
        }
    }

    /// Fire-and-forget: a failure to launch the handler is only logged.
    pub fn open_external(&self, url: &str) {
        info!("Opening {url}");
        if let Err(e) = self.opener.open(url) {
            warn!("Could not open {url}: {e}");
        }
    }

    /// Answer one request line.
    pub fn handle_line(&self, line: &str) -> Reply {
        let request: Request = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                return Reply::Err {
                    id: Value::Null,
                    error: BridgeError::from(e).to_string(),
                }
            }
        };
        debug!("Bridge request {}: {}", request.id, request.op);

        let id = request.id.clone();
        match request.operation() {
            Ok(Operation::GetBeatmaps) => match serde_json::to_value(self.get_beatmaps()) {
                Ok(result) => Reply::Ok { id, result },
                Err(e) => {
                    error!("Could not encode beatmap list: {e}");
                    Reply::Ok { id, result: Value::Array(Vec::new()) }
                }
            },
            Ok(Operation::OpenExternal(url)) => {
                self.open_external(&url);
                Reply::Ok { id, result: Value::Null }
            }
            Err(e) => Reply::Err { id, error: e.to_string() },
        }
    }

    /// Serve requests until `input` reaches EOF. Blank lines are ignored.
    pub fn serve<R: BufRead, W: Write>(&self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let reply = self.handle_line(&line);
            serde_json::to_writer(&mut output, &reply)?;
            output.write_all(b"\n")?;
            output.flush()?;
        }
        Ok(())
    }

    /// Close the reader. Requests after this return `[]`.
    pub fn shutdown(&self) {
        self.reader().close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ContentStore;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingOpener {
        opened: RefCell<Vec<String>>,
    }

    impl Opener for &RecordingOpener {
        fn open(&self, url: &str) -> io::Result<()> {
            self.opened.borrow_mut().push(url.to_string());
            Ok(())
        }
    }

    struct FailingOpener;

    impl Opener for FailingOpener {
        fn open(&self, _url: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no handler"))
        }
    }

    fn closed_reader() -> LibraryReader {
        LibraryReader::new("/nonexistent/client.realm.sqlite", ContentStore::new("/nonexistent"))
    }

    #[test]
    fn test_get_beatmaps_on_closed_reader_is_empty() {
        let bridge = Bridge::with_opener(closed_reader(), FailingOpener);
        assert!(bridge.get_beatmaps().is_empty());
    }

    #[test]
    fn test_open_external_failure_is_swallowed() {
        let bridge = Bridge::with_opener(closed_reader(), FailingOpener);
        bridge.open_external("https://osu.ppy.sh/b/1");
    }

    #[test]
    fn test_open_external_request() {
        let opener = RecordingOpener::default();
        let bridge = Bridge::with_opener(closed_reader(), &opener);
        let reply = bridge.handle_line(r#"{"id":7,"op":"open-external","url":"osu://b/42"}"#);
        assert_eq!(reply, Reply::Ok { id: Value::from(7), result: Value::Null });
        assert_eq!(*opener.opened.borrow(), vec!["osu://b/42".to_string()]);
    }

    #[test]
    fn test_bad_requests_get_error_replies() {
        let bridge = Bridge::with_opener(closed_reader(), FailingOpener);
        assert!(matches!(bridge.handle_line("not json"), Reply::Err { id: Value::Null, .. }));
        assert!(matches!(
            bridge.handle_line(r#"{"id":"x","op":"frobnicate"}"#),
            Reply::Err { .. }
        ));
        assert!(matches!(
            bridge.handle_line(r#"{"id":1,"op":"open-external"}"#),
            Reply::Err { .. }
        ));
    }

    #[test]
    fn test_serve_answers_each_line() {
        let bridge = Bridge::with_opener(closed_reader(), FailingOpener);
        let input = "{\"id\":1,\"op\":\"get-beatmaps\"}\n\n{\"id\":2,\"op\":\"nope\"}\n";
        let mut output = Vec::new();
        bridge.serve(input.as_bytes(), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[0]["result"], Value::Array(Vec::new()));
        assert_eq!(lines[1]["id"], 2);
        assert!(lines[1]["error"].as_str().unwrap().contains("nope"));
    }
}
