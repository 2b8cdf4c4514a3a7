//! Line input on a dedicated thread.
//!
//! rustyline blocks, so it runs on its own thread and hands lines to the async
//! side over a channel. Output printed while a prompt is active goes through
//! rustyline's external printer so the prompt is redrawn below it.

use std::sync::mpsc as std_mpsc;
use std::thread;

use rustyline::{DefaultEditor, ExternalPrinter, error::ReadlineError};
use tokio::sync::mpsc;

/// Result of one prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    /// Ctrl-C
    Interrupted,
    /// Ctrl-D, or the input thread is gone
    Eof,
}

type Printer = Box<dyn ExternalPrinter + Send>;

pub struct Terminal {
    requests: std_mpsc::Sender<String>,
    events: mpsc::UnboundedReceiver<InputEvent>,
    printer: Option<Printer>,
    /// A prompt has been requested and not answered yet
    pending: bool,
}

impl Terminal {
    pub fn spawn() -> Result<Self, ReadlineError> {
        let (request_tx, request_rx) = std_mpsc::channel::<String>();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = std_mpsc::sync_channel::<Result<Option<Printer>, ReadlineError>>(1);

        thread::Builder::new()
            .name("readline".to_string())
            .spawn(move || {
                let mut editor = match DefaultEditor::new() {
                    Ok(editor) => editor,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let printer = match editor.create_external_printer() {
                    Ok(printer) => Some(Box::new(printer) as Printer),
                    Err(e) => {
                        tracing::debug!("External printer unavailable: {}", e);
                        None
                    }
                };
                if ready_tx.send(Ok(printer)).is_err() {
                    return;
                }

                while let Ok(prompt) = request_rx.recv() {
                    let event = match editor.readline(&prompt) {
                        Ok(line) => {
                            if !line.trim().is_empty() {
                                let _ = editor.add_history_entry(line.as_str());
                            }
                            InputEvent::Line(line)
                        }
                        Err(ReadlineError::Interrupted) => InputEvent::Interrupted,
                        Err(ReadlineError::Eof) => InputEvent::Eof,
                        Err(e) => {
                            tracing::warn!("Failed to read input: {}", e);
                            InputEvent::Eof
                        }
                    };
                    if event_tx.send(event).is_err() {
                        break;
                    }
                }
            })?;

        let printer = ready_rx
            .recv()
            .map_err(|_| ReadlineError::Io(std::io::Error::other("input thread exited")))??;

        Ok(Self {
            requests: request_tx,
            events: event_rx,
            printer,
            pending: false,
        })
    }

    /// Show a prompt unless one is already waiting for input
    pub fn request_line(&mut self, prompt: &str) {
        if self.pending {
            return;
        }
        if self.requests.send(prompt.to_string()).is_ok() {
            self.pending = true;
        }
    }

    /// Wait for the answer to the outstanding prompt. Cancel safe.
    pub async fn next_event(&mut self) -> InputEvent {
        match self.events.recv().await {
            Some(event) => {
                self.pending = false;
                event
            }
            None => InputEvent::Eof,
        }
    }

    pub async fn read_line(&mut self, prompt: &str) -> InputEvent {
        self.request_line(prompt);
        self.next_event().await
    }

    /// Print a block of text above the prompt
    pub fn print(&mut self, text: impl Into<String>) {
        let text = text.into();
        match self.printer.as_mut() {
            Some(printer) => {
                if let Err(e) = printer.print(text.clone()) {
                    tracing::debug!("External printer failed: {}", e);
                    println!("{text}");
                }
            }
            None => println!("{text}"),
        }
    }
}
