use crate::app::render;
use crate::core::acquisition::Acquirer;
use crate::core::run::RunSequencer;
use crate::core::session::{Command, SessionEvent, SessionState};
use crate::core::{AcquisitionOutcome, ExclusionSet, RecordSource};
use crate::utils::error::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

type Finished = (u64, AcquisitionOutcome);

/// Whether the input loop should keep going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Interactive session: turns input lines into commands, runs acquisitions
/// in background tasks and renders the resulting state.
pub struct TerminalSession<R: RecordSource + 'static> {
    acquirer: Arc<Acquirer<R>>,
    sequencer: RunSequencer,
    state: SessionState,
    finished_tx: mpsc::UnboundedSender<Finished>,
    finished_rx: mpsc::UnboundedReceiver<Finished>,
}

impl<R: RecordSource + 'static> TerminalSession<R> {
    pub fn new(acquirer: Acquirer<R>, exclusions: ExclusionSet) -> Self {
        let (finished_tx, finished_rx) = mpsc::unbounded_channel();
        Self {
            acquirer: Arc::new(acquirer),
            sequencer: RunSequencer::new(),
            state: SessionState::new(exclusions),
            finished_tx,
            finished_rx,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    fn apply(&mut self, event: SessionEvent) {
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(event);
    }

    /// Starts a new run against a snapshot of the current exclusions.
    /// Any run still in flight is superseded.
    pub fn start_run(&mut self) -> u64 {
        let token = self.sequencer.begin();
        let run_id = token.id();
        self.apply(SessionEvent::RunStarted { run_id });

        let acquirer = Arc::clone(&self.acquirer);
        let exclusions = self.state.exclusions.clone();
        let finished_tx = self.finished_tx.clone();
        tokio::spawn(async move {
            let outcome = acquirer.acquire_run(&exclusions, &token).await;
            // 接收端已關閉代表 session 已結束
            let _ = finished_tx.send((token.id(), outcome));
        });

        run_id
    }

    fn finish_run(&mut self, run_id: u64, outcome: AcquisitionOutcome) {
        self.apply(SessionEvent::RunFinished { run_id, outcome });
    }

    /// Waits until the latest started run has reported back. Returns
    /// immediately when nothing is loading.
    pub async fn settle(&mut self) {
        while self.state.is_loading() {
            match self.finished_rx.recv().await {
                Some((run_id, outcome)) => self.finish_run(run_id, outcome),
                None => break,
            }
        }
    }

    /// Applies one command. `Next` only starts the run; see [`Self::settle`].
    pub fn dispatch(&mut self, command: Command) -> Result<(Flow, String)> {
        let output = match command {
            Command::Next => {
                let run_id = self.start_run();
                format!("Loading... (request #{})\n", run_id)
            }
            Command::BanCurrent(property) => {
                let rule = self.state.rule_for_current(property)?;
                self.apply(SessionEvent::RuleAdded(rule));
                render::exclusions(&self.state.exclusions)
            }
            Command::Ban(rule) => {
                self.apply(SessionEvent::RuleAdded(rule));
                render::exclusions(&self.state.exclusions)
            }
            Command::Unban(position) => {
                let event = self.state.unban_event(position)?;
                self.apply(event);
                render::exclusions(&self.state.exclusions)
            }
            Command::ListBans => render::exclusions(&self.state.exclusions),
            Command::Show => render::state(&self.state),
            Command::Help => render::HELP.to_string(),
            Command::Quit => return Ok((Flow::Quit, String::new())),
        };
        Ok((Flow::Continue, output))
    }

    /// Reads commands until `quit` or end of input. A run is started right
    /// away, like the page fetching a cat on load. At end of input the
    /// latest run is awaited so its outcome is still shown.
    pub async fn run<I, O>(mut self, mut input: I, mut output: O) -> Result<SessionState>
    where
        I: AsyncBufRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        output.write_all(render::HELP.as_bytes()).await?;
        self.start_run();
        output.write_all(render::status(&self.state).as_bytes()).await?;
        output.flush().await?;

        // 以位元組讀取，無效的 UTF-8 只算一行錯誤指令
        let mut buf = Vec::new();
        loop {
            tokio::select! {
                read = input.read_until(b'\n', &mut buf) => {
                    if read? == 0 && buf.is_empty() {
                        tracing::debug!("Input closed");
                        break;
                    }
                    let line = String::from_utf8_lossy(&buf).into_owned();
                    buf.clear();

                    let text = match line.parse::<Command>().and_then(|c| self.dispatch(c)) {
                        Ok((Flow::Quit, _)) => {
                            output.flush().await?;
                            return Ok(self.state);
                        }
                        Ok((Flow::Continue, text)) => text,
                        Err(e) => {
                            tracing::debug!("Rejected input: {}", e);
                            format!("⚠️ {}\n💡 {}\n", e.user_friendly_message(), e.recovery_suggestion())
                        }
                    };
                    output.write_all(text.as_bytes()).await?;
                }
                Some((run_id, outcome)) = self.finished_rx.recv() => {
                    let latest = run_id == self.state.latest_run();
                    self.finish_run(run_id, outcome);
                    if latest {
                        output.write_all(render::state(&self.state).as_bytes()).await?;
                    }
                }
            }
            output.flush().await?;
        }

        if self.state.is_loading() {
            self.settle().await;
            output.write_all(render::state(&self.state).as_bytes()).await?;
            output.flush().await?;
        }

        Ok(self.state)
    }
}
