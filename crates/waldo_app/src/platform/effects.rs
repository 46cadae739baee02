use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use waldo_core::{Effect, Msg};
use waldo_engine::{ChannelEvent, EventName, JobSubmitter, ProgressChannel, ResultFetcher};
use waldo_logging::{set_session_tag, waldo_info, waldo_warn};

/// Executes coordinator effects and turns their outcomes back into messages.
///
/// Owns the progress channel; the app loop drives it through
/// [`EffectRunner::step_channel`].
pub struct EffectRunner {
    channel: ProgressChannel,
    submitter: Arc<dyn JobSubmitter>,
    fetcher: Arc<dyn ResultFetcher>,
    msg_tx: UnboundedSender<Msg>,
    hide_progress_delay: Duration,
}

impl EffectRunner {
    pub fn new(
        mut channel: ProgressChannel,
        submitter: Arc<dyn JobSubmitter>,
        fetcher: Arc<dyn ResultFetcher>,
        msg_tx: UnboundedSender<Msg>,
        hide_progress_delay: Duration,
    ) -> Self {
        wire_channel(&mut channel, &msg_tx);
        Self {
            channel,
            submitter,
            fetcher,
            msg_tx,
            hide_progress_delay,
        }
    }

    pub async fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitJob { input } => self.spawn_submit(input),
                Effect::OpenChannel { session_id } => {
                    set_session_tag(session_id.as_str());
                    waldo_info!("OpenChannel session_id={}", session_id);
                    if let Err(err) = self.channel.connect(session_id).await {
                        // The channel already reported the loss through its Error handler.
                        waldo_warn!("progress channel failed to open: {}", err);
                    }
                }
                Effect::FetchResults { session_id } => {
                    waldo_info!("FetchResults session_id={}", session_id);
                    let fetcher = Arc::clone(&self.fetcher);
                    let msg_tx = self.msg_tx.clone();
                    tokio::spawn(async move {
                        let result = fetcher
                            .fetch_results(&session_id)
                            .await
                            .map_err(|err| err.message);
                        let _ = msg_tx.send(Msg::ResultsFetched { session_id, result });
                    });
                }
                Effect::ScheduleHideProgress { session_id } => {
                    let delay = self.hide_progress_delay;
                    let msg_tx = self.msg_tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = msg_tx.send(Msg::HideProgressElapsed { session_id });
                    });
                }
            }
        }
    }

    pub fn channel_active(&self) -> bool {
        self.channel.is_active()
    }

    /// Dispatch the next channel event; pending forever while the channel is idle.
    pub async fn step_channel(&mut self) {
        if self.channel.is_active() {
            self.channel.step().await;
        } else {
            std::future::pending::<()>().await;
        }
    }

    pub fn shutdown(&mut self) {
        self.channel.disconnect();
    }

    fn spawn_submit(&self, input: String) {
        waldo_info!("SubmitJob input_len={}", input.len());
        let submitter = Arc::clone(&self.submitter);
        let msg_tx = self.msg_tx.clone();
        tokio::spawn(async move {
            let msg = match submitter.submit(&input).await {
                Ok(session_id) => Msg::SubmissionAccepted { session_id },
                Err(err) => {
                    waldo_warn!("submission failed ({}): {}", err.kind, err.message);
                    Msg::SubmissionFailed { error: err.message }
                }
            };
            let _ = msg_tx.send(msg);
        });
    }
}

/// Route channel events into the coordinator's message queue.
fn wire_channel(channel: &mut ProgressChannel, msg_tx: &UnboundedSender<Msg>) {
    let tx = msg_tx.clone();
    channel.on(EventName::Connected, move |event| {
        let _ = tx.send(Msg::ChannelConnected {
            session_id: event.session_id().clone(),
        });
    });

    let tx = msg_tx.clone();
    channel.on(EventName::Progress, move |event| {
        if let ChannelEvent::Frame { session_id, frame } = event {
            let _ = tx.send(Msg::FrameReceived {
                session_id: session_id.clone(),
                frame: frame.clone(),
            });
        }
    });

    let tx = msg_tx.clone();
    channel.on(EventName::Complete, move |event| {
        if let ChannelEvent::Frame { session_id, frame } = event {
            let _ = tx.send(Msg::JobCompleted {
                session_id: session_id.clone(),
                frame: frame.clone(),
            });
        }
    });

    let tx = msg_tx.clone();
    channel.on(EventName::Error, move |event| {
        let _ = tx.send(Msg::JobFailed {
            session_id: event.session_id().clone(),
            error: event.error_message(),
        });
    });
}
