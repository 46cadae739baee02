use std::io::Write;
use std::sync::Arc;

use tokio::sync::mpsc;
use waldo_core::{update, AppState, AppViewModel, Msg, Phase};
use waldo_engine::{
    ProgressChannel, ReqwestJobSubmitter, ReqwestResultFetcher, RequestError, SseTransport,
};
use waldo_logging::{clear_session_tag, waldo_debug, waldo_info};

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::ui::render::Renderer;

/// Single-threaded orchestrator: one message queue, one state, one channel.
pub struct App<W: Write> {
    state: AppState,
    runner: EffectRunner,
    msg_rx: mpsc::UnboundedReceiver<Msg>,
    renderer: Renderer,
    out: W,
}

impl<W: Write> App<W> {
    pub fn from_config(config: &AppConfig, out: W) -> Result<Self, RequestError> {
        let client_settings = config.client_settings();
        let transport = Arc::new(SseTransport::new(client_settings.clone())?);
        let submitter = Arc::new(ReqwestJobSubmitter::new(client_settings.clone())?);
        let fetcher = Arc::new(ReqwestResultFetcher::new(client_settings)?);

        let (msg_tx, msg_rx) = mpsc::unbounded_channel::<Msg>();
        let channel = ProgressChannel::new(transport, config.channel_settings());
        let runner = EffectRunner::new(
            channel,
            submitter,
            fetcher,
            msg_tx,
            config.hide_progress_delay(),
        );

        Ok(Self {
            state: AppState::new(),
            runner,
            msg_rx,
            renderer: Renderer::default(),
            out,
        })
    }

    /// Submit `input` and process messages until the session settles.
    pub async fn run(mut self, input: String) -> AppViewModel {
        self.dispatch_msg(Msg::SubmitClicked { input }).await;

        while !self.is_finished() {
            tokio::select! {
                msg = self.msg_rx.recv() => match msg {
                    Some(msg) => self.dispatch_msg(msg).await,
                    None => break,
                },
                _ = self.runner.step_channel(), if self.runner.channel_active() => {}
            }
        }

        self.runner.shutdown();
        clear_session_tag();
        waldo_info!("session finished in phase {:?}", self.state.phase());
        self.state.view()
    }

    /// Rejected input never leaves `Idle`; anything else runs until settled
    /// and the channel has finished its grace close.
    fn is_finished(&self) -> bool {
        match self.state.phase() {
            Phase::Idle => true,
            _ => self.state.is_settled() && !self.runner.channel_active(),
        }
    }

    async fn dispatch_msg(&mut self, msg: Msg) {
        waldo_debug!("dispatch {:?}", msg);
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let view = state.view();
        let was_dirty = state.consume_dirty();
        self.state = state;

        if was_dirty {
            self.enqueue_render(&view);
        }
        self.runner.enqueue(effects).await;
    }

    fn enqueue_render(&mut self, view: &AppViewModel) {
        for line in self.renderer.render(view) {
            let _ = writeln!(self.out, "{line}");
        }
        let _ = self.out.flush();
    }
}
