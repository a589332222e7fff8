//! Live frames from an external tracking bridge over TCP.
//!
//! The network side runs as a tokio task; the frame loop polls frames through
//! a bounded std channel and never waits on the network.

use anyhow::{anyhow, Result};
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError, TrySendError};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::body::{BodyFrame, BodyId};
use crate::controls::{BodyTrackingFeatures, OptimizationLevel, SkeletonProfile};
use crate::protocol::{self, BridgeMessage, MessageStream, SourceCommand};

use super::{FrameSource, SourceEvent, TrackingSource};

const RECONNECT_DELAY: Duration = Duration::from_secs(2);
/// 描画側が詰まったときに溜めておくフレーム数
const FRAME_QUEUE: usize = 8;

enum SessionEnd {
    Cancelled,
    ViewerGone,
}

pub struct BridgeSource {
    frames: Receiver<BodyFrame>,
    commands: UnboundedSender<SourceCommand>,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl BridgeSource {
    /// Spawn the connection task on `handle`. It reconnects every 2s until
    /// `shutdown` is cancelled or this source is dropped.
    pub fn connect(handle: &Handle, addr: impl Into<String>, shutdown: &CancellationToken) -> Self {
        let addr = addr.into();
        let (frame_tx, frame_rx) = mpsc::sync_channel(FRAME_QUEUE);
        let (command_tx, command_rx) = unbounded_channel();
        let token = shutdown.child_token();

        let task = handle.spawn(run(addr, frame_tx, command_rx, token.clone()));

        Self {
            frames: frame_rx,
            commands: command_tx,
            token,
            task,
        }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    fn send(&self, command: SourceCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| anyhow!("bridge task stopped, dropped {:?}", command))
    }
}

impl Drop for BridgeSource {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

impl FrameSource for BridgeSource {
    fn poll_event(&mut self) -> Result<Option<SourceEvent>> {
        match self.frames.try_recv() {
            Ok(frame) => Ok(Some(SourceEvent::Frame(frame))),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Ok(Some(SourceEvent::Finished)),
        }
    }
}

impl TrackingSource for BridgeSource {
    fn set_body_features(&mut self, body: BodyId, features: BodyTrackingFeatures) -> Result<()> {
        self.send(SourceCommand::SetBodyFeatures { body, features })
    }

    fn set_default_body_features(&mut self, features: BodyTrackingFeatures) -> Result<()> {
        self.send(SourceCommand::SetDefaultBodyFeatures { features })
    }

    fn set_skeleton_profile(&mut self, profile: SkeletonProfile) -> Result<()> {
        self.send(SourceCommand::SetSkeletonProfile { profile })
    }

    fn set_skeleton_optimization(&mut self, level: OptimizationLevel) -> Result<()> {
        self.send(SourceCommand::SetSkeletonOptimization { level })
    }
}

async fn run(
    addr: String,
    mut frames: SyncSender<BodyFrame>,
    mut commands: UnboundedReceiver<SourceCommand>,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            result = TcpStream::connect(&addr) => match result {
                Ok(tcp) => {
                    info!("Connected to bridge {}", addr);
                    let stream = protocol::message_stream(tcp);
                    match session(stream, &mut frames, &mut commands, &token).await {
                        Ok(SessionEnd::Cancelled) => break,
                        Ok(SessionEnd::ViewerGone) => {
                            info!("Frame consumer gone, closing bridge connection");
                            break;
                        }
                        Err(e) => warn!("Bridge session ended: {:#}", e),
                    }
                }
                Err(e) => warn!("Bridge connect failed ({}): {}", addr, e),
            }
        }

        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(RECONNECT_DELAY) => {}
        }
    }
    debug!("bridge task stopped");
}

/// Commands queued while disconnected are sent after the next connect.
async fn session(
    mut stream: MessageStream,
    frames: &mut SyncSender<BodyFrame>,
    commands: &mut UnboundedReceiver<SourceCommand>,
    token: &CancellationToken,
) -> Result<SessionEnd> {
    loop {
        tokio::select! {
            _ = token.cancelled() => return Ok(SessionEnd::Cancelled),
            msg = protocol::recv_message::<BridgeMessage>(&mut stream) => match msg? {
                BridgeMessage::Ready => info!("Bridge ready"),
                BridgeMessage::Frame(frame) => match frames.try_send(frame) {
                    Ok(()) => {}
                    Err(TrySendError::Full(frame)) => {
                        debug!("frame {} dropped: consumer busy", frame.frame_index);
                    }
                    Err(TrySendError::Disconnected(_)) => return Ok(SessionEnd::ViewerGone),
                },
            },
            command = commands.recv() => match command {
                Some(command) => protocol::send_message(&mut stream, &command).await?,
                None => return Ok(SessionEnd::ViewerGone),
            },
        }
    }
}
