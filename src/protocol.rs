//! TCP protocol between a tracking bridge (owns the depth sensor SDK) and the
//! skeleton viewer.
//!
//! Frames flow bridge → viewer; tracking setting changes flow viewer → bridge.

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::body::{BodyFrame, BodyId};
use crate::controls::{BodyTrackingFeatures, OptimizationLevel, SkeletonProfile};

// --- Message types ---

/// Bridge → viewer
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BridgeMessage {
    /// Sensor stream opened, frames follow.
    Ready,
    Frame(BodyFrame),
}

/// Viewer → bridge. One message per tracking setting change.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum SourceCommand {
    SetBodyFeatures { body: BodyId, features: BodyTrackingFeatures },
    SetDefaultBodyFeatures { features: BodyTrackingFeatures },
    SetSkeletonProfile { profile: SkeletonProfile },
    SetSkeletonOptimization { level: OptimizationLevel },
}

// --- TCP codec helpers ---

/// A frame with every joint of six bodies is a few KB.
pub const MAX_MESSAGE_LEN: usize = 1024 * 1024;

pub type MessageStream = Framed<TcpStream, LengthDelimitedCodec>;

/// Length-delimited framing capped at `MAX_MESSAGE_LEN`.
pub fn message_stream(stream: TcpStream) -> MessageStream {
    let codec = LengthDelimitedCodec::builder()
        .max_frame_length(MAX_MESSAGE_LEN)
        .new_codec();
    Framed::new(stream, codec)
}

/// Send a bincode-encoded message.
pub async fn send_message<T: Serialize + fmt::Debug>(stream: &mut MessageStream, msg: &T) -> Result<()> {
    let data = bincode::serialize(msg).with_context(|| format!("failed to encode {:?}", msg))?;
    stream
        .send(Bytes::from(data))
        .await
        .context("bridge connection write failed")?;
    Ok(())
}

/// Receive and decode one message. A closed connection is an error.
pub async fn recv_message<T: DeserializeOwned>(stream: &mut MessageStream) -> Result<T> {
    match stream.next().await {
        Some(Ok(bytes)) => bincode::deserialize(&bytes).with_context(|| {
            format!(
                "malformed {} ({} bytes)",
                std::any::type_name::<T>().rsplit("::").next().unwrap_or_default(),
                bytes.len()
            )
        }),
        Some(Err(e)) => Err(e).context("bridge connection read failed"),
        None => bail!("bridge connection closed"),
    }
}
