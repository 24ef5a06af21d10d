/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # IronFixp Codec
//!
//! Message codecs for the IronFixp session client.
//!
//! A codec turns transport [`Frame`]s into [`InboundEnvelope`]s and
//! [`Outbound`] messages back into frames. The session only ever sees the
//! envelope, so adding a wire format never touches the state machine.
//!
//! ## Codecs
//!
//! - [`JsonCodec`]: JSON text frames, admin type in `MessageType`, application type in `MsgType`
//! - [`TagValueCodec`]: FIX tag=value binary frames, discriminator in tag 35

pub mod json;
pub mod tagvalue;

pub use json::JsonCodec;
pub use tagvalue::TagValueCodec;

use ironfixp_core::{AdminMessage, DecodeError, EncodeError, Frame, InboundEnvelope, Outbound};

/// Bidirectional mapping between frames and session messages.
pub trait MessageCodec: Send + Sync + 'static {
    /// The codec's application message representation.
    type Message: Send + Sync + 'static;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Encodes an outbound message into one frame.
    ///
    /// # Errors
    /// Returns `EncodeError` if the message cannot be represented.
    fn encode(&self, message: &Outbound<Self::Message>) -> Result<Frame, EncodeError>;

    /// Decodes one inbound frame and resolves its discriminator.
    ///
    /// # Errors
    /// Returns `DecodeError` if the frame is malformed, or if it names an
    /// administrative type but its body is unusable.
    fn decode(&self, frame: &Frame) -> Result<InboundEnvelope<Self::Message>, DecodeError>;

    /// Encodes an administrative message.
    ///
    /// # Errors
    /// See [`MessageCodec::encode`].
    fn encode_admin(&self, message: AdminMessage) -> Result<Frame, EncodeError> {
        self.encode(&Outbound::Admin(message))
    }
}
