//! Classification of read-side failures.

use parlor_proto::ProtocolError;

/// Every read failure ends the session; this only decides how it is logged.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum ReadErrorAction {
    /// The socket is broken or was reset.
    IoError,
    /// The byte stream cannot be split into valid lines.
    FramingError { reason: String },
    /// A complete line was not a valid request.
    MalformedRequest { reason: String },
}

pub(super) fn classify_read_error(e: &ProtocolError) -> ReadErrorAction {
    match e {
        ProtocolError::Io(_) => ReadErrorAction::IoError,
        ProtocolError::MessageTooLong { .. } | ProtocolError::InvalidUtf8 { .. } => {
            ReadErrorAction::FramingError {
                reason: e.to_string(),
            }
        }
        ProtocolError::InvalidRequest(json) => ReadErrorAction::MalformedRequest {
            reason: json.to_string(),
        },
    }
}
