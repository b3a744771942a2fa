//! Entity modules: thin wrappers over [`crate::client::Connection::call`].
//!
//! Each wrapper builds a parameter object, issues the call, and unwraps the
//! named field UnrealIRCd returns for that method family (`list`, `tkl`,
//! `server`, `channel`, `client`). Handles are borrowed from the connection
//! via its accessor methods (`conn.user()`, `conn.channel()`, …).

pub mod channel;
pub mod log;
pub mod name_ban;
pub mod rpc;
pub mod server;
pub mod server_ban;
pub mod server_ban_exception;
pub mod spamfilter;
pub mod stats;
pub mod user;

pub use channel::Channel;
pub use log::Log;
pub use name_ban::NameBan;
pub use rpc::Rpc;
pub use server::Server;
pub use server_ban::ServerBan;
pub use server_ban_exception::ServerBanException;
pub use spamfilter::Spamfilter;
pub use stats::Stats;
pub use user::{OperOptions, User};

use crate::error::{ProtocolError, Result};
use serde_json::Value;

/// Unwrap a field the method is defined to return; its absence is a
/// protocol violation.
fn required_field(result: Value, field: &'static str) -> Result<Value> {
    optional_field(result, field).ok_or_else(|| ProtocolError::MissingField(field).into())
}

/// Unwrap a field whose absence means "not found".
fn optional_field(result: Value, field: &'static str) -> Option<Value> {
    match result {
        Value::Object(mut object) => object.remove(field),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    #[test]
    fn required_field_is_extracted() {
        let result = json!({"list": [1, 2, 3]});
        assert_eq!(required_field(result, "list").unwrap(), json!([1, 2, 3]));
    }

    #[test]
    fn missing_required_field_is_a_protocol_violation() {
        let error = required_field(json!({"other": 1}), "list").unwrap_err();
        assert!(matches!(
            error,
            Error::Protocol(ProtocolError::MissingField("list"))
        ));
    }

    #[test]
    fn optional_field_absence_means_not_found() {
        assert!(optional_field(json!({}), "client").is_none());
        assert!(optional_field(json!("scalar"), "client").is_none());
    }
}
