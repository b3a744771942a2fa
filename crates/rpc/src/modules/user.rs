//! User management operations (`user.*`).

use super::{optional_field, required_field};
use crate::client::Connection;
use crate::error::Result;
use serde_json::{Value, json};

/// Optional settings for [`User::set_oper`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OperOptions<'a> {
    /// Connection class to place the oper in.
    pub class: Option<&'a str>,
    /// User modes to set alongside the oper-up.
    pub modes: Option<&'a str>,
    /// Snomask to set.
    pub snomask: Option<&'a str>,
    /// Virtual host to set.
    pub vhost: Option<&'a str>,
}

/// Handle for `user.*` operations.
pub struct User<'a> {
    conn: &'a Connection,
}

impl<'a> User<'a> {
    pub(crate) const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// List all users at the given detail level.
    ///
    /// # Errors
    ///
    /// Fails if the call fails or the result lacks the `list` field.
    pub async fn list(&self, object_detail_level: u8) -> Result<Value> {
        let result = self
            .conn
            .call(
                "user.list",
                Some(json!({"object_detail_level": object_detail_level})),
            )
            .await?;
        required_field(result, "list")
    }

    /// Get one user by nick; `None` if no such user.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn get(&self, nick: &str, object_detail_level: u8) -> Result<Option<Value>> {
        let result = self
            .conn
            .call(
                "user.get",
                Some(json!({"nick": nick, "object_detail_level": object_detail_level})),
            )
            .await?;
        Ok(optional_field(result, "client"))
    }

    /// Change a user's nickname.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn set_nick(&self, nick: &str, newnick: &str) -> Result<Value> {
        self.conn
            .call("user.set_nick", Some(json!({"nick": nick, "newnick": newnick})))
            .await
    }

    /// Set a user's username/ident.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn set_username(&self, nick: &str, username: &str) -> Result<Value> {
        self.conn
            .call(
                "user.set_username",
                Some(json!({"nick": nick, "username": username})),
            )
            .await
    }

    /// Set a user's realname/gecos.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn set_realname(&self, nick: &str, realname: &str) -> Result<Value> {
        self.conn
            .call(
                "user.set_realname",
                Some(json!({"nick": nick, "realname": realname})),
            )
            .await
    }

    /// Set a virtual host (vhost) on the user.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn set_vhost(&self, nick: &str, vhost: &str) -> Result<Value> {
        self.conn
            .call("user.set_vhost", Some(json!({"nick": nick, "vhost": vhost})))
            .await
    }

    /// Change the user modes of a user.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn set_mode(&self, nick: &str, modes: &str, hidden: bool) -> Result<Value> {
        self.conn
            .call(
                "user.set_mode",
                Some(json!({"nick": nick, "modes": modes, "hidden": hidden})),
            )
            .await
    }

    /// Change the snomask of a user (oper).
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn set_snomask(&self, nick: &str, snomask: &str, hidden: bool) -> Result<Value> {
        self.conn
            .call(
                "user.set_snomask",
                Some(json!({"nick": nick, "snomask": snomask, "hidden": hidden})),
            )
            .await
    }

    /// Make a user an IRC operator.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn set_oper(
        &self,
        nick: &str,
        oper_account: &str,
        oper_class: &str,
        options: OperOptions<'_>,
    ) -> Result<Value> {
        let mut params = json!({
            "nick": nick,
            "oper_account": oper_account,
            "oper_class": oper_class,
        });
        if let Some(class) = options.class {
            params["class"] = json!(class);
        }
        if let Some(modes) = options.modes {
            params["modes"] = json!(modes);
        }
        if let Some(snomask) = options.snomask {
            params["snomask"] = json!(snomask);
        }
        if let Some(vhost) = options.vhost {
            params["vhost"] = json!(vhost);
        }
        self.conn.call("user.set_oper", Some(params)).await
    }

    /// Join a user to a channel.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn join(
        &self,
        nick: &str,
        channel: &str,
        key: Option<&str>,
        force: bool,
    ) -> Result<Value> {
        let mut params = json!({"nick": nick, "channel": channel, "force": force});
        if let Some(key) = key {
            params["key"] = json!(key);
        }
        self.conn.call("user.join", Some(params)).await
    }

    /// Part a user from a channel.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn part(&self, nick: &str, channel: &str, force: bool) -> Result<Value> {
        self.conn
            .call(
                "user.part",
                Some(json!({"nick": nick, "channel": channel, "force": force})),
            )
            .await
    }

    /// Disconnect a user as if they sent a normal QUIT.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn quit(&self, nick: &str, reason: &str) -> Result<Value> {
        self.conn
            .call("user.quit", Some(json!({"nick": nick, "reason": reason})))
            .await
    }

    /// Forcefully remove a user from IRC.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn kill(&self, nick: &str, reason: &str) -> Result<Value> {
        self.conn
            .call("user.kill", Some(json!({"nick": nick, "reason": reason})))
            .await
    }
}
