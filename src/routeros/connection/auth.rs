// SPDX-License-Identifier: MIT

//! RouterOS authentication handshake

use md5::compute as md5_compute;

use super::Connection;
use crate::error::{ClientError, Result};
use crate::routeros::reply::{Sentence, sentence_attribute, terminated_done, trap_message};

impl Connection {
    /// Performs the `/login` handshake.
    ///
    /// The opening `/login` reply decides the path: a challenge attribute
    /// selects the legacy MD5 challenge-response exchange, its absence the
    /// plain name/password login (RouterOS 6.43+). Run exactly once per
    /// connection, before any command.
    pub(crate) async fn login(&mut self, username: &str, secret: &str) -> Result<()> {
        tracing::trace!("Attempting login for user: {}", username);
        let opening = self.exchange(&["/login".to_string()]).await?;
        ensure_accepted(&opening)?;

        let reply = match challenge_from(&opening) {
            Some(challenge_hex) => {
                tracing::trace!("Challenge received, length: {}", challenge_hex.len());
                let challenge = hex::decode(&challenge_hex).map_err(|e| {
                    ClientError::Authentication {
                        message: format!("malformed challenge '{challenge_hex}': {e}"),
                    }
                })?;
                let response = challenge_response(secret, &challenge);
                self.exchange(&[
                    "/login".to_string(),
                    format!("=name={username}"),
                    format!("=response={response}"),
                ])
                .await?
            }
            None => {
                tracing::trace!("No challenge in reply, using plain login");
                self.exchange(&[
                    "/login".to_string(),
                    format!("=name={username}"),
                    format!("=password={secret}"),
                ])
                .await?
            }
        };

        ensure_accepted(&reply)?;
        tracing::debug!("Login successful for user: {}", username);
        Ok(())
    }
}

/// Challenge attribute of the opening reply.
///
/// Modern firmwares key it `ret`; some older builds emit `challenge`.
fn challenge_from(sentences: &[Sentence]) -> Option<String> {
    sentences.iter().find_map(|s| {
        sentence_attribute(s, "ret").or_else(|| sentence_attribute(s, "challenge"))
    })
}

/// `00` + hex of `MD5(0x00 || secret || challenge)`.
fn challenge_response(secret: &str, challenge: &[u8]) -> String {
    let mut data = Vec::with_capacity(1 + secret.len() + challenge.len());
    data.push(0u8);
    data.extend_from_slice(secret.as_bytes());
    data.extend_from_slice(challenge);
    let digest = md5_compute(&data);
    format!("00{}", hex::encode(digest.0))
}

/// A handshake reply is accepted only with a clean `!done` terminator and no
/// trap. Anything else fails the login with the device's message.
fn ensure_accepted(sentences: &[Sentence]) -> Result<()> {
    if let Some(message) = trap_message(sentences) {
        tracing::trace!("Login rejected: {}", message);
        return Err(ClientError::Authentication { message });
    }
    if !terminated_done(sentences) {
        return Err(ClientError::Authentication {
            message: "login reply missing !done terminator".to_string(),
        });
    }
    Ok(())
}
