// SPDX-License-Identifier: MIT

//! Low-level RouterOS API connection handling
//!
//! One [`Connection`] is one authenticated device session: the owner writes a
//! sentence, drains the full reply, and never interleaves. Every socket
//! operation is bounded by a deadline; an expired deadline poisons the
//! connection and the caller must discard it.

mod auth;
mod protocol;
mod stream;

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::DeviceConfig;
use crate::error::{ClientError, Result};
use crate::routeros::reply::Sentence;

pub use protocol::encode_length;
use protocol::read_length;
use stream::ApiStream;

/// Write deadline for a single sentence
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Low-level RouterOS API connection
pub(crate) struct Connection {
    stream: ApiStream,
    read_timeout: Duration,
}

impl Connection {
    /// Opens the TCP (optionally TLS) socket described by `config`.
    ///
    /// The connect attempt is bounded by the configured connect timeout.
    /// Authentication is a separate step; see [`Connection::login`].
    pub(crate) async fn open(config: &DeviceConfig) -> Result<Self> {
        let addr = config.addr();
        tracing::trace!("Attempting TCP connection to: {}", addr);
        let connect_timeout = config.connect_timeout();
        let tcp = timeout(connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| ClientError::Timeout(connect_timeout))??;
        let stream = if config.use_tls {
            ApiStream::upgrade_tls(tcp, &config.host).await?
        } else {
            ApiStream::Tcp(tcp)
        };
        tracing::debug!("Connection established to: {}", addr);
        Ok(Self {
            stream,
            read_timeout: config.read_timeout(),
        })
    }

    #[cfg(test)]
    pub(crate) fn from_tcp(stream: TcpStream, read_timeout: Duration) -> Self {
        Self {
            stream: ApiStream::Tcp(stream),
            read_timeout,
        }
    }

    /// Writes one sentence and reads sentences until the reply terminator.
    pub(crate) async fn exchange(&mut self, words: &[String]) -> Result<Vec<Sentence>> {
        self.write_sentence(words).await?;
        self.read_reply().await
    }

    /// Writes each word followed by the zero-length terminator, then flushes.
    pub(crate) async fn write_sentence(&mut self, words: &[String]) -> Result<()> {
        timeout(WRITE_TIMEOUT, async {
            for word in words {
                self.write_word(word).await?;
            }
            // zero length word terminates the sentence
            self.stream.write_all(&[0]).await?;
            self.stream.flush().await?;
            Ok(())
        })
        .await
        .map_err(|_| ClientError::Timeout(WRITE_TIMEOUT))?
    }

    async fn write_word(&mut self, word: &str) -> Result<()> {
        let bytes = word.as_bytes();
        self.stream.write_all(&encode_length(bytes.len())).await?;
        self.stream.write_all(bytes).await?;
        tracing::trace!("Sent word: {}", word);
        Ok(())
    }

    /// Reads words until the zero-length end-of-sentence marker.
    pub(crate) async fn read_sentence(&mut self) -> Result<Sentence> {
        let deadline = self.read_timeout;
        timeout(deadline, async {
            let mut words: Sentence = Vec::new();
            loop {
                let word = self.read_word().await?;
                if word.is_empty() {
                    break;
                }
                tracing::trace!("Received word: {}", word);
                words.push(word);
            }
            Ok(words)
        })
        .await
        .map_err(|_| ClientError::Timeout(deadline))?
    }

    async fn read_word(&mut self) -> Result<String> {
        let len = read_length(&mut self.stream).await?;
        if len == 0 {
            return Ok(String::new());
        }
        let mut buf = vec![0u8; len];
        self.stream.read_exact(&mut buf).await?;
        Ok(String::from_utf8_lossy(&buf).into())
    }

    /// Reads sentences until a `!done` or `!fatal` terminator.
    ///
    /// The terminator is included as the last element, so a returned reply is
    /// well-formed by construction: exactly one terminator, in final
    /// position. Empty sentences between replies are dropped.
    pub(crate) async fn read_reply(&mut self) -> Result<Vec<Sentence>> {
        let mut sentences: Vec<Sentence> = Vec::new();
        loop {
            let sentence = self.read_sentence().await?;
            let Some(first) = sentence.first() else {
                continue;
            };
            let terminal = first == "!done" || first == "!fatal";
            sentences.push(sentence);
            if terminal {
                tracing::trace!("Reply complete, {} sentences received", sentences.len());
                return Ok(sentences);
            }
        }
    }

    /// Gracefully shuts the socket down.
    pub(crate) async fn close(&mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
